use clap::*;
use std::io::Write;
use treelike::libs::phylo::build;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("build")
        .about("Construct an unrooted tree using NJ or BIONJ")
        .after_help(
            r###"
Constructs an unrooted phylogenetic tree from a distance matrix.

Notes:
* Input: PHYLIP distance matrix (square or lower-triangular).
* Output: Newick tree. The basal node is a multifurcation; no root is implied.
* Negative branch lengths are set to 0.
* BIONJ weights each reduction by the variance of the joined distances,
  which is usually more accurate than NJ on noisy data.

Examples:
1. Build tree from matrix:
   treelike build matrix.phy -o tree.nwk

2. Plain NJ, on a subset of taxa:
   treelike build matrix.phy --method nj --names A,B,C,D

3. Pipe matrix to tree:
   cat matrix.phy | treelike build stdin > tree.nwk
"###,
        )
        .arg(
            Arg::new("indent")
                .long("indent")
                .num_args(1)
                .default_value("")
                .help("Indentation for pretty output. Empty for a single line"),
        );
    super::matrix_args(cmd)
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").unwrap();
    let indent = args.get_one::<String>("indent").unwrap();

    let matrix = super::load_matrix(args)?;
    let method = super::get_method(args)?;

    let tree = build::build(&matrix, method)?;

    let mut writer = intspan::writer(outfile);
    writer.write_all((tree.to_newick_with_format(indent) + "\n").as_ref())?;

    Ok(())
}
