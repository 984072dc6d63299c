use clap::*;
use std::io::Write;
use treelike::libs::phylo::{build, cophenetic};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("cophenetic")
        .about("Distances implied by the reconstructed tree")
        .after_help(
            r###"
Builds a tree from the matrix, then writes the tree's leaf-to-leaf path
lengths as a PHYLIP matrix with the same taxa in the same order.

Examples:
1. Tree-implied distances:
   treelike cophenetic matrix.phy -o implied.phy

2. With plain NJ:
   treelike cophenetic matrix.phy --method nj
"###,
        );
    super::matrix_args(cmd)
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").unwrap();

    let matrix = super::load_matrix(args)?;
    let method = super::get_method(args)?;

    let tree = build::build(&matrix, method)?;
    let implied = cophenetic::cophenetic(&tree)?;

    let mut writer = intspan::writer(outfile);
    writer.write_all(implied.to_phylip().as_ref())?;

    Ok(())
}
