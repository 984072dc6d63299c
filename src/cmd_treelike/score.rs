use clap::*;
use log::info;
use std::io::Write;
use std::time::Instant;
use treelike::libs::phylo::concordance::{self, Policy};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("score")
        .about("Measure how tree-like a distance matrix is")
        .after_help(
            r###"
Builds a tree from the matrix and sums, over all pairs of taxa, the relative
difference between the input distance and the tree's path length.

A score of 0 means the distances fit a tree exactly. Larger values indicate
conflicting signal, e.g. from recombination. Scores are not normalised by
the number of pairs.

Policies (x = max/min - 1 for a pair of non-zero distances):
* bounded:    min(1, x)
* asymptotic: x / (x + 1)
A pair with exactly one zero distance always contributes 1.

Examples:
1. Score a matrix:
   treelike score matrix.phy

2. Keep the tree as well:
   treelike score matrix.phy --policy bounded --tree tree.nwk
"###,
        )
        .arg(
            Arg::new("policy")
                .long("policy")
                .short('p')
                .num_args(1)
                .value_parser(["bounded", "asymptotic"])
                .default_value("asymptotic")
                .help("How each pair's relative difference is capped"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .num_args(1)
                .help("Also write the Newick tree to this file"),
        );
    super::matrix_args(cmd)
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").unwrap();
    let policy = args.get_one::<String>("policy").unwrap().parse::<Policy>()?;

    let matrix = super::load_matrix(args)?;
    let method = super::get_method(args)?;

    let t0 = Instant::now();
    let eval = concordance::evaluate(&matrix, method, policy)?;
    info!(
        "Scored {} taxa with {}/{} in {:.3}s",
        matrix.len(),
        method,
        policy,
        t0.elapsed().as_secs_f64()
    );

    if let Some(treefile) = args.get_one::<String>("tree") {
        let mut tree_writer = intspan::writer(treefile);
        tree_writer.write_all((eval.tree.to_newick() + "\n").as_ref())?;
    }

    let mut writer = intspan::writer(outfile);
    writer.write_fmt(format_args!("{}\n", eval.score))?;

    Ok(())
}
