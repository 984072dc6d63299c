extern crate clap;
use clap::*;

mod cmd_treelike;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = Command::new("treelike")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`treelike` - How well does a distance matrix fit a tree")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_treelike::build::make_subcommand())
        .subcommand(cmd_treelike::cophenetic::make_subcommand())
        .subcommand(cmd_treelike::score::make_subcommand())
        .after_help(
            r###"Subcommands:

* build      - NJ or BIONJ tree from a PHYLIP matrix
* cophenetic - Leaf-to-leaf path lengths of that tree
* score      - Tree-likeness of the matrix; 0 is perfectly additive

Set RUST_LOG=info to see progress on stderr.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("build", sub_matches)) => cmd_treelike::build::execute(sub_matches),
        Some(("cophenetic", sub_matches)) => cmd_treelike::cophenetic::execute(sub_matches),
        Some(("score", sub_matches)) => cmd_treelike::score::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
