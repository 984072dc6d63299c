//! Subcommand modules for the `treelike` binary.

use anyhow::Context;
use clap::*;
use log::info;
use treelike::libs::phylo::{DistanceMatrix, Method};

pub mod build;
pub mod cophenetic;
pub mod score;

/// Arguments shared by every subcommand that reads a matrix.
pub fn matrix_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("infile")
            .required(true)
            .index(1)
            .help("Input PHYLIP matrix file. [stdin] for standard input"),
    )
    .arg(
        Arg::new("method")
            .long("method")
            .short('m')
            .num_args(1)
            .value_parser(["nj", "bionj"])
            .default_value("bionj")
            .help("Tree building method"),
    )
    .arg(
        Arg::new("names")
            .long("names")
            .num_args(1)
            .help("Comma-separated taxa to keep, in this order"),
    )
    .arg(
        Arg::new("symmetrize")
            .long("symmetrize")
            .action(ArgAction::SetTrue)
            .help("Replace d(a,b) and d(b,a) by their mean"),
    )
    .arg(
        Arg::new("jc")
            .long("jc")
            .action(ArgAction::SetTrue)
            .help("Apply the Jukes-Cantor correction to distances"),
    )
    .arg(
        Arg::new("outfile")
            .short('o')
            .long("outfile")
            .num_args(1)
            .default_value("stdout")
            .help("Output filename. [stdout] for screen"),
    )
}

/// Load the input matrix and apply `--names`, `--jc` and `--symmetrize`, in that order.
pub fn load_matrix(args: &ArgMatches) -> anyhow::Result<DistanceMatrix> {
    let infile = args.get_one::<String>("infile").unwrap();

    let mut matrix = DistanceMatrix::from_phylip(infile)
        .with_context(|| format!("Failed to read matrix from {}", infile))?;
    info!("Loaded {} taxa from {}", matrix.len(), infile);

    if let Some(names) = args.get_one::<String>("names") {
        let names: Vec<String> = names
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        matrix = matrix.subset(&names)?;
        info!("Kept {} taxa", matrix.len());
    }
    if args.get_flag("jc") {
        matrix.jukes_cantor();
    }
    if args.get_flag("symmetrize") {
        matrix.symmetrize();
    }

    Ok(matrix)
}

pub fn get_method(args: &ArgMatches) -> anyhow::Result<Method> {
    Ok(args.get_one::<String>("method").unwrap().parse::<Method>()?)
}
