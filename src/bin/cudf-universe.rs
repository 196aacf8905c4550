// SPDX-License-Identifier: MPL-2.0

//! Crawl a registry from seed packages and print the CUDF problem, or what a
//! solver makes of it.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use cudf_universe::{
    encode_document, render, AspcudSolver, Crawler, OfflineResolver, DEFAULT_MAX_CONCURRENT,
};
use futures::executor::block_on;
use log::info;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Packages to start the crawl from.
    #[arg(required = true)]
    seeds: Vec<String>,

    /// Registry to crawl, a RON map from package name to version to dependencies.
    #[arg(long, value_name = "FILE")]
    registry: PathBuf,

    /// Number of registry lookups in flight at once.
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT)]
    max_concurrent: usize,

    /// Ask for any version of every seed to be installed.
    #[arg(long)]
    install_seeds: bool,

    /// Run the solver and print its output instead of the problem.
    #[arg(long)]
    solve: bool,

    /// Solver binary, called as `<solver> <input> <output> <criteria>`.
    #[arg(long, default_value = "aspcud")]
    solver: PathBuf,

    /// Optimization criteria passed to the solver.
    #[arg(long, default_value = "trendy")]
    criteria: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let registry: OfflineResolver = ron::from_str(&fs::read_to_string(&args.registry)?)?;
    let crawler = Crawler::new(&registry).with_max_concurrent(args.max_concurrent);
    let universe = block_on(crawler.crawl(&args.seeds))?;
    info!(
        "{} packages, {} versions",
        universe.len(),
        universe.version_count()
    );

    let install: &[String] = if args.install_seeds { &args.seeds } else { &[] };
    let doc = encode_document(&universe, install);

    if args.solve {
        let solver = AspcudSolver::new()
            .with_program(args.solver)
            .with_criteria(args.criteria);
        print!("{}", solver.solve(&doc)?);
    } else {
        println!("{}", render(&doc)?);
    }
    Ok(())
}
