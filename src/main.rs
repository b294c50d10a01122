//! Treesum CLI: digest files and directory trees, one line per file, in walk order.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use treesum::engine::arg_parser::Cli;
use treesum::engine::handle_run;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let code = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(code)
}
