//! CLI command handler: resolve options, build the digest factory, run the pipeline, print lines.

use anyhow::Result;
use log::{debug, warn};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use crate::digest::{Algorithm, factory_for};
use crate::engine::arg_parser::Cli;
use crate::engine::output::write_line;
use crate::key::{key_spec_from_env, parse_key_spec};
use crate::pipeline::{CancelSignal, install_interrupt_handler};
use crate::utils::setup_logging;
use crate::utils::config::InterruptConsts;
use crate::utils::treesum_toml::{TreesumToml, apply_file_to_opts, load_treesum_toml};
use crate::{DigestOpts, Opts, digest_paths};

/// Defaults, then `file`, then CLI flags.
///
/// Depth: `-d` wins over everything. Otherwise `-r` lifts the limit, and `--recursive=false`
/// falls back to the file's `depth` (or the default) even when the file sets `recursive = true`.
fn resolve_opts(cli: &Cli, file: Option<&TreesumToml>) -> Opts {
    let mut opts = Opts::default();
    if let Some(f) = file {
        apply_file_to_opts(f, &mut opts);
    }
    if let Some(ref a) = cli.algorithm {
        opts.algorithm = a.clone();
    }
    match (cli.depth, cli.recursive) {
        (Some(d), _) => opts.max_depth = d,
        (None, Some(true)) => opts.max_depth = usize::MAX,
        (None, Some(false)) => {
            opts.max_depth = file
                .and_then(TreesumToml::depth)
                .unwrap_or(Opts::default().max_depth);
        }
        (None, None) => {}
    }
    if let Some(h) = cli.hidden {
        opts.include_hidden = h;
    }
    if cli.key.is_some() {
        opts.key = cli.key.clone();
    }
    if cli.workers.is_some() {
        opts.num_workers = cli.workers;
    }
    if let Some(n) = cli.no_name {
        opts.no_name = n;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts
}

/// Resolve options against `.treesum.toml` in the working directory and start logging.
fn setup_opts(cli: &Cli) -> Opts {
    let file = load_treesum_toml(Path::new("."));
    let opts = resolve_opts(cli, file.as_ref().ok().and_then(Option::as_ref));
    setup_logging(opts.verbose);
    if let Err(msg) = file {
        warn!("ignoring config file: {}", msg);
    }
    opts
}

/// Digest `cli.paths` (stdin when empty) and print one line per result, in walk order.
/// Exit code 1 when any path failed, 130 when interrupted (the printed prefix is still valid).
pub fn handle_run(cli: &Cli) -> Result<ExitCode> {
    if cli.list_algorithms {
        for a in Algorithm::ALL {
            println!("{a}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let opts = setup_opts(cli);
    let algorithm: Algorithm = opts.algorithm.parse()?;
    let key = match opts.key.clone().or_else(|| key_spec_from_env(Path::new("."))) {
        Some(spec) => Some(parse_key_spec(&spec)?),
        None => None,
    };
    let factory = factory_for(algorithm, key.as_deref())?;
    debug!("{:#?}", opts.clone().redacted());

    let cancel = CancelSignal::new();
    install_interrupt_handler(&cancel)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = digest_paths(
        &cli.paths,
        factory,
        &DigestOpts::from(&opts),
        &cancel,
        |node| {
            write_line(&mut out, &node, opts.no_name)?;
            Ok(())
        },
    )?;
    out.flush()?;

    if summary.cancelled {
        warn!("Cancelled; output stops after {} results", summary.reported);
        return Ok(ExitCode::from(InterruptConsts::EXIT_CODE));
    }
    if summary.failures > 0 {
        warn!(
            "{} of {} results could not be digested",
            summary.failures, summary.reported
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
