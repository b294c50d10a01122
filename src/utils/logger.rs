use colored::Colorize;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter, Record};
use std::io::Write;

/// Pipeline stage a record came from: the last segment of its module target
/// (`treesum::pipeline::walk` → `walk`). Records from other crates keep their crate name.
fn stage<'a>(record: &Record<'a>) -> &'a str {
    let target = record.target();
    match target.strip_prefix(env!("CARGO_PKG_NAME")) {
        Some(rest) => rest.rsplit("::").next().filter(|s| !s.is_empty()).unwrap_or(target),
        None => target.split("::").next().unwrap_or(target),
    }
}

fn format_record(record: &Record<'_>) -> String {
    let name = env!("CARGO_PKG_NAME").cyan();
    let stage = stage(record);
    match record.level() {
        Level::Error => format!("[{} {} {}] {}", name, "ERROR".red(), stage.white(), record.args()),
        Level::Warn => format!("[{} {} {}] {}", name, "WARN".yellow(), stage.white(), record.args()),
        Level::Info => format!("[{}] {}", name, record.args()),
        Level::Debug | Level::Trace => {
            format!("[{} {}] {}", name, stage.dimmed(), record.args())
        }
    }
}

/// Logs always go to stderr; stdout carries only digest lines.
/// Our crate logs at Info (Debug with `verbose`, tagged by stage); dependencies at Warn;
/// `RUST_LOG` still applies.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| writeln!(buf, "{}", format_record(record)))
        .try_init();
}
