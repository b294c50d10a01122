//! Engine module: hashing I/O, sink formatting, path tools, and the CLI surface

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod output;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::{digest_file, digest_reader, digest_stdin};
pub use output::{format_line, should_report, write_line};
pub use tools::{display_path, is_hidden};
