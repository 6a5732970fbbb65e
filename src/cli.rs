//! Command-line parsing: §6 of `SPEC_FULL.md`.
//!
//! Grounded on `examples/original_source/src/command_line.c`'s validation
//! order (port range, then server root), expressed as a `clap` derive struct
//! instead of the source's hand-rolled `cli_validation_func` table.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError};

const PORT_MIN: u16 = 1500;
const PORT_MAX: u16 = 10000;

#[derive(Debug, Parser)]
#[command(
    name = "sws",
    about = "Small static-content HTTP/1.0 (and 1.1) origin server",
    version
)]
pub struct Cli {
    /// Port to listen on, 1500-10000.
    #[arg(value_parser = clap::value_parser!(u16).range(PORT_MIN as i64..=PORT_MAX as i64))]
    port: u16,

    /// Directory of files to serve; must exist, be readable, and be traversable.
    server_root: PathBuf,

    /// Enable DEBUG-level logging.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Cli {
    /// Validates the server root against the filesystem and produces the
    /// immutable [`Config`] the rest of the server is built from. Port range
    /// is already enforced by `clap` at parse time.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        Config::new(self.port, self.server_root, self.verbose)
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}
