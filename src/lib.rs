//! sws - a small static-content HTTP/1.0 (and 1.1) origin server.
//!
//! A fixed-shape server: one Acceptor thread, a pool of five Worker threads,
//! and one Monitor thread, connected by a bounded producer/consumer queue.
//! There is no runtime configuration of thread counts or queue capacity —
//! just a port, a document root, and a verbosity flag.
//!
//! # Quick start
//!
//! ```no_run
//! use clap::Parser;
//!
//! let cli = sws::Cli::parse();
//! sws::init_logging(cli.verbose());
//! let config = cli.into_config().expect("invalid arguments");
//! sws::run(config).expect("server error");
//! ```

mod acceptor;
mod bio;
mod cli;
mod config;
mod errors;
mod http {
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
mod logging;
mod monitor;
mod queue;
mod server;
mod worker;

pub use crate::cli::Cli;
pub use crate::config::{Config, ConfigError};
pub use crate::logging::init as init_logging;
pub use crate::server::{run, ServerError};
