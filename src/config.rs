//! The immutable, process-wide configuration record: §3/§9 of `SPEC_FULL.md`.

use std::path::PathBuf;

use thiserror::Error;

/// `server_root_to_validate` in the source is bounded to this many bytes
/// (`MAX_SERVER_ROOT_LEN - 1`); kept as the same ceiling here.
const MAX_SERVER_ROOT_LEN: usize = 499;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("server root path is longer than {MAX_SERVER_ROOT_LEN} characters")]
    ServerRootTooLong,
    #[error("server root {0:?} does not exist")]
    ServerRootMissing(PathBuf),
    #[error("server root {0:?} is not both readable and traversable")]
    ServerRootUnreadable(PathBuf),
}

/// Built once from CLI args and shared by reference (or `Arc` where
/// ownership must cross a thread boundary) across the Acceptor, Workers, and
/// Monitor. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) port: u16,
    pub(crate) server_root: PathBuf,
    pub(crate) verbose: bool,
}

impl Config {
    pub fn new(port: u16, server_root: PathBuf, verbose: bool) -> Result<Config, ConfigError> {
        let server_root_str = server_root
            .to_str()
            .ok_or(ConfigError::ServerRootTooLong)?;
        if server_root_str.len() >= MAX_SERVER_ROOT_LEN {
            return Err(ConfigError::ServerRootTooLong);
        }
        if !server_root.exists() {
            return Err(ConfigError::ServerRootMissing(server_root));
        }
        if !is_readable_and_traversable(&server_root) {
            return Err(ConfigError::ServerRootUnreadable(server_root));
        }

        Ok(Config {
            port,
            server_root,
            verbose,
        })
    }
}

#[cfg(unix)]
fn is_readable_and_traversable(path: &std::path::Path) -> bool {
    use std::ffi::CString;

    let Ok(c_path) = CString::new(path.as_os_str().as_encoded_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated byte string for the
    // duration of this call.
    unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::X_OK) == 0 }
}

#[cfg(not(unix))]
fn is_readable_and_traversable(path: &std::path::Path) -> bool {
    std::fs::read_dir(path).is_ok()
}
