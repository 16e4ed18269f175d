//! Path resolution for discorder
//!
//! Follows the XDG Base Directory layout with env var overrides.
//!
//! ```text
//! ~/.config/discorder/         (XDG_CONFIG_HOME)
//! └── config.toml
//!
//! ~/.local/share/discorder/    (XDG_DATA_HOME)
//! └── discorder.log
//! ```
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DISCORDER_CONFIG` | Config file | `~/.config/discorder/config.toml` |
//! | `DISCORDER_LOG` | Log file | `~/.local/share/discorder/discorder.log` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

const APP_DIR: &str = "discorder";

fn xdg_dir(xdg_var: &str, home_suffix: &str) -> PathBuf {
    if let Ok(xdg) = std::env::var(xdg_var) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(home_suffix).join(APP_DIR);
    }
    PathBuf::from(".")
}

/// Priority: `XDG_DATA_HOME` > `~/.local/share`
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

/// Priority: `XDG_CONFIG_HOME` > `~/.config`
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Priority: `DISCORDER_CONFIG` > `config_dir()/config.toml`
pub fn config_path() -> PathBuf {
    std::env::var("DISCORDER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.toml"))
}

/// Priority: `DISCORDER_LOG` > `data_dir()/discorder.log`
pub fn log_path() -> PathBuf {
    std::env::var("DISCORDER_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir().join("discorder.log"))
}

/// Create the parent directory of `path` if needed
pub fn ensure_parent(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !parent.exists() {
        debug!("creating directory: {}", parent.display());
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
