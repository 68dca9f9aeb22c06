// SPDX-FileCopyrightText: 2025 Contributors to the vlc-rs project.
// SPDX-License-Identifier: Apache-2.0

//! Configuration and path resolution for the libvlc library.
//!
//! This module locates the libvlc shared library based on build-time settings
//! and provides [`InstanceConfig`], a serializable description of how to set
//! up an [`crate::Instance`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

// Build script generates constants.rs with LIBVLC_LIB_DIR
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

/// File name of the libvlc shared library.
pub const LIBVLC_SO_NAME: &str = "libvlc.so.5";

/// Returns the path to the libvlc shared library.
///
/// If the `LIBVLC_LIB_DIR` environment variable was set when the crate was
/// built, the library is looked up in that directory. Otherwise only the file
/// name is returned and the dynamic loader searches its default paths.
///
/// # Examples
///
/// ```no_run
/// use vlc::config::get_libvlc_so_path;
/// use vlc::load_api;
///
/// # fn main() -> Result<(), vlc::Error> {
/// let api = load_api(get_libvlc_so_path())?;
/// # Ok(())
/// # }
/// ```
pub fn get_libvlc_so_path() -> PathBuf {
    match LIBVLC_LIB_DIR {
        Some(dir) => Path::new(dir).join(LIBVLC_SO_NAME),
        None => LIBVLC_SO_NAME.into(),
    }
}

/// Settings used by [`crate::Instance::from_config`].
///
/// # Examples
///
/// ```
/// use vlc::config::InstanceConfig;
///
/// # fn main() -> Result<(), vlc::Error> {
/// let config = InstanceConfig::from_json(
///     r#"{ "args": ["--no-video"], "verbosity": 2, "interfaces": ["dummy"] }"#,
/// )?;
/// assert_eq!(config.args, ["--no-video"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceConfig {
    /// Command line style arguments passed to `libvlc_new`.
    pub args: Vec<String>,
    /// Log verbosity applied after creation, see
    /// [`crate::Instance::set_log_verbosity`].
    pub verbosity: Option<u32>,
    /// Interface modules started after creation.
    pub interfaces: Vec<String>,
}

impl InstanceConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if the document is malformed or has unknown
    /// fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|err| {
            crate::Error::Other(format!(
                "Failed to open \"{}\": {err}",
                path.as_ref().display()
            ))
        })?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
