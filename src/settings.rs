//! Persistent defaults for the command line tool.
//!
//! Settings come from built-in defaults, then an optional `uralex-export`
//! file (toml, json, yaml, ...) in the working directory, then
//! `URALEX_EXPORT_*` environment variables. Command line options override all
//! of them.

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::conventions::ALL_MEANINGS;
use crate::error::Result;
use crate::release::{self, Release};

pub const SETTINGS_FILE: &str = "uralex-export";
pub const ENV_PREFIX: &str = "URALEX_EXPORT";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Folder holding the extracted TSV files.
    pub raw_folder: PathBuf,
    /// Folder where release zip files are looked for and downloaded to.
    pub archive_folder: PathBuf,
    /// Release version to read, the latest when unset.
    #[serde(default)]
    pub release: Option<String>,
    pub dialect: String,
    pub meaning_list: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(SETTINGS_FILE)
    }
    /// Loads settings from the file `name` (extension optional, the file may
    /// be absent) and the environment.
    pub fn load_from(name: &str) -> Result<Self> {
        let config = Config::builder()
            .set_default("raw_folder", "raw")?
            .set_default("archive_folder", ".")?
            .set_default("dialect", "beast")?
            .set_default("meaning_list", ALL_MEANINGS)?
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }
    pub fn release(&self) -> Result<&'static Release> {
        match &self.release {
            Some(version) => release::find(version),
            None => Ok(release::latest()),
        }
    }
}
