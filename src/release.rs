//! Published releases of the dataset.

use std::path::Path;

use crate::error::{ExportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    pub version: &'static str,
    /// (major, minor), used to find the latest release
    pub number: (u32, u32),
    pub zipfile: &'static str,
    /// directory inside the zip file that holds the `raw/` folder
    pub dir: &'static str,
    pub url: &'static str,
}

pub const RELEASES: &[Release] = &[
    Release {
        version: "1.0",
        number: (1, 0),
        zipfile: "uralex-v1.0.zip",
        dir: "lexibank-uralex-efe0a73",
        url: "https://zenodo.org/record/1459402/files/lexibank/uralex-v1.0.zip?download=1",
    },
    Release {
        version: "2.0",
        number: (2, 0),
        zipfile: "uralex-v2.0.zip",
        dir: "lexibank-uralex-a37bb22",
        url: "https://zenodo.org/record/4777568/files/lexibank/uralex-v2.0.zip?download=1",
    },
];

impl Release {
    /// The data version reported in exports, the zip file name without extension.
    pub fn label(&self) -> &'static str {
        self.zipfile.strip_suffix(".zip").unwrap_or(self.zipfile)
    }
    /// Path of the entry `file` inside the archive.
    pub fn entry(&self, file: &str) -> String {
        format!("{}/raw/{}", self.dir, file)
    }
    pub fn archive_path(&self, folder: &Path) -> std::path::PathBuf {
        folder.join(self.zipfile)
    }
}

pub fn latest() -> &'static Release {
    RELEASES
        .iter()
        .max_by_key(|r| r.number)
        .unwrap_or(&RELEASES[0])
}

pub fn find(version: &str) -> Result<&'static Release> {
    RELEASES
        .iter()
        .find(|r| r.version == version || r.label() == version)
        .ok_or_else(|| {
            ExportError::configuration(
                format!("Unknown dataset release '{version}'"),
                RELEASES.iter().map(|r| r.version.to_string()).collect(),
            )
        })
}
