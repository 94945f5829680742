//! Acquisition of the source tables, either from an extracted `raw/` folder or
//! from a release zip file (downloaded on request).

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::release::Release;
use crate::tsv::Table;

pub const DATA_FILE: &str = "Data.tsv";
pub const LANGUAGE_FILE: &str = "Languages.tsv";
pub const MEANING_LISTS_FILE: &str = "Meaning_lists.tsv";

/// Version label of data read from a raw folder.
pub const CUSTOM_VERSION: &str = "custom";

/// The tables the reader needs, plus the version they came from.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub version: String,
    pub data: Table,
    pub languages: Table,
    pub meaning_lists: Table,
}

impl SourceTables {
    pub fn from_texts(version: &str, data: &str, languages: &str, meaning_lists: &str) -> Result<Self> {
        Ok(Self {
            version: version.to_string(),
            data: Table::parse(DATA_FILE, data)?,
            languages: Table::parse(LANGUAGE_FILE, languages)?,
            meaning_lists: Table::parse(MEANING_LISTS_FILE, meaning_lists)?,
        })
    }
}

pub fn read_raw_folder(folder: &Path) -> Result<SourceTables> {
    info!(folder = %folder.display(), "reading raw folder");
    let read = |file: &str| {
        fs::read_to_string(folder.join(file)).map_err(|e| {
            ExportError::SourceUnavailable(format!(
                "Could not load raw folder contents ({}: {e}). Please ensure that you have a '{}' folder containing all the TSV files.",
                file,
                folder.display()
            ))
        })
    };
    SourceTables::from_texts(
        CUSTOM_VERSION,
        &read(DATA_FILE)?,
        &read(LANGUAGE_FILE)?,
        &read(MEANING_LISTS_FILE)?,
    )
}

pub fn read_release_archive(release: &Release, folder: &Path) -> Result<SourceTables> {
    let path = release.archive_path(folder);
    info!(archive = %path.display(), "reading release archive");
    let unavailable = |detail: String| {
        ExportError::SourceUnavailable(format!(
            "{}: Could not load dataset zip file contents ({detail}).",
            path.display()
        ))
    };
    let file = File::open(&path).map_err(|e| unavailable(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| unavailable(e.to_string()))?;
    let mut read = |file: &str| -> Result<String> {
        let entry = release.entry(file);
        let mut zipped = archive.by_name(&entry).map_err(|e| unavailable(format!("{entry}: {e}")))?;
        let mut text = String::new();
        zipped.read_to_string(&mut text)?;
        debug!(entry = %entry, bytes = text.len(), "read archive entry");
        Ok(text)
    };
    let data = read(DATA_FILE)?;
    let languages = read(LANGUAGE_FILE)?;
    let meaning_lists = read(MEANING_LISTS_FILE)?;
    SourceTables::from_texts(release.label(), &data, &languages, &meaning_lists)
}

/// Downloads the release archive into `folder` and returns its path.
///
/// The archive is written to a temporary file first, so an interrupted
/// download never leaves a truncated zip file behind.
pub fn download_release(release: &Release, folder: &Path) -> Result<PathBuf> {
    info!(url = release.url, "downloading {}", release.zipfile);
    let response = reqwest::blocking::get(release.url)?.error_for_status()?;
    let bytes = response.bytes()?;
    fs::create_dir_all(folder)?;
    let mut temp_file = NamedTempFile::new_in(folder)?;
    temp_file.write_all(&bytes)?;
    let path = release.archive_path(folder);
    temp_file.persist(&path)?;
    info!(archive = %path.display(), bytes = bytes.len(), "download complete");
    Ok(path)
}
