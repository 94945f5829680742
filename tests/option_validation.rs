use std::fs;
use std::path::PathBuf;

use uralex_export::error::ExportError;
use uralex_export::exporter::{Dialect, ExportOptions, Format};
use uralex_export::release;
use uralex_export::settings::Settings;

#[test]
fn unknown_format_lists_the_valid_formats() {
    let err = "phylip".parse::<Format>().unwrap_err();
    assert!(matches!(err, ExportError::Configuration { .. }));
    assert_eq!(err.valid_options(), ["nexus", "cldf", "harvest"]);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unknown_dialect_lists_the_valid_dialects() {
    let err = ExportOptions::parse("nexus", Some("paup")).unwrap_err();
    assert_eq!(err.valid_options(), ["mrbayes", "beast", "splitstree"]);
}

#[test]
fn format_is_checked_before_dialect() {
    let err = ExportOptions::parse("phylip", Some("paup")).unwrap_err();
    assert_eq!(err.valid_options(), ["nexus", "cldf", "harvest"]);
}

#[test]
fn nexus_defaults_to_beast() {
    let options = ExportOptions::parse("nexus", None).unwrap();
    assert_eq!(options.format(), Format::Nexus);
    assert_eq!(options.dialect(), Some(Dialect::Beast));
    assert!(options.charsets());
    assert!(!options.labels());
}

#[test]
fn flat_formats_take_no_dialect() {
    assert_eq!(ExportOptions::parse("cldf", None).unwrap().dialect(), None);
    let err = ExportOptions::parse("harvest", Some("beast")).unwrap_err();
    assert!(matches!(err, ExportError::Configuration { .. }));
    assert!(err.valid_options().is_empty());
}

#[test]
fn labels_force_the_beast_dialect() {
    let options = ExportOptions::parse("nexus", Some("mrbayes")).unwrap().with_labels(true);
    assert_eq!(options.dialect(), Some(Dialect::Beast));
    assert!(options.labels());
}

#[test]
fn labels_are_ignored_outside_nexus() {
    let options = ExportOptions::parse("cldf", None).unwrap().with_labels(true);
    assert_eq!(options.dialect(), None);
    assert!(!options.labels());
}

#[test]
fn names_round_trip_through_display() {
    for format in Format::ALL {
        assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
    }
    for dialect in Dialect::ALL {
        assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
    }
}

#[test]
fn releases_are_found_by_version_or_label() {
    assert_eq!(release::latest().version, "2.0");
    assert_eq!(release::find("uralex-v1.0").unwrap().version, "1.0");
    assert_eq!(release::find("1.0").unwrap().label(), "uralex-v1.0");
    assert_eq!(
        release::find("2.0").unwrap().entry("Data.tsv"),
        "lexibank-uralex-a37bb22/raw/Data.tsv"
    );
    let err = release::find("3.0").unwrap_err();
    assert_eq!(err.valid_options(), ["1.0", "2.0"]);
}

#[test]
fn settings_default_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let name = dir.path().join("absent");
    let settings = Settings::load_from(&name.to_string_lossy()).unwrap();
    assert_eq!(settings.raw_folder, PathBuf::from("raw"));
    assert_eq!(settings.archive_folder, PathBuf::from("."));
    assert_eq!(settings.release, None);
    assert_eq!(settings.dialect, "beast");
    assert_eq!(settings.meaning_list, "all");
    assert_eq!(settings.release().unwrap().version, "2.0");
}

#[test]
fn settings_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uralex-export.toml");
    fs::write(&path, "release = \"1.0\"\ndialect = \"mrbayes\"\nraw_folder = \"data/raw\"\n").unwrap();
    let settings = Settings::load_from(&path.to_string_lossy()).unwrap();
    assert_eq!(settings.raw_folder, PathBuf::from("data/raw"));
    assert_eq!(settings.dialect, "mrbayes");
    assert_eq!(settings.meaning_list, "all");
    assert_eq!(settings.release().unwrap().zipfile, "uralex-v1.0.zip");
}

#[test]
fn unknown_release_in_settings_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uralex-export.toml");
    fs::write(&path, "release = \"0.9\"\n").unwrap();
    let settings = Settings::load_from(&path.to_string_lossy()).unwrap();
    assert_eq!(settings.release().unwrap_err().exit_code(), 2);
}
