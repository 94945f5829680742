use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use uralex_export::conventions::Conventions;
use uralex_export::dataset::{Axis, DatasetView};
use uralex_export::error::ExportError;
use uralex_export::reader::SourceData;
use uralex_export::release;
use uralex_export::source::{self, DATA_FILE, LANGUAGE_FILE, MEANING_LISTS_FILE, SourceTables};
use zip::write::SimpleFileOptions;

const DATA: &str = "lgid3\turalex_mng\tcogn_set\tform_set\n\
fin\thand\t3\t10\n\
est\thand\t1\t2\n\
hun\thand\t12\t2\n\
fin\teye\t1\t2\n\
est\teye\t?\t?\n\
hun\teye\t0\t0\n";

const LANGUAGES: &str = "lgid3\tASCII_name\tName\n\
fin\tFinnish\tFinnish\n\
est\tEstonian\tEstonian\n\
hun\tHungarian\tHungarian\n";

const MEANING_LISTS: &str = "uralex_mng\tLJ_rank\tmng_item\tSwadesh_100\tLJ_2009\n\
hand\t1\t1\t1\t0\n\
eye\t2\t2\t0\t1\n";

fn setup() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join(DATA_FILE), DATA).unwrap();
    fs::write(raw.join(LANGUAGE_FILE), LANGUAGES).unwrap();
    fs::write(raw.join(MEANING_LISTS_FILE), MEANING_LISTS).unwrap();
    dir
}

fn write_release_zip(folder: &Path, release: &release::Release) {
    let file = File::create(release.archive_path(folder)).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, text) in [(DATA_FILE, DATA), (LANGUAGE_FILE, LANGUAGES), (MEANING_LISTS_FILE, MEANING_LISTS)] {
        zip.start_file(release.entry(name), options).unwrap();
        zip.write_all(text.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn raw_folder_is_labeled_custom() {
    let dir = setup();
    let tables = source::read_raw_folder(&dir.path().join("raw")).unwrap();
    assert_eq!(tables.version, "custom");
    assert_eq!(tables.data.len(), 6);
}

#[test]
fn missing_raw_folder_is_reported_with_guidance() {
    let dir = tempfile::tempdir().unwrap();
    let err = source::read_raw_folder(&dir.path().join("raw")).unwrap_err();
    assert!(matches!(err, ExportError::SourceUnavailable(_)));
    assert!(err.to_string().contains("folder containing all the TSV files"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn release_archive_is_labeled_by_zip_name() {
    let dir = tempfile::tempdir().unwrap();
    let release = release::find("2.0").unwrap();
    write_release_zip(dir.path(), release);
    let tables = source::read_release_archive(release, dir.path()).unwrap();
    assert_eq!(tables.version, "uralex-v2.0");
    assert_eq!(tables.languages.len(), 3);
}

#[test]
fn missing_release_archive_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = source::read_release_archive(release::latest(), dir.path()).unwrap_err();
    assert!(matches!(err, ExportError::SourceUnavailable(_)));
}

#[test]
fn archive_of_another_release_lacks_the_entries() {
    let dir = tempfile::tempdir().unwrap();
    let older = release::find("1.0").unwrap();
    write_release_zip(dir.path(), older);
    // same file name as 2.0 but the wrong inner folder
    fs::rename(older.archive_path(dir.path()), release::latest().archive_path(dir.path())).unwrap();
    let err = source::read_release_archive(release::latest(), dir.path()).unwrap_err();
    assert!(err.to_string().contains("Data.tsv"));
}

#[test]
fn classes_are_renamed_to_state_symbols() {
    let dir = setup();
    let tables = source::read_raw_folder(&dir.path().join("raw")).unwrap();
    let source = SourceData::read(&tables, &Conventions::default()).unwrap();
    let cognates: Vec<&str> = source.rows.iter().map(|r| r.cognate_class.as_str()).collect();
    // single-character sets first ("1", "3"), then "12"
    assert_eq!(cognates, ["b", "a", "c", "a", "?", "0"]);
    let correlates: Vec<&str> = source.rows.iter().map(|r| r.correlate_class.as_str()).collect();
    // numeric order, so "2" before "10"
    assert_eq!(correlates, ["b", "a", "a", "a", "?", "0"]);
}

#[test]
fn languages_and_meaning_lists_are_read() {
    let dir = setup();
    let tables = source::read_raw_folder(&dir.path().join("raw")).unwrap();
    let source = SourceData::read(&tables, &Conventions::default()).unwrap();
    assert_eq!(source.languages.name_of("hun"), Some("Hungarian"));
    assert_eq!(source.meaning_lists.names(), ["LJ_2009", "Swadesh_100"]);
    assert_eq!(source.meaning_lists.get("Swadesh_100").unwrap(), ["hand"]);
    assert_eq!(source.meaning_lists.get("LJ_2009").unwrap(), ["eye"]);
}

#[test]
fn older_releases_use_the_language_column_everywhere() {
    let data = "uralex_lang\turalex_mng\tcogn_set\tform_set\nfin\thand\ta\t1\n";
    let languages = "uralex_lang\tName\nfin\tFinnish\n";
    let lists = "uralex_mng\tLJ_rank\nhand\t1\n";
    let tables = SourceTables::from_texts("uralex-v1.0", data, languages, lists).unwrap();
    let source = SourceData::read(&tables, &Conventions::default()).unwrap();
    assert_eq!(source.languages.name_of("fin"), Some("fin"));
    assert!(source.meaning_lists.names().is_empty());
}

#[test]
fn source_data_becomes_a_dataset() {
    let dir = setup();
    let tables = source::read_raw_folder(&dir.path().join("raw")).unwrap();
    let conventions = Arc::new(Conventions::default());
    let source = SourceData::read(&tables, &conventions).unwrap();
    let dataset = source.into_dataset(Arc::clone(&conventions), Axis::Cognate).unwrap();
    assert_eq!(dataset.version(), "custom");
    assert_eq!(dataset.languages(), ["Estonian", "Finnish", "Hungarian"]);
    assert_eq!(dataset.meaning_lists(), ["LJ_2009", "Swadesh_100", "all"]);
    assert_eq!(dataset.character_alignment("Estonian", "eye"), ["?"]);
}

#[test]
fn too_many_classes_for_the_alphabet_are_rejected() {
    let mut data = String::from("lgid3\turalex_mng\tcogn_set\tform_set\n");
    for i in 0..40 {
        data.push_str(&format!("fin\thand\tx{i}\t1\n"));
    }
    let tables = SourceTables::from_texts("custom", &data, "lgid3\tASCII_name\nfin\tFinnish\n", "uralex_mng\n").unwrap();
    let err = SourceData::read(&tables, &Conventions::default()).unwrap_err();
    assert!(matches!(err, ExportError::MalformedTable { .. }));
}

#[test]
fn correlate_sets_must_be_numbers() {
    let data = "lgid3\turalex_mng\tcogn_set\tform_set\nfin\thand\ta\tx\n";
    let tables = SourceTables::from_texts("custom", data, "lgid3\tASCII_name\nfin\tFinnish\n", "uralex_mng\n").unwrap();
    let err = SourceData::read(&tables, &Conventions::default()).unwrap_err();
    assert!(err.to_string().contains("not a number"));
}

#[test]
fn languages_without_data_are_not_resolved() {
    let languages = "lgid3\tASCII_name\n\
fin\tFinnish\n\
fin2\tFinnish\n\
est\tEstonian\n\
est\tEesti\n\
liv\tLivonian\n";
    let data = "lgid3\turalex_mng\tcogn_set\tform_set\nfin\thand\ta\t1\nest\thand\ta\t1\n";
    let tables = SourceTables::from_texts("custom", data, languages, "uralex_mng\n").unwrap();
    let source = SourceData::read(&tables, &Conventions::default()).unwrap();
    assert_eq!(source.languages.len(), 2);
    assert_eq!(source.languages.name_of("fin"), Some("Finnish"));
    // first row of an id wins
    assert_eq!(source.languages.name_of("est"), Some("Estonian"));
    assert_eq!(source.languages.name_of("fin2"), None);
    assert_eq!(source.languages.name_of("liv"), None);
}

#[test]
fn languages_with_data_must_not_share_a_name() {
    let languages = "lgid3\tASCII_name\nfin\tFinnish\nfin2\tFinnish\n";
    let data = "lgid3\turalex_mng\tcogn_set\tform_set\nfin\thand\ta\t1\nfin2\thand\tb\t2\n";
    let tables = SourceTables::from_texts("custom", data, languages, "uralex_mng\n").unwrap();
    let err = SourceData::read(&tables, &Conventions::default()).unwrap_err();
    assert!(matches!(err, ExportError::MalformedTable { ref table, .. } if table == "Languages.tsv"));
}
