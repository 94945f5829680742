//! The dataset model: typed row records, the filters applied to them and the
//! indexes the exporter queries.
//!
//! Filters narrow a selection of row numbers (a roaring bitmap) and are applied
//! in the order exclude languages, restrict to a meaning list, remove
//! singletons. The derived indexes (languages, meanings and the
//! `(language, meaning)` alignment lookup) are rebuilt explicitly once the
//! filtering is done, see [`Dataset::rebuild_indices`].

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::BuildHasherDefault;
use std::sync::Arc;

// used to keep the one-to-one mapping between language ids and ASCII names
use bimap::BiMap;
// used for the selection of rows that survive filtering
use roaring::RoaringBitmap;
use seahash::SeaHasher;
use tracing::{debug, info};

use crate::conventions::{ALL_MEANINGS, Conventions};
use crate::error::{ExportError, Result};

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- Axis -------------
/// Which of the two classifications of a row is turned into characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Cognate classes (historical descent).
    #[default]
    Cognate,
    /// Correlate classes (formal similarity).
    Correlate,
}

// ------------- Rows -------------
/// A row as delivered by the reader, before its language is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub language_id: String,
    pub meaning_id: String,
    pub cognate_class: String,
    pub correlate_class: String,
}

impl RawRow {
    pub fn new(language_id: &str, meaning_id: &str, cognate_class: &str, correlate_class: &str) -> Self {
        Self {
            language_id: language_id.to_string(),
            meaning_id: meaning_id.to_string(),
            cognate_class: cognate_class.to_string(),
            correlate_class: correlate_class.to_string(),
        }
    }
}

/// One observation, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    language_id: String,
    language: String,
    meaning: String,
    cognate_class: String,
    correlate_class: String,
}

impl RowRecord {
    pub fn language_id(&self) -> &str {
        &self.language_id
    }
    /// The ASCII name of the language, used as taxon label.
    pub fn language(&self) -> &str {
        &self.language
    }
    pub fn meaning(&self) -> &str {
        &self.meaning
    }
    pub fn cognate_class(&self) -> &str {
        &self.cognate_class
    }
    pub fn class(&self, axis: Axis) -> &str {
        match axis {
            Axis::Cognate => &self.cognate_class,
            Axis::Correlate => &self.correlate_class,
        }
    }
}

// ------------- Languages -------------
/// Language id to ASCII name. Both sides are unique.
#[derive(Debug, Default, Clone)]
pub struct LanguageLookup {
    kept: BiMap<String, String>,
}

impl LanguageLookup {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, id: &str, ascii_name: &str) -> Result<()> {
        self.kept
            .insert_no_overwrite(id.to_string(), ascii_name.to_string())
            .map_err(|(id, name)| {
                ExportError::configuration(
                    format!("Language id '{id}' and ASCII name '{name}' must both be unique"),
                    Vec::new(),
                )
            })
    }
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.kept.get_by_left(id).map(String::as_str)
    }
    pub fn id_of(&self, ascii_name: &str) -> Option<&str> {
        self.kept.get_by_right(ascii_name).map(String::as_str)
    }
    /// (id, ASCII name) pairs ordered by name.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> =
            self.kept.iter().map(|(id, name)| (id.as_str(), name.as_str())).collect();
        entries.sort_by(|a, b| a.1.cmp(b.1));
        entries
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

// ------------- Meaning lists -------------
/// Named subsets of meanings. The synthetic list `all` is not stored here.
#[derive(Debug, Default, Clone)]
pub struct MeaningLists {
    lists: BTreeMap<String, Vec<String>>,
}

impl MeaningLists {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, name: &str, members: Vec<String>) {
        self.lists.insert(name.to_string(), members);
    }
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.lists.get(name).map(Vec::as_slice)
    }
    pub fn names(&self) -> Vec<String> {
        self.lists.keys().cloned().collect()
    }
    pub fn contains(&self, name: &str, meaning: &str) -> bool {
        self.lists.get(name).is_some_and(|m| m.iter().any(|x| x == meaning))
    }
}

// ------------- Filters -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub exclude_languages: Vec<String>,
    pub meaning_list: String,
    /// Remove singleton states on this axis, if set.
    pub singletons: Option<Axis>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            exclude_languages: Vec::new(),
            meaning_list: String::from(ALL_MEANINGS),
            singletons: None,
        }
    }
}

// ------------- Dataset view -------------
/// A (language, meaning, code) triple of the filtered dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation<'a> {
    pub language: &'a str,
    pub meaning: &'a str,
    pub code: &'a str,
}

/// What the exporter needs to know about a dataset.
pub trait DatasetView {
    /// Taxa, sorted.
    fn languages(&self) -> &[String];
    /// Meanings of the active meaning list, sorted.
    fn meanings(&self) -> &[String];
    /// Known meaning list names, including the synthetic list of all meanings.
    fn meaning_lists(&self) -> Vec<String>;
    /// Codes of a cell, or just the unknown code if the cell has no rows.
    fn character_alignment(&self, language: &str, meaning: &str) -> &[String];
    fn version(&self) -> &str;
    fn excluded_languages(&self) -> &[String];
    /// Active meaning list, annotated with members that did not survive filtering.
    fn meaning_list(&self) -> String;
    /// Every filtered row as a triple, ordered by language then meaning.
    fn observations(&self) -> Vec<Observation<'_>>;
}

// ------------- Dataset -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey {
    language: usize,
    meaning: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    conventions: Arc<Conventions>,
    version: String,
    axis: Axis,
    // owns the records, the filters only narrow the selection
    records: Vec<RowRecord>,
    selection: RoaringBitmap,
    meaning_lists: MeaningLists,
    excluded_languages: Vec<String>,
    active_list: String,
    listed_meanings: Vec<String>,
    // derived from the selection by rebuild_indices
    languages: Vec<String>,
    meanings: Vec<String>,
    unlisted_meanings: Vec<String>,
    alignments: HashMap<CellKey, Vec<String>, OtherHasher>,
    unknown_cell: Vec<String>,
}

impl Dataset {
    /// Resolves the language of every row. A language id missing from the
    /// lookup is an unresolvable reference.
    pub fn load(rows: Vec<RawRow>, languages: &LanguageLookup, conventions: Arc<Conventions>) -> Result<Self> {
        if u32::try_from(rows.len()).is_err() {
            return Err(ExportError::SourceUnavailable(format!("{} rows is more than can be indexed", rows.len())));
        }
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let language = languages.name_of(&row.language_id).ok_or_else(|| {
                ExportError::configuration(
                    format!(
                        "Row for meaning '{}' refers to unknown language id '{}'",
                        row.meaning_id, row.language_id
                    ),
                    languages.entries().iter().map(|(id, _)| id.to_string()).collect(),
                )
            })?;
            records.push(RowRecord {
                language: language.to_string(),
                language_id: row.language_id,
                meaning: row.meaning_id,
                cognate_class: row.cognate_class.trim().to_string(),
                correlate_class: row.correlate_class.trim().to_string(),
            });
        }
        let mut selection = RoaringBitmap::new();
        selection.insert_range(0..records.len() as u32);
        let unknown_cell = vec![conventions.unknown.clone()];
        let mut dataset = Self {
            conventions,
            version: String::from(crate::source::CUSTOM_VERSION),
            axis: Axis::default(),
            records,
            selection,
            meaning_lists: MeaningLists::new(),
            excluded_languages: Vec::new(),
            active_list: String::new(),
            listed_meanings: Vec::new(),
            languages: Vec::new(),
            meanings: Vec::new(),
            unlisted_meanings: Vec::new(),
            alignments: HashMap::default(),
            unknown_cell,
        };
        dataset.active_list = dataset.conventions.all_meanings.clone();
        dataset.rebuild_indices();
        info!(rows = dataset.records.len(), languages = dataset.languages.len(), "dataset loaded");
        Ok(dataset)
    }
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }
    pub fn with_meaning_lists(mut self, meaning_lists: MeaningLists) -> Self {
        self.meaning_lists = meaning_lists;
        self
    }
    /// Selects the axis the alignments are built from.
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self.rebuild_indices();
        self
    }
    pub fn axis(&self) -> Axis {
        self.axis
    }
    /// Runs every filter in order and rebuilds the indexes once.
    pub fn apply_filters(&mut self, filters: &Filters) -> Result<()> {
        self.filter_languages(&filters.exclude_languages)?;
        self.filter_meaning_list(&filters.meaning_list)?;
        if let Some(axis) = filters.singletons {
            self.filter_singletons(axis);
        }
        self.rebuild_indices();
        Ok(())
    }
    /// Removes the rows of the excluded languages. Names must be known
    /// languages of the unfiltered dataset.
    pub fn filter_languages(&mut self, exclude: &[String]) -> Result<()> {
        let known: BTreeSet<&str> = self.records.iter().map(|r| r.language()).collect();
        for name in exclude {
            if !known.contains(name.as_str()) {
                return Err(ExportError::configuration(
                    format!("Unknown language in exclude language list: {name}"),
                    known.iter().map(|n| n.to_string()).collect(),
                ));
            }
        }
        for name in exclude {
            if !self.excluded_languages.contains(name) {
                self.excluded_languages.push(name.clone());
            }
        }
        let excluded: HashSet<&str, OtherHasher> = exclude.iter().map(String::as_str).collect();
        self.retain(|record| !excluded.contains(record.language()));
        debug!(excluded = exclude.len(), rows = self.selection.len(), "language filter applied");
        Ok(())
    }
    /// Keeps only the rows whose meaning belongs to the named list.
    pub fn filter_meaning_list(&mut self, name: &str) -> Result<()> {
        let listed: Vec<String> = if name == self.conventions.all_meanings {
            self.records
                .iter()
                .map(|r| r.meaning().to_string())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        } else {
            match self.meaning_lists.get(name) {
                Some(members) => members.to_vec(),
                None => {
                    return Err(ExportError::configuration(
                        format!("Invalid meaning list '{name}'"),
                        self.meaning_list_names(),
                    ));
                }
            }
        };
        let members: HashSet<&str, OtherHasher> = listed.iter().map(String::as_str).collect();
        let selection: RoaringBitmap = self
            .selection
            .iter()
            .filter(|&i| members.contains(self.records[i as usize].meaning()))
            .collect();
        self.selection = selection;
        self.active_list = name.to_string();
        self.listed_meanings = listed;
        debug!(list = name, rows = self.selection.len(), "meaning list filter applied");
        Ok(())
    }
    /// Removes rows whose code occurs exactly once for its meaning on `axis`.
    /// Missing codes are never counted nor removed.
    pub fn filter_singletons(&mut self, axis: Axis) {
        let mut counts: HashMap<(&str, &str), usize, OtherHasher> = HashMap::default();
        for i in self.selection.iter() {
            let record = &self.records[i as usize];
            let code = record.class(axis);
            if !self.conventions.is_missing(code) {
                *counts.entry((record.meaning(), code)).or_insert(0) += 1;
            }
        }
        let singletons: Vec<u32> = self
            .selection
            .iter()
            .filter(|&i| {
                let record = &self.records[i as usize];
                counts.get(&(record.meaning(), record.class(axis))) == Some(&1)
            })
            .collect();
        for i in &singletons {
            self.selection.remove(*i);
        }
        debug!(removed = singletons.len(), rows = self.selection.len(), "singleton filter applied");
    }
    /// Derives languages, meanings and cell alignments from the current selection.
    pub fn rebuild_indices(&mut self) {
        let selected = || self.selection.iter().map(|i| &self.records[i as usize]);
        let languages: Vec<String> = selected()
            .map(|r| r.language().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let meanings: Vec<String> = selected()
            .map(|r| r.meaning().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut alignments: HashMap<CellKey, Vec<String>, OtherHasher> = HashMap::default();
        for record in selected() {
            let key = match (
                languages.binary_search_by(|l| l.as_str().cmp(record.language())),
                meanings.binary_search_by(|m| m.as_str().cmp(record.meaning())),
            ) {
                (Ok(language), Ok(meaning)) => CellKey { language, meaning },
                _ => continue,
            };
            let code = record.class(self.axis);
            let cell = match alignments.entry(key) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(Vec::new()),
            };
            if !code.is_empty() && !self.conventions.is_absent(code) {
                cell.push(code.to_string());
            }
        }
        for cell in alignments.values_mut() {
            if !cell.iter().any(|c| self.conventions.is_unknown(c)) {
                self.conventions.sort_states(cell);
            }
        }
        self.unlisted_meanings = self
            .listed_meanings
            .iter()
            .filter(|m| meanings.binary_search(m).is_err())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.languages = languages;
        self.meanings = meanings;
        self.alignments = alignments;
    }
    /// Rows of the current selection, in load order.
    pub fn rows(&self) -> impl Iterator<Item = &RowRecord> + '_ {
        self.selection.iter().map(|i| &self.records[i as usize])
    }
    pub fn row_count(&self) -> usize {
        self.selection.len() as usize
    }
    /// Every language of the unfiltered dataset.
    pub fn all_languages(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.language().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
    pub fn meaning_list_names(&self) -> Vec<String> {
        let mut names = self.meaning_lists.names();
        names.push(self.conventions.all_meanings.clone());
        names
    }
    pub fn unlisted_meanings(&self) -> &[String] {
        &self.unlisted_meanings
    }
    fn retain(&mut self, keep: impl Fn(&RowRecord) -> bool) {
        let selection: RoaringBitmap = self
            .selection
            .iter()
            .filter(|&i| keep(&self.records[i as usize]))
            .collect();
        self.selection = selection;
    }
}

impl DatasetView for Dataset {
    fn languages(&self) -> &[String] {
        &self.languages
    }
    fn meanings(&self) -> &[String] {
        &self.meanings
    }
    fn meaning_lists(&self) -> Vec<String> {
        self.meaning_list_names()
    }
    fn character_alignment(&self, language: &str, meaning: &str) -> &[String] {
        let key = match (
            self.languages.binary_search_by(|l| l.as_str().cmp(language)),
            self.meanings.binary_search_by(|m| m.as_str().cmp(meaning)),
        ) {
            (Ok(language), Ok(meaning)) => CellKey { language, meaning },
            _ => return &self.unknown_cell,
        };
        self.alignments
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&self.unknown_cell)
    }
    fn version(&self) -> &str {
        &self.version
    }
    fn excluded_languages(&self) -> &[String] {
        &self.excluded_languages
    }
    fn meaning_list(&self) -> String {
        if self.unlisted_meanings.is_empty() {
            self.active_list.clone()
        } else {
            format!(
                "{} (excluded meanings: {})",
                self.active_list,
                self.unlisted_meanings.join(", ")
            )
        }
    }
    fn observations(&self) -> Vec<Observation<'_>> {
        let mut observations: Vec<Observation<'_>> = self
            .rows()
            .map(|r| Observation {
                language: r.language(),
                meaning: r.meaning(),
                code: r.class(self.axis),
            })
            .collect();
        // stable, so rows of one cell keep their load order
        observations.sort_by(|a, b| (a.language, a.meaning).cmp(&(b.language, b.meaning)));
        observations
    }
}
