//! Turns the source tables into row records, the language lookup and the
//! meaning lists.
//!
//! Older releases name the language column `uralex_lang` in every table,
//! newer ones use `lgid3` for the id and `ASCII_name` for the display name.
//! Raw class codes are renamed to state alphabet symbols here, so that the
//! rest of the pipeline only ever sees single-symbol states.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::conventions::Conventions;
use crate::dataset::{Axis, Dataset, LanguageLookup, MeaningLists, OtherHasher, RawRow};
use crate::error::{ExportError, Result};
use crate::source::SourceTables;
use crate::tsv::Table;

const LANGUAGE_ID_COLUMNS: [&str; 2] = ["lgid3", "uralex_lang"];
const ASCII_NAME_COLUMNS: [&str; 2] = ["ASCII_name", "uralex_lang"];
const MEANING_COLUMN: &str = "uralex_mng";
const COGNATE_COLUMN: &str = "cogn_set";
const CORRELATE_COLUMN: &str = "form_set";

/// Everything the dataset is built from.
#[derive(Debug, Clone)]
pub struct SourceData {
    pub version: String,
    pub rows: Vec<RawRow>,
    pub languages: LanguageLookup,
    pub meaning_lists: MeaningLists,
}

impl SourceData {
    pub fn read(tables: &SourceTables, conventions: &Conventions) -> Result<Self> {
        let data = &tables.data;
        let id_column = data.first_column_of(&LANGUAGE_ID_COLUMNS)?;
        let language_ids = data.column(id_column)?;
        let meanings = data.column(MEANING_COLUMN)?;
        let cognates = ClassRenaming::cognates(data, conventions)?;
        let correlates = ClassRenaming::correlates(data, conventions)?;
        let mut rows = Vec::with_capacity(data.len());
        for i in 0..data.len() {
            rows.push(RawRow {
                language_id: language_ids[i].trim().to_string(),
                meaning_id: meanings[i].trim().to_string(),
                cognate_class: cognates.renamed(i),
                correlate_class: correlates.renamed(i),
            });
        }
        let languages = read_languages(&tables.languages, id_column, &rows)?;
        let meaning_lists = read_meaning_lists(&tables.meaning_lists, conventions)?;
        debug!(
            rows = rows.len(),
            languages = languages.len(),
            lists = meaning_lists.names().len(),
            "source tables read"
        );
        Ok(Self { version: tables.version.clone(), rows, languages, meaning_lists })
    }
    /// Loads the rows into a dataset that aligns on `axis`.
    pub fn into_dataset(self, conventions: Arc<Conventions>, axis: Axis) -> Result<Dataset> {
        let dataset = Dataset::load(self.rows, &self.languages, conventions)?
            .with_version(&self.version)
            .with_meaning_lists(self.meaning_lists)
            .with_axis(axis);
        Ok(dataset)
    }
}

/// Resolves the languages that have rows. Languages.tsv rows for languages
/// without data are never checked, and the first row of an id wins.
fn read_languages(table: &Table, id_column: &str, rows: &[RawRow]) -> Result<LanguageLookup> {
    let used: HashSet<&str, OtherHasher> = rows.iter().map(|r| r.language_id.as_str()).collect();
    // the id column of the data table names the id column here too
    let ids = table.column(id_column)?;
    let names = table.column(table.first_column_of(&ASCII_NAME_COLUMNS)?)?;
    let mut lookup = LanguageLookup::new();
    for (id, name) in ids.iter().zip(names) {
        let (id, name) = (id.trim(), name.trim());
        if !used.contains(id) || lookup.name_of(id).is_some() {
            continue;
        }
        // two languages with data sharing a name would merge into one taxon
        lookup.insert(id, name).map_err(|e| ExportError::malformed(table.name(), e.to_string()))?;
    }
    debug!(listed = ids.len(), resolved = lookup.len(), "languages resolved");
    Ok(lookup)
}

fn read_meaning_lists(table: &Table, conventions: &Conventions) -> Result<MeaningLists> {
    let meanings = table.column(MEANING_COLUMN)?;
    let mut lists = MeaningLists::new();
    for header in table.headers() {
        if conventions.non_list_columns.contains(header) {
            continue;
        }
        let members: Vec<String> = table
            .column(header)?
            .iter()
            .zip(meanings)
            .filter(|(flag, _)| flag.trim() == "1")
            .map(|(_, meaning)| meaning.trim().to_string())
            .collect();
        lists.insert(header, members);
    }
    Ok(lists)
}

// ------------- Class renaming -------------
/// Maps the raw classes of one column to state alphabet symbols.
struct ClassRenaming<'t> {
    raw: &'t [String],
    order: Vec<String>,
    conventions: &'t Conventions,
}

impl<'t> ClassRenaming<'t> {
    /// Cognate sets: single-character sets in sorted order, then longer ones.
    fn cognates(data: &'t Table, conventions: &'t Conventions) -> Result<Self> {
        let raw = data.column(COGNATE_COLUMN)?;
        let mut order: Vec<String> = Self::distinct(raw, conventions).into_iter().collect();
        order.sort_by(|a, b| (a.chars().count() > 1, a).cmp(&(b.chars().count() > 1, b)));
        Self::checked(data.name(), raw, order, conventions)
    }
    /// Correlate sets are numbered, in ascending numeric order.
    fn correlates(data: &'t Table, conventions: &'t Conventions) -> Result<Self> {
        let raw = data.column(CORRELATE_COLUMN)?;
        let mut numbered = Vec::new();
        for set in Self::distinct(raw, conventions) {
            let number: u64 = set.parse().map_err(|_| {
                ExportError::malformed(data.name(), format!("correlate set '{set}' is not a number"))
            })?;
            numbered.push((number, set));
        }
        numbered.sort();
        let order = numbered.into_iter().map(|(_, set)| set).collect();
        Self::checked(data.name(), raw, order, conventions)
    }
    fn distinct(raw: &[String], conventions: &Conventions) -> BTreeSet<String> {
        raw.iter()
            .map(|s| s.trim())
            .filter(|s| !conventions.is_missing(s))
            .map(str::to_string)
            .collect()
    }
    fn checked(table: &str, raw: &'t [String], order: Vec<String>, conventions: &'t Conventions) -> Result<Self> {
        if order.len() > conventions.state_capacity() {
            return Err(ExportError::malformed(
                table,
                format!(
                    "{} distinct classes, but only {} state symbols are available",
                    order.len(),
                    conventions.state_capacity()
                ),
            ));
        }
        Ok(Self { raw, order, conventions })
    }
    /// The renamed class of row `i`; missing codes are kept as they are.
    fn renamed(&self, i: usize) -> String {
        let class = self.raw[i].trim();
        if self.conventions.is_missing(class) {
            return class.to_string();
        }
        self.order
            .iter()
            .position(|c| c == class)
            .and_then(|rank| self.conventions.state_symbol(rank))
            .map(String::from)
            .unwrap_or_else(|| class.to_string())
    }
}
