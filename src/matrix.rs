//! Binary presence/absence encoding of a dataset.
//!
//! Every meaning contributes one column per valid character state. A cell,
//! the codes one language has for one meaning, becomes a run of `0`/`1` (or
//! `?` when the language has no data for the meaning). Runs are concatenated
//! in meaning order to form the alignment row of a language.

use std::collections::HashMap;

use tracing::debug;

use crate::conventions::Conventions;
use crate::dataset::{DatasetView, OtherHasher};

/// Where ascertainment-bias marker columns go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ascertainment {
    None,
    /// One marker in front of each meaning.
    PerMeaning,
    /// One marker in front of the whole row.
    WholeRow,
}

/// Encodes a cell against the ordered valid states of its meaning.
pub fn encode_cell(codes: &[String], states: &[String], unknown: &str) -> String {
    if codes.len() == 1 && codes[0] == unknown {
        let symbol = unknown.chars().next().unwrap_or('?');
        return std::iter::repeat_n(symbol, states.len()).collect();
    }
    states
        .iter()
        .map(|state| if codes.contains(state) { '1' } else { '0' })
        .collect()
}

/// The marker prepended to a run: `?` when the run is entirely unknown,
/// otherwise `0`. Mixed runs get `0` as well, so every row keeps `nchar`
/// columns.
pub fn ascertainment_marker(run: &str, unknown: char) -> char {
    let mut chars = run.chars();
    match chars.next() {
        Some(first) if first == unknown && chars.all(|c| c == first) => unknown,
        _ => '0',
    }
}

/// What a column of the matrix stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column<'m> {
    /// Ascertainment marker of a meaning, or of the whole row when `None`.
    Marker { meaning: Option<&'m str> },
    State { meaning: &'m str, state: &'m str },
}

/// Contiguous 1-based column range of one meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    pub meaning: String,
    pub start: usize,
    pub end: usize,
}

impl Charset {
    /// `N` for a single column, `start-end` otherwise.
    pub fn range(&self) -> String {
        if self.start == self.end {
            self.start.to_string()
        } else {
            format!("{}-{}", self.start, self.end)
        }
    }
}

/// The matrix of one export run. Valid states are computed once per meaning
/// when the matrix is built and reused for every language.
pub struct CharacterMatrix<'d, D: DatasetView + ?Sized> {
    dataset: &'d D,
    unknown: String,
    unknown_symbol: char,
    ascertainment: Ascertainment,
    valid_states: HashMap<String, Vec<String>, OtherHasher>,
}

impl<'d, D: DatasetView + ?Sized> CharacterMatrix<'d, D> {
    pub fn new(dataset: &'d D, conventions: &Conventions, ascertainment: Ascertainment) -> Self {
        let mut valid_states: HashMap<String, Vec<String>, OtherHasher> = HashMap::default();
        for meaning in dataset.meanings() {
            let mut states: Vec<String> = Vec::new();
            for language in dataset.languages() {
                for code in dataset.character_alignment(language, meaning) {
                    if !conventions.is_unknown(code) && !states.contains(code) {
                        states.push(code.clone());
                    }
                }
            }
            conventions.sort_states(&mut states);
            valid_states.insert(meaning.clone(), states);
        }
        debug!(meanings = valid_states.len(), "valid character states computed");
        Self {
            dataset,
            unknown: conventions.unknown.clone(),
            unknown_symbol: conventions.unknown_symbol(),
            ascertainment,
            valid_states,
        }
    }
    /// Ordered valid states of a meaning; empty for a meaning without data.
    pub fn valid_states(&self, meaning: &str) -> &[String] {
        self.valid_states.get(meaning).map(Vec::as_slice).unwrap_or(&[])
    }
    /// Encoded cell, with its own marker in front when markers are per meaning.
    pub fn cell(&self, language: &str, meaning: &str) -> String {
        let codes = self.dataset.character_alignment(language, meaning);
        let run = encode_cell(codes, self.valid_states(meaning), &self.unknown);
        match self.ascertainment {
            Ascertainment::PerMeaning => {
                let mut cell = String::with_capacity(run.len() + 1);
                cell.push(ascertainment_marker(&run, self.unknown_symbol));
                cell.push_str(&run);
                cell
            }
            _ => run,
        }
    }
    /// Full alignment row of a language.
    pub fn row(&self, language: &str) -> String {
        let row: String = self
            .dataset
            .meanings()
            .iter()
            .map(|meaning| self.cell(language, meaning))
            .collect();
        match self.ascertainment {
            Ascertainment::WholeRow => {
                let mut full = String::with_capacity(row.len() + 1);
                full.push(ascertainment_marker(&row, self.unknown_symbol));
                full.push_str(&row);
                full
            }
            _ => row,
        }
    }
    /// Number of columns a meaning occupies.
    pub fn width(&self, meaning: &str) -> usize {
        let marker = usize::from(self.ascertainment == Ascertainment::PerMeaning);
        self.valid_states(meaning).len() + marker
    }
    pub fn nchar(&self) -> usize {
        let marker = usize::from(self.ascertainment == Ascertainment::WholeRow);
        marker
            + self
                .dataset
                .meanings()
                .iter()
                .map(|m| self.width(m))
                .sum::<usize>()
    }
    /// Every column in matrix order.
    pub fn columns(&self) -> Vec<Column<'_>> {
        let mut columns = Vec::with_capacity(self.nchar());
        if self.ascertainment == Ascertainment::WholeRow {
            columns.push(Column::Marker { meaning: None });
        }
        for meaning in self.dataset.meanings() {
            if self.ascertainment == Ascertainment::PerMeaning {
                columns.push(Column::Marker { meaning: Some(meaning.as_str()) });
            }
            for state in self.valid_states(meaning) {
                columns.push(Column::State { meaning: meaning.as_str(), state: state.as_str() });
            }
        }
        columns
    }
    /// Column ranges per meaning, in meaning order. A meaning without columns
    /// has no charset.
    pub fn charsets(&self) -> Vec<Charset> {
        let mut start = match self.ascertainment {
            Ascertainment::WholeRow => 2,
            _ => 1,
        };
        let mut charsets = Vec::new();
        for meaning in self.dataset.meanings() {
            let width = self.width(meaning);
            if width == 0 {
                continue;
            }
            let end = start + width - 1;
            charsets.push(Charset { meaning: meaning.clone(), start, end });
            start = end + 1;
        }
        charsets
    }
}
