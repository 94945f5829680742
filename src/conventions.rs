//! Dataset-wide conventions: reserved codes and the ordering of character states.
//!
//! A single [`Conventions`] value is created at startup and shared (through an
//! `Arc`) by the reader, the [`crate::dataset::Dataset`] and the exporter. It is
//! never mutated after construction.

// custom made ordering for character states
use std::cmp::Ordering;

/// Name of the synthetic meaning list that contains every observed meaning.
pub const ALL_MEANINGS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    /// Code for "unknown / missing data", kept in alignments.
    pub unknown: String,
    /// Code for "no cognate / not applicable", dropped from alignments.
    pub absent: String,
    /// Symbols that character states are renamed to, in column order.
    pub state_alphabet: String,
    /// Columns of the meaning list table that are not meaning lists.
    pub non_list_columns: Vec<String>,
    pub all_meanings: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            unknown: String::from("?"),
            absent: String::from("0"),
            state_alphabet: String::from("abcdefghijklmnopqrstuvwxyz123456789"),
            non_list_columns: vec![
                String::from("LJ_rank"),
                String::from("uralex_mng"),
                String::from("mng_item"),
            ],
            all_meanings: String::from(ALL_MEANINGS),
        }
    }
}

impl Conventions {
    pub fn is_unknown(&self, code: &str) -> bool {
        code == self.unknown
    }
    pub fn is_absent(&self, code: &str) -> bool {
        code == self.absent
    }
    /// Missing codes never take part in state ordering or singleton counting.
    pub fn is_missing(&self, code: &str) -> bool {
        code.is_empty() || self.is_unknown(code) || self.is_absent(code)
    }
    pub fn unknown_symbol(&self) -> char {
        self.unknown.chars().next().unwrap_or('?')
    }
    /// The symbol a raw class is renamed to, given its rank among all classes.
    pub fn state_symbol(&self, rank: usize) -> Option<char> {
        self.state_alphabet.chars().nth(rank)
    }
    pub fn state_capacity(&self) -> usize {
        self.state_alphabet.chars().count()
    }
    // Characters outside the alphabet sort after it, by code point.
    fn state_key(&self, code: &str) -> Vec<u64> {
        let capacity = self.state_capacity() as u64;
        code.chars()
            .map(|c| match self.state_alphabet.chars().position(|s| s == c) {
                Some(position) => position as u64,
                None => capacity + c as u64,
            })
            .collect()
    }
    /// Alphabet order (letters before digits), not plain lexicographic order.
    pub fn compare_states(&self, a: &str, b: &str) -> Ordering {
        self.state_key(a).cmp(&self.state_key(b))
    }
    pub fn sort_states(&self, states: &mut [String]) {
        states.sort_by(|a, b| self.compare_states(a, b));
    }
}
