//! uralex-export – phylogenetic character matrices from the UraLex basic vocabulary dataset.
//!
//! The dataset records, for many Uralic languages and a fixed set of meanings,
//! which cognate class (and which correlate class) the word for a meaning
//! belongs to. This crate turns those judgments into input for phylogenetic
//! software:
//! * NEXUS in the BEAST, MrBayes or SplitsTree dialect, a binary
//!   presence/absence matrix with one column per character state, optional
//!   per-meaning charsets and ascertainment-bias marker columns.
//! * CLDF, one `Language_ID,Feature_ID,Value` row per observation.
//! * A "harvest" table with one column per meaning.
//!
//! ## Modules
//! * [`source`] – Reading the TSV tables from a `raw/` folder or a release zip file.
//! * [`release`] – The published releases and where their files live.
//! * [`tsv`] – Tab separated table parsing.
//! * [`reader`] – Field detection and class renaming, producing row records.
//! * [`dataset`] – The [`dataset::Dataset`] model, its filters and indexes.
//! * [`matrix`] – Valid character states, cell encoding and ascertainment markers.
//! * [`exporter`] – Format and dialect selection and serialization.
//! * [`conventions`] – Reserved codes and the character state alphabet.
//! * [`settings`] – Defaults read through the `config` crate.
//! * [`output`] – Writing the exported lines.
//!
//! ## Pipeline
//! Tables are read, rows are loaded into a dataset, the dataset is filtered
//! (excluded languages, then a meaning list, then singleton states) and the
//! exporter produces the output lines. Everything runs once, on one thread.
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use uralex_export::conventions::Conventions;
//! use uralex_export::dataset::{Dataset, DatasetView, LanguageLookup, RawRow};
//! use uralex_export::exporter::{ExportOptions, Exporter};
//!
//! let mut languages = LanguageLookup::new();
//! languages.insert("l1", "L1").unwrap();
//! languages.insert("l2", "L2").unwrap();
//! let rows = vec![
//!     RawRow::new("l1", "M1", "a", "1"),
//!     RawRow::new("l2", "M1", "a", "1"),
//!     RawRow::new("l2", "M1", "b", "2"),
//! ];
//! let conventions = Arc::new(Conventions::default());
//! let dataset = Dataset::load(rows, &languages, Arc::clone(&conventions)).unwrap();
//! let options = ExportOptions::parse("nexus", Some("splitstree")).unwrap();
//! let lines = Exporter::new(&dataset, &conventions, options).export();
//! assert!(lines.contains(&String::from("L2 11")));
//! assert_eq!(dataset.languages(), ["L1", "L2"]);
//! ```

pub mod conventions;
pub mod dataset;
pub mod error;
pub mod exporter;
pub mod matrix;
pub mod output;
pub mod reader;
pub mod release;
pub mod settings;
pub mod source;
pub mod tsv;

pub use error::{ExportError, Result};
