//! Serialization of a dataset into NEXUS (BEAST, MrBayes, SplitsTree), CLDF
//! and harvest tables.
//!
//! [`ExportOptions`] validates the requested format and dialect before any
//! data is touched. [`Exporter::export`] builds a fresh
//! [`CharacterMatrix`] on every call, so nothing computed for one run leaks
//! into the next.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::conventions::Conventions;
use crate::dataset::DatasetView;
use crate::error::{ExportError, Result};
use crate::matrix::{Ascertainment, CharacterMatrix, Column};

lazy_static! {
    // NEXUS tokens that can be written without quotes
    static ref PLAIN_TOKEN: Regex = Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap();
}

pub const CLDF_HEADER: &str = "Language_ID,Feature_ID,Value";

// ------------- Format and dialect -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Nexus,
    Cldf,
    Harvest,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Nexus, Format::Cldf, Format::Harvest];
    pub fn name(&self) -> &'static str {
        match self {
            Format::Nexus => "nexus",
            Format::Cldf => "cldf",
            Format::Harvest => "harvest",
        }
    }
    /// Dialects the format can be written in.
    pub fn dialects(&self) -> &'static [Dialect] {
        match self {
            Format::Nexus => &Dialect::ALL,
            _ => &[],
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Format {
    type Err = ExportError;
    fn from_str(s: &str) -> Result<Self> {
        Format::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| {
                ExportError::configuration(
                    format!("Invalid export format '{s}'"),
                    Format::ALL.iter().map(|f| f.name().to_string()).collect(),
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MrBayes,
    Beast,
    SplitsTree,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::MrBayes, Dialect::Beast, Dialect::SplitsTree];
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MrBayes => "mrbayes",
            Dialect::Beast => "beast",
            Dialect::SplitsTree => "splitstree",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dialect {
    type Err = ExportError;
    fn from_str(s: &str) -> Result<Self> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| {
                ExportError::configuration(
                    format!("Invalid nexus dialect '{s}'"),
                    Dialect::ALL.iter().map(|d| d.name().to_string()).collect(),
                )
            })
    }
}

// ------------- Options -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    format: Format,
    dialect: Option<Dialect>,
    charsets: bool,
    labels: bool,
}

impl ExportOptions {
    /// Validates a format/dialect combination. NEXUS defaults to BEAST; the
    /// other formats take no dialect.
    pub fn new(format: Format, dialect: Option<Dialect>) -> Result<Self> {
        let dialect = match (format, dialect) {
            (Format::Nexus, None) => Some(Dialect::Beast),
            (Format::Nexus, Some(d)) => Some(d),
            (_, None) => None,
            (other, Some(d)) => {
                return Err(ExportError::configuration(
                    format!("Invalid {other} dialect '{d}', the {other} format has no dialects"),
                    other.dialects().iter().map(|d| d.name().to_string()).collect(),
                ));
            }
        };
        Ok(Self { format, dialect, charsets: true, labels: false })
    }
    /// Parses format and dialect names, format first.
    pub fn parse(format: &str, dialect: Option<&str>) -> Result<Self> {
        let format: Format = format.parse()?;
        let dialect = dialect.map(str::parse::<Dialect>).transpose()?;
        Self::new(format, dialect)
    }
    pub fn with_charsets(mut self, charsets: bool) -> Self {
        self.charsets = charsets;
        self
    }
    /// Labeled character states only exist for BEAST, any other NEXUS
    /// dialect is switched to BEAST.
    pub fn with_labels(mut self, labels: bool) -> Self {
        if labels && self.format == Format::Nexus && self.dialect != Some(Dialect::Beast) {
            warn!(
                requested = %self.dialect.map(|d| d.name()).unwrap_or("none"),
                "labeled character states need the beast dialect, switching to beast"
            );
            self.dialect = Some(Dialect::Beast);
        }
        if labels && self.format != Format::Nexus {
            warn!(format = %self.format, "labeled character states only apply to nexus, ignored");
        }
        self.labels = labels && self.format == Format::Nexus;
        self
    }
    pub fn format(&self) -> Format {
        self.format
    }
    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }
    pub fn charsets(&self) -> bool {
        self.charsets
    }
    pub fn labels(&self) -> bool {
        self.labels
    }
    fn ascertainment(&self) -> Ascertainment {
        match (self.dialect, self.charsets) {
            (Some(Dialect::Beast), true) => Ascertainment::PerMeaning,
            (Some(Dialect::Beast), false) => Ascertainment::WholeRow,
            _ => Ascertainment::None,
        }
    }
}

// ------------- Exporter -------------
pub struct Exporter<'d, D: DatasetView + ?Sized> {
    dataset: &'d D,
    conventions: &'d Conventions,
    options: ExportOptions,
}

impl<'d, D: DatasetView + ?Sized> Exporter<'d, D> {
    pub fn new(dataset: &'d D, conventions: &'d Conventions, options: ExportOptions) -> Self {
        Self { dataset, conventions, options }
    }
    pub fn set_options(&mut self, options: ExportOptions) {
        self.options = options;
    }
    /// Exported lines, without line terminators.
    pub fn export(&self) -> Vec<String> {
        let lines = match self.options.format {
            Format::Nexus => self.export_nexus(),
            Format::Cldf => self.export_cldf(),
            Format::Harvest => self.export_harvest(),
        };
        info!(
            format = %self.options.format,
            taxa = self.dataset.languages().len(),
            meanings = self.dataset.meanings().len(),
            lines = lines.len(),
            "export complete"
        );
        lines
    }
    fn matrix(&self) -> CharacterMatrix<'d, D> {
        CharacterMatrix::new(self.dataset, self.conventions, self.options.ascertainment())
    }

    // ------------- NEXUS -------------
    fn export_nexus(&self) -> Vec<String> {
        let matrix = self.matrix();
        let mut lines = self.nexus_header();
        lines.extend(self.taxa_block());
        lines.extend(self.characters_block(&matrix));
        match self.options.dialect {
            Some(Dialect::Beast) => lines.extend(self.assumptions_block(&matrix)),
            Some(Dialect::MrBayes) => lines.extend(self.mrbayes_block(&matrix)),
            _ => (),
        }
        lines
    }
    fn nexus_header(&self) -> Vec<String> {
        let mut lines = vec![String::from("#NEXUS")];
        if let Some(dialect) = self.options.dialect {
            lines.push(format!("[ dialect: {dialect} ]"));
        }
        lines.push(format!("[ data version: {} ]", self.dataset.version()));
        lines.push(format!("[ meaning list: {} ]", self.dataset.meaning_list()));
        let excluded = self.dataset.excluded_languages();
        if !excluded.is_empty() {
            let quoted: Vec<String> = excluded.iter().map(|l| format!("'{l}'")).collect();
            lines.push(format!("[ exclude taxa: {} ]", quoted.join(", ")));
        }
        if self.options.charsets {
            lines.push(String::from("[ Partitioning: per-meaning ]"));
        } else {
            lines.push(String::from("[ Partitioning: none ]"));
        }
        lines.push(String::new());
        lines
    }
    fn taxa_block(&self) -> Vec<String> {
        let languages = self.dataset.languages();
        let mut taxlabels = String::from("taxlabels");
        for language in languages {
            taxlabels.push(' ');
            taxlabels.push_str(&nexus_token(language));
        }
        taxlabels.push(';');
        vec![
            String::from("begin taxa;"),
            format!("dimensions ntax={};", languages.len()),
            taxlabels,
            String::from("end;"),
            String::new(),
        ]
    }
    fn characters_block(&self, matrix: &CharacterMatrix<'d, D>) -> Vec<String> {
        let mut lines = vec![
            String::from("begin characters;"),
            format!("dimensions nchar={};", matrix.nchar()),
        ];
        if self.options.labels {
            lines.push(String::from("format missing=? datatype=standard symbols=\"01\";"));
            lines.extend(self.charstatelabels(matrix));
        } else {
            match self.options.dialect {
                Some(Dialect::SplitsTree) => lines.push(String::from("format symbols=\"01\" missing=?;")),
                _ => lines.push(String::from("format missing=? datatype=restriction;")),
            }
        }
        lines.push(String::from("matrix"));
        for language in self.dataset.languages() {
            lines.push(format!("{} {}", nexus_token(language), matrix.row(language)));
        }
        lines.push(String::from(";"));
        lines.push(String::from("end;"));
        lines
    }
    fn charstatelabels(&self, matrix: &CharacterMatrix<'d, D>) -> Vec<String> {
        let columns = matrix.columns();
        if columns.is_empty() {
            return Vec::new();
        }
        let mut lines = vec![String::from("charstatelabels")];
        let last = columns.len();
        for (i, column) in columns.iter().enumerate() {
            let label = match column {
                Column::Marker { meaning: Some(meaning) } => format!("{meaning}_0ascertainment"),
                Column::Marker { meaning: None } => format!("{}_0ascertainment", self.conventions.all_meanings),
                Column::State { meaning, state } => format!("{meaning}_{state}"),
            };
            let terminator = if i + 1 == last { ';' } else { ',' };
            lines.push(format!("{} {}{}", i + 1, nexus_token(&label), terminator));
        }
        lines
    }
    fn charset_rows(&self, matrix: &CharacterMatrix<'d, D>) -> Vec<String> {
        let (start_fill, end_fill) = if self.options.charsets { ("", "") } else { ("[ ", " ]") };
        matrix
            .charsets()
            .iter()
            .map(|c| format!("{start_fill}charset {} = {};{end_fill}", nexus_token(&c.meaning), c.range()))
            .collect()
    }
    fn assumptions_block(&self, matrix: &CharacterMatrix<'d, D>) -> Vec<String> {
        let mut lines = vec![String::from("begin assumptions;")];
        lines.extend(self.charset_rows(matrix));
        lines.push(String::from("end;"));
        lines
    }
    fn mrbayes_block(&self, matrix: &CharacterMatrix<'d, D>) -> Vec<String> {
        let mut lines = vec![String::from("begin mrbayes;")];
        lines.extend(self.charset_rows(matrix));
        // "noabsencesites" ascertainment bias correction
        lines.push(String::from("lset applyto=(all) coding=noabsencesites;"));
        lines.push(String::from("end;"));
        lines
    }

    // ------------- CLDF -------------
    fn export_cldf(&self) -> Vec<String> {
        let mut lines = vec![String::from(CLDF_HEADER)];
        for observation in self.dataset.observations() {
            lines.push(format!(
                "{},{},{}",
                csv_field(observation.language),
                csv_field(observation.meaning),
                csv_field(observation.code)
            ));
        }
        lines
    }

    // ------------- Harvest -------------
    // Only the first code of a cell is kept, polymorphic cells lose data.
    fn export_harvest(&self) -> Vec<String> {
        let meanings = self.dataset.meanings();
        let mut header = vec![Cow::Borrowed("language")];
        header.extend(meanings.iter().map(|m| csv_field(m)));
        let mut lines = vec![header.join(",")];
        for language in self.dataset.languages() {
            let mut row = vec![csv_field(language)];
            for meaning in meanings {
                let codes = self.dataset.character_alignment(language, meaning);
                let first = codes.first().unwrap_or(&self.conventions.absent);
                row.push(csv_field(first));
            }
            lines.push(row.join(","));
        }
        lines
    }
}

/// Quotes a NEXUS label unless it is a plain token.
pub fn nexus_token(label: &str) -> Cow<'_, str> {
    if PLAIN_TOKEN.is_match(label) {
        Cow::Borrowed(label)
    } else {
        Cow::Owned(format!("'{}'", label.replace('\'', "''")))
    }
}

/// Quotes a CSV field when it holds a separator, a quote or a line break.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
