//! uralex-export command line tool.
//!
//! Exports phylogenetic formats from the UraLex basic vocabulary dataset.
//! Exit code 2 means invalid options, 1 means the data could not be read or
//! the output could not be written.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dialoguer::Confirm;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use uralex_export::conventions::Conventions;
use uralex_export::dataset::{Axis, DatasetView, Filters};
use uralex_export::error::{ExportError, Result};
use uralex_export::exporter::{Dialect, ExportOptions, Exporter, Format};
use uralex_export::output;
use uralex_export::reader::SourceData;
use uralex_export::settings::Settings;
use uralex_export::source::{self, SourceTables};

/// Export phylogenetic formats from UraLex spreadsheet data.
#[derive(Parser, Debug)]
#[command(name = "uralex-export")]
#[command(version, about)]
struct Cli {
    /// Output to file OUTFILE. If not set, output goes to STDOUT
    #[arg(short = 'o', long = "output", value_name = "OUTFILE")]
    output: Option<PathBuf>,

    /// Comma-separated list of taxa to exclude
    #[arg(short = 'x', long = "exclude-taxa", default_value = "")]
    exclude_taxa: String,

    /// Meaning list to use [default: all]
    #[arg(short = 'l', long = "meaning-list")]
    meaning_list: Option<String>,

    /// Export format: nexus, cldf, harvest
    #[arg(short = 'f', long = "format", default_value = "nexus")]
    format: String,

    /// NEXUS dialect: mrbayes, beast, splitstree [default: beast]
    #[arg(short = 'd', long = "dialect")]
    dialect: Option<String>,

    /// Export without separate character sets for each meaning
    #[arg(short = '1', long = "no-charsets")]
    no_charsets: bool,

    /// Export correlate characters instead of cognate (root-meaning form) characters
    #[arg(short = 'c', long = "correlate")]
    correlate: bool,

    /// Remove character states that occur in only one row of a meaning
    #[arg(short = 's', long = "remove-singletons")]
    remove_singletons: bool,

    /// Label every character state (NEXUS charstatelabels, forces the beast dialect)
    #[arg(short = 'L', long = "labels")]
    labels: bool,

    /// Look for data in an uncompressed 'raw' folder rather than a released zip file
    #[arg(short = 'r', long = "raw-folder")]
    raw_folder: bool,

    /// Answer yes to download and overwrite questions
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Print the available meaning lists and exit
    #[arg(long = "list-meaning-lists")]
    list_meaning_lists: bool,

    /// Print the languages of the dataset and exit
    #[arg(long = "list-languages")]
    list_languages: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            report(&e);
            e.exit_code()
        }
    };
    std::process::exit(exit_code);
}

fn report(error: &ExportError) {
    eprintln!("{error}");
    let valid = error.valid_options();
    if !valid.is_empty() {
        eprintln!("Must be one of following:");
        for option in valid {
            eprintln!("{option}");
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load()?;

    // options are validated before any data is read
    let format: Format = cli.format.parse()?;
    let dialect = match (&cli.dialect, format) {
        (Some(d), _) => Some(d.parse::<Dialect>()?),
        (None, Format::Nexus) => Some(settings.dialect.parse::<Dialect>()?),
        (None, _) => None,
    };
    let options = ExportOptions::new(format, dialect)?
        .with_charsets(!cli.no_charsets)
        .with_labels(cli.labels);
    let axis = if cli.correlate { Axis::Correlate } else { Axis::Cognate };

    let tables = match acquire(cli, &settings)? {
        Some(tables) => tables,
        None => {
            println!("Aborting.");
            return Ok(());
        }
    };
    let conventions = Arc::new(Conventions::default());
    let source = SourceData::read(&tables, &conventions)?;

    if cli.list_languages {
        for (id, name) in source.languages.entries() {
            println!("{id}\t{name}");
        }
        return Ok(());
    }

    let mut dataset = source.into_dataset(Arc::clone(&conventions), axis)?;
    if cli.list_meaning_lists {
        for name in dataset.meaning_lists() {
            println!("{name}");
        }
        return Ok(());
    }

    let filters = Filters {
        exclude_languages: cli
            .exclude_taxa
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
        meaning_list: cli.meaning_list.clone().unwrap_or_else(|| settings.meaning_list.clone()),
        singletons: cli.remove_singletons.then_some(axis),
    };
    dataset.apply_filters(&filters)?;
    if dataset.languages().is_empty() {
        warn!("no taxa left after filtering");
    }

    let lines = Exporter::new(&dataset, &conventions, options).export();
    match &cli.output {
        Some(path) => {
            if path.exists() && !cli.yes && !confirm(&format!("File {} already exists. Overwrite?", path.display()))? {
                println!("File not written.");
                return Ok(());
            }
            output::write_file(path, &lines)
        }
        None => output::write_stdout(&lines),
    }
}

/// Reads the source tables. `None` when the user declined a download.
fn acquire(cli: &Cli, settings: &Settings) -> Result<Option<SourceTables>> {
    if cli.raw_folder {
        return source::read_raw_folder(&settings.raw_folder).map(Some);
    }
    let release = settings.release()?;
    let archive = release.archive_path(&settings.archive_folder);
    if !archive.is_file() {
        info!(archive = %archive.display(), "release archive not found");
        if !cli.yes && !confirm(&format!("Dataset not found. Download {}?", release.zipfile))? {
            return Ok(None);
        }
        source::download_release(release, &settings.archive_folder)?;
    }
    source::read_release_archive(release, &settings.archive_folder).map(Some)
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ExportError::Io(std::io::Error::other(e)))
}
