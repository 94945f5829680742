use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {message}")]
    Configuration { message: String, valid: Vec<String> },
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Malformed table {table}: {message}")]
    MalformedTable { table: String, message: String },
    #[error("Archive error: {0}")]
    Archive(String),
    #[error("Download error: {0}")]
    Download(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    pub fn configuration(message: impl Into<String>, valid: Vec<String>) -> Self {
        Self::Configuration { message: message.into(), valid }
    }
    pub fn malformed(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedTable { table: table.into(), message: message.into() }
    }
    /// The options the user could have picked instead, empty for non-configuration errors.
    pub fn valid_options(&self) -> &[String] {
        match self {
            Self::Configuration { valid, .. } => valid,
            _ => &[],
        }
    }
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 2,
            _ => 1,
        }
    }
}

// Helper conversions
impl From<config::ConfigError> for ExportError {
    fn from(e: config::ConfigError) -> Self { Self::configuration(e.to_string(), Vec::new()) }
}
impl From<zip::result::ZipError> for ExportError {
    fn from(e: zip::result::ZipError) -> Self { Self::Archive(e.to_string()) }
}
impl From<reqwest::Error> for ExportError {
    fn from(e: reqwest::Error) -> Self { Self::Download(e.to_string()) }
}
impl From<tempfile::PersistError> for ExportError {
    fn from(e: tempfile::PersistError) -> Self { Self::Io(e.error) }
}
