//! Error types for version planning and workspace propagation.
use thiserror::Error;

/// Main error type for releasaurus-planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    // Version errors
    #[error("Invalid version: {0}")]
    VersionParse(String),

    // Repository access errors
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Missing required file: {0}")]
    MissingRequiredFile(String),

    #[error("Illegal pathing characters in path: {0}")]
    PathTraversal(String),

    // Invariant violations
    #[error("No version known for component: {0}")]
    UnknownComponent(String),

    #[error("Cycle detected in dependency graph at: {0}")]
    DependencyCycle(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // File format errors raised by updaters
    #[error("Failed to update content: {0}")]
    Updater(String),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML edit error: {0}")]
    TomlEditError(#[from] toml_edit::TomlError),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

impl PlannerError {
    /// Create an invalid configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an updater error with context
    pub fn updater(msg: impl Into<String>) -> Self {
        Self::Updater(msg.into())
    }

    /// Create a version parse error for the offending input
    pub fn version(input: impl Into<String>) -> Self {
        Self::VersionParse(input.into())
    }

    /// True when the error reports an absent file rather than a bad one.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }
}

// Wraps generic I/O failures; missing files are mapped by callers so they
// stay distinguishable as FileNotFound.
impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}
