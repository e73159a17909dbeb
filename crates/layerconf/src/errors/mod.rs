use std::error::Error;

/// Base trait for all layerconf errors
pub trait LayerconfError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error was caused by user input (bad file contents, bad
    /// paths) rather than the environment
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the crate
pub type ConfResult<T> = Result<T, ConfError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create config file '{path}': {source}")]
    FileCreate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {message}")]
    Serialize { message: String },

    #[error("Failed to write settings: {source}")]
    Write {
        #[from]
        source: std::io::Error,
    },

    #[error("Unable to find config files '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    #[error("Unable to merge config file '{path}': {message}")]
    Merge { path: String, message: String },

    #[error("Config directory not found at '{path}'")]
    MissingDirectory { path: String },

    #[error("Failed to unmarshal '{key}': {message}")]
    Unmarshal { key: String, message: String },
}

impl LayerconfError for ConfError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfError::FileRead { .. } => "CONFIG_FILE_READ",
            ConfError::Parse { .. } => "CONFIG_PARSE_ERROR",
            ConfError::DirectoryCreate { .. } => "CONFIG_DIRECTORY_CREATE",
            ConfError::FileCreate { .. } => "CONFIG_FILE_CREATE",
            ConfError::Serialize { .. } => "CONFIG_SERIALIZE_ERROR",
            ConfError::Write { .. } => "CONFIG_WRITE_ERROR",
            ConfError::Glob { .. } => "CONFIG_GLOB_ERROR",
            ConfError::Merge { .. } => "CONFIG_MERGE_ERROR",
            ConfError::MissingDirectory { .. } => "CONFIG_MISSING_DIRECTORY",
            ConfError::Unmarshal { .. } => "CONFIG_UNMARSHAL_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConfError::Parse { .. }
                | ConfError::Merge { .. }
                | ConfError::MissingDirectory { .. }
                | ConfError::Unmarshal { .. }
        )
    }
}

impl ConfError {
    /// Whether the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            ConfError::FileRead { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            ConfError::MissingDirectory { .. } => true,
            _ => false,
        }
    }
}
