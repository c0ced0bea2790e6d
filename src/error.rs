use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The token table could not be produced by its provider.
    #[error("Token counting failed: {0}")]
    TokenTable(String),

    /// The packer ran but reported a failure.
    #[error("Packing failed: {0}")]
    Pack(String),

    /// Packing was requested with nothing selected.
    #[error("No files selected")]
    EmptySelection,

    /// Configuration could not be applied.
    #[error("Config error: {0}")]
    Config(String),
}
