pub mod config;
pub mod export;
pub mod search;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Core library error: {0}")]
    Core(#[from] serpx_core::SerpxError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Process exit code: 2 for mistakes in what the user passed, 1 otherwise.
pub fn exit_code(err: &CommandError) -> i32 {
    match err {
        CommandError::InvalidInput(_) | CommandError::InvalidConfig(_) => 2,
        CommandError::Core(e) if e.is_input_error() => 2,
        _ => 1,
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| CommandError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| CommandError::Clipboard(e.to_string()))?;
    Ok(())
}
