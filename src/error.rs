use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    #[error("input file can not equal output file: {}", .0.display())]
    SameFile(PathBuf),

    #[error("failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid config file '{}': {source}", .path.display())]
    Config { path: PathBuf, source: toml::de::Error },

    #[error("invalid field name '{0}'")]
    InvalidFieldName(String),

    #[error("invalid field value '{0}': '<' and '>' are not allowed")]
    InvalidFieldValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
