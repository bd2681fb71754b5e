//! Error types for the bridge.

use thiserror::Error;

/// Error type covering translation, registration, and stub generation.
#[derive(Error, Debug)]
pub enum Error {
    /// A host value could not be marshaled into the intermediate form.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The intermediate form could not be coerced into the requested output.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// An untyped root was passed to the registry.
    #[error("registration error: {0}")]
    Registration(String),

    /// A stub was requested for a module never discovered by the extractor.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
