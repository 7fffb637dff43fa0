/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. input index out of range).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// Binary or hex (de)serialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// An underlying script error.
    #[error("script error: {0}")]
    Script(#[from] stas_script::ScriptError),
    /// An underlying primitives error.
    #[error("primitives error: {0}")]
    Primitives(#[from] stas_primitives::PrimitivesError),
}
