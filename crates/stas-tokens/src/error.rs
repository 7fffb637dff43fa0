//! Token error types.

use stas_primitives::PrimitivesError;
use stas_script::ScriptError;
use stas_transaction::TransactionError;

use crate::network::NetworkError;

/// Errors that can occur while composing, validating or signing a token
/// transaction.
///
/// Every failure aborts the whole operation; no partial transaction is
/// ever returned.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// A script is not a recognized token, payout or contract script.
    #[error("malformed script: {0}")]
    MalformedScript(String),

    /// Token inputs or outputs disagree on the issuer.
    #[error("inconsistent issuer: {0}")]
    InconsistentIssuer(String),

    /// Token value out does not reconcile with token value in.
    #[error("conservation violation: expected {expected}, actual {actual}")]
    ConservationViolation {
        /// Token satoshis the rule requires.
        expected: u64,
        /// Token satoshis the transaction carries.
        actual: u64,
    },

    /// An output is below the dust limit.
    #[error("output {vout} carries {satoshis} satoshis, below dust limit {limit}")]
    DustOutput {
        /// Index of the offending output.
        vout: usize,
        /// Its value.
        satoshis: u64,
        /// The configured dust limit.
        limit: u64,
    },

    /// The funding input cannot pay the fee for the estimated size.
    #[error("insufficient fee: required {required}, available {available}")]
    InsufficientFee {
        /// Fee the estimated size requires at the configured rate.
        required: u64,
        /// Satoshis left over for the fee.
        available: u64,
    },

    /// An input has no signer able to sign it.
    #[error("missing signer: {0}")]
    MissingSigner(String),

    /// A requested amount is zero, misaligned with the token rate or out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The token is not splittable.
    #[error("token is not splittable")]
    NotSplittable,

    /// Token holders do not satisfy the operation's ownership rule.
    #[error("holder mismatch: {0}")]
    HolderMismatch(String),

    /// The destination list is invalid.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// The token schema is invalid.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A signer failed to produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Transaction error.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Script error.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Collaborator error.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
