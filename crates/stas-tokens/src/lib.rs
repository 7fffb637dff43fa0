#![deny(missing_docs)]
//! STAS covenant token engine.
//!
//! Builds, signs and validates the transactions of the STAS token lifecycle
//! on BSV: contract commitment, issuance, transfer, split, merge,
//! merge-split, redemption, redeem-split and swap. Every operation is a pure
//! function from a request to a complete signed transaction; nothing is
//! broadcast or cached here.

pub mod config;
pub mod error;
pub mod factory;
pub mod network;
pub mod schema;
pub mod script;
pub mod signer;
pub mod types;
pub mod util;
pub mod validate;

pub use config::EngineConfig;
pub use error::TokenError;
pub use factory::{
    build_contract_tx, build_issue_tx, build_merge_split_tx, build_merge_tx,
    build_redeem_split_tx, build_redeem_tx, build_split_tx, build_swap_tx, build_transfer_tx,
    ContractRequest, IssueRequest, MergeRequest, MergeSplitRequest, RedeemRequest,
    RedeemSplitRequest, SplitRequest, SwapRequest, TransferRequest,
};
pub use network::{Broadcaster, ChainSource, NetworkError};
pub use schema::TokenSchema;
pub use script::{ParsedTokenScript, TokenAttributes};
pub use signer::{sign_with_key, CallbackSigner, InputSigner, KeySigner, SigningRequest};
pub use types::{Destination, IssueDestination, SourcedUtxo, TokenOperation, Utxo};
pub use util::{bitcoin_to_satoshis, satoshis_to_tokens};
