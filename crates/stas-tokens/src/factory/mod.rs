//! Transaction factories for STAS token operations.
//!
//! Each factory is a pure function from a request and an [`EngineConfig`]
//! to a complete, signed `Transaction`. Signing goes through the request's
//! [`InputSigner`]s, so passing [`CallbackSigner`]s instead of
//! [`KeySigner`]s gives the externally signed variant of every operation.
//!
//! [`EngineConfig`]: crate::config::EngineConfig
//! [`InputSigner`]: crate::signer::InputSigner
//! [`CallbackSigner`]: crate::signer::CallbackSigner
//! [`KeySigner`]: crate::signer::KeySigner

pub mod contract;
pub(crate) mod draft;
pub mod stas;

pub use contract::{build_contract_tx, ContractRequest};
pub use stas::{
    build_issue_tx, build_merge_split_tx, build_merge_tx, build_redeem_split_tx, build_redeem_tx,
    build_split_tx, build_swap_tx, build_transfer_tx, IssueRequest, MergeRequest,
    MergeSplitRequest, RedeemRequest, RedeemSplitRequest, SplitRequest, SwapRequest,
    TransferRequest,
};
