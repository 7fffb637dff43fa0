//! Script template engine for STAS token scripts.

pub mod builder;
pub mod reader;
pub mod template;
pub mod unlocking;

pub use builder::{build_contract_script, build_locking_script, continue_locking_script, TokenAttributes};
pub use reader::{is_token_script, parse_contract_script, parse_locking_script, parse_token_script, ParsedTokenScript};
pub use unlocking::{build_unlocking_script, CovenantHint, FundingPointer, MergeSegment, OutputHint, UnlockingHint};
