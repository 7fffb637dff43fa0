//! Signature coordination.
//!
//! Inputs are signed through the [`InputSigner`] capability so that token
//! owners and fee funders can be different parties, and either can keep its
//! key outside the process. [`KeySigner`] signs with a held key;
//! [`CallbackSigner`] hands the draft transaction to a caller-supplied
//! function and uses whatever it returns.
//!
//! Every input is signed over the BIP-143 FORKID preimage with
//! `SIGHASH_ALL | SIGHASH_FORKID`. Owner inputs are signed first and the
//! funding input last.

use tracing::debug;

use stas_primitives::ec::{PrivateKey, PublicKey};
use stas_script::Script;
use stas_transaction::sighash::{calc_preimage, signature_hash, SIGHASH_ALL_FORKID};
use stas_transaction::Transaction;

use crate::error::TokenError;
use crate::factory::draft::{covenant_hint, Draft, InputPlan, SignerRole, UnlockKind};
use crate::script::unlocking::{build_unlocking_script, UnlockingHint};

/// Everything needed to sign one input.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// The transaction being signed, outputs final.
    pub tx: &'a Transaction,
    /// Index of the input to sign.
    pub input_index: usize,
    /// Locking script of the output being spent.
    pub script_code: &'a Script,
    /// Value of the output being spent.
    pub satoshis: u64,
    /// Sighash flags.
    pub sighash_flag: u32,
}

impl SigningRequest<'_> {
    /// The signature preimage of the input.
    pub fn preimage(&self) -> Result<Vec<u8>, TokenError> {
        Ok(calc_preimage(
            self.tx,
            self.input_index,
            self.script_code.to_bytes(),
            self.sighash_flag,
            self.satoshis,
        )?)
    }

    /// The 32-byte digest to sign.
    pub fn sighash(&self) -> Result<[u8; 32], TokenError> {
        Ok(signature_hash(
            self.tx,
            self.input_index,
            self.script_code.to_bytes(),
            self.sighash_flag,
            self.satoshis,
        )?)
    }
}

/// A party able to sign transaction inputs.
pub trait InputSigner {
    /// The public key whose hash the signed inputs are locked to.
    fn public_key(&self) -> PublicKey;

    /// Sign one input, returning the DER signature with the sighash byte
    /// appended.
    fn sign_input(&self, request: &SigningRequest<'_>) -> Result<Vec<u8>, TokenError>;
}

/// Signs with a private key held in memory.
#[derive(Clone)]
pub struct KeySigner {
    private_key: PrivateKey,
}

impl KeySigner {
    /// Wrap a private key.
    pub fn new(private_key: PrivateKey) -> Self {
        KeySigner { private_key }
    }
}

impl InputSigner for KeySigner {
    fn public_key(&self) -> PublicKey {
        self.private_key.pub_key()
    }

    fn sign_input(&self, request: &SigningRequest<'_>) -> Result<Vec<u8>, TokenError> {
        let digest = request.sighash()?;
        let signature = self.private_key.sign(&digest)?;
        let mut out = signature.to_der();
        out.push(request.sighash_flag as u8);
        Ok(out)
    }
}

/// Sign an input with a key, the way [`KeySigner`] does.
///
/// Matches the [`CallbackSigner`] function shape, so a callback can sign
/// with a key it fetched from elsewhere.
pub fn sign_with_key(
    private_key: &PrivateKey,
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    satoshis: u64,
) -> Result<Vec<u8>, TokenError> {
    KeySigner::new(private_key.clone()).sign_input(&SigningRequest {
        tx,
        input_index,
        script_code,
        satoshis,
        sighash_flag: SIGHASH_ALL_FORKID,
    })
}

/// Delegates signing to a function `(tx, input_index, script_code, satoshis)`.
///
/// The returned bytes are used verbatim; only an empty result is refused.
pub struct CallbackSigner<F> {
    public_key: PublicKey,
    callback: F,
}

impl<F> CallbackSigner<F>
where
    F: Fn(&Transaction, usize, &Script, u64) -> Result<Vec<u8>, TokenError>,
{
    /// Create a signer for inputs locked to `public_key`.
    pub fn new(public_key: PublicKey, callback: F) -> Self {
        CallbackSigner {
            public_key,
            callback,
        }
    }
}

impl<F> InputSigner for CallbackSigner<F>
where
    F: Fn(&Transaction, usize, &Script, u64) -> Result<Vec<u8>, TokenError>,
{
    fn public_key(&self) -> PublicKey {
        self.public_key.clone()
    }

    fn sign_input(&self, request: &SigningRequest<'_>) -> Result<Vec<u8>, TokenError> {
        let signature = (self.callback)(
            request.tx,
            request.input_index,
            request.script_code,
            request.satoshis,
        )?;
        if signature.is_empty() {
            return Err(TokenError::SigningFailed(format!(
                "callback returned no signature for input {}",
                request.input_index
            )));
        }
        Ok(signature)
    }
}

/// Sign a composed draft and return the finished transaction.
///
/// Owner inputs are signed in input order, then the funding input. Each
/// signature commits to every output, so outputs must not change after
/// this point.
pub(crate) fn sign_draft(draft: Draft<'_>) -> Result<Transaction, TokenError> {
    let funding_index = draft.funding_index();
    let mut tx = draft.tx().clone();

    let (owner_inputs, funding_inputs): (Vec<_>, Vec<_>) = draft
        .plans()
        .iter()
        .enumerate()
        .partition(|(_, plan)| matches!(plan.role, SignerRole::Owner(_)));

    for (index, plan) in owner_inputs.into_iter().chain(funding_inputs) {
        let signer = draft.signer_for(plan.role)?;
        sign_input(&mut tx, index, plan, signer, funding_index)?;
    }

    debug!(
        operation = %draft.operation(),
        txid = %tx.tx_id(),
        size = tx.size(),
        "signed token transaction"
    );
    Ok(tx)
}

fn sign_input(
    tx: &mut Transaction,
    index: usize,
    plan: &InputPlan,
    signer: &dyn InputSigner,
    funding_index: Option<usize>,
) -> Result<(), TokenError> {
    let source = tx.inputs[index]
        .source_tx_output()
        .cloned()
        .ok_or_else(|| TokenError::SigningFailed(format!("input {} has no source output", index)))?;

    let request = SigningRequest {
        tx: &*tx,
        input_index: index,
        script_code: &source.locking_script,
        satoshis: source.satoshis,
        sighash_flag: SIGHASH_ALL_FORKID,
    };
    let signature = signer.sign_input(&request)?;
    let hint = match &plan.kind {
        UnlockKind::PayToKeyHash => UnlockingHint::PayToKeyHash,
        UnlockKind::Covenant { merge } => UnlockingHint::Covenant(covenant_hint(
            &*tx,
            funding_index,
            merge.as_ref(),
            request.preimage()?,
        )?),
    };
    let unlocking_script = build_unlocking_script(&signature, &signer.public_key(), &hint)?;

    debug!(input = index, role = ?plan.role, "signed input");
    tx.inputs[index].unlocking_script = Some(unlocking_script);
    Ok(())
}
