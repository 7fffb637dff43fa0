//! ECDSA signature with DER serialization.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, VerifyingKey};

use crate::PrimitivesError;

/// A low-S normalized ECDSA signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: ecdsa::Signature,
}

impl Signature {
    pub(crate) fn from_k256(sig: ecdsa::Signature) -> Self {
        Signature {
            inner: sig.normalize_s().unwrap_or(sig),
        }
    }

    /// Parse a strict DER-encoded signature.
    ///
    /// High-S values are normalized on the way in.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let sig = ecdsa::Signature::from_der(bytes)?;
        Ok(Self::from_k256(sig))
    }

    /// Serialize as DER: `0x30 <len> 0x02 <r> 0x02 <s>`.
    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }

    pub(crate) fn verify(&self, hash: &[u8; 32], key: &VerifyingKey) -> bool {
        key.verify_prehash(hash, &self.inner).is_ok()
    }
}
