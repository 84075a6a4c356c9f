//! Capability interfaces for the ciphertext backend.
//!
//! The engine never holds plaintexts. Everything it knows about an encrypted value is a
//! [`Handle`], and all arithmetic is delegated to a [`Coprocessor`]. Values that originate outside
//! the engine only become usable after a [`ProofVerifier`] accepts them.

use commonware_cryptography::ed25519::PublicKey;
use thiserror::Error;
use veilhilo_types::fhe::{CipherType, ExternalInput, Handle};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("expected {expected:?} ciphertext, found {found:?}")]
    TypeMismatch {
        expected: CipherType,
        found: CipherType,
    },
    #[error("handle is not known to the coprocessor")]
    UnknownHandle,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("malformed ciphertext")]
    Malformed,
    #[error("proof does not bind ciphertext to submitter")]
    InvalidProof,
}

/// Homomorphic arithmetic over opaque handles.
///
/// Arithmetic is modulo 2^32; `sub` wraps when the subtrahend is larger. Callers that need
/// non-negative results must enforce that by other means.
pub trait Coprocessor: Send + Sync {
    fn encrypt(&self, value: u32) -> Handle;
    fn encrypt_bool(&self, value: bool) -> Handle;

    fn add(&self, a: &Handle, b: &Handle) -> Result<Handle, CipherError>;
    fn sub(&self, a: &Handle, b: &Handle) -> Result<Handle, CipherError>;
    fn mul(&self, a: &Handle, b: &Handle) -> Result<Handle, CipherError>;
}

/// Validates ciphertexts submitted from outside the engine.
pub trait ProofVerifier: Send + Sync {
    /// Returns a handle usable in arithmetic if `input.proof` binds `input.ciphertext` to
    /// `submitter`.
    fn verify(&self, submitter: &PublicKey, input: &ExternalInput) -> Result<Handle, VerifyError>;
}

/// Fails unless both operands are 32-bit integers.
pub fn require_uint32(a: &Handle, b: &Handle) -> Result<(), CipherError> {
    for handle in [a, b] {
        if handle.ty != CipherType::Uint32 {
            return Err(CipherError::TypeMismatch {
                expected: CipherType::Uint32,
                found: handle.ty,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_cryptography::{sha256::Sha256, Hasher};

    #[test]
    fn bool_operands_are_rejected() {
        let int = Handle::new(CipherType::Uint32, Sha256::hash(b"a"));
        let flag = Handle::new(CipherType::Bool, Sha256::hash(b"b"));
        assert_eq!(require_uint32(&int, &int), Ok(()));
        assert_eq!(
            require_uint32(&int, &flag),
            Err(CipherError::TypeMismatch {
                expected: CipherType::Uint32,
                found: CipherType::Bool
            })
        );
    }
}
