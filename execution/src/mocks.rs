//! Test backend and fixtures.
//!
//! [`MockFhe`] stands in for both the coprocessor and the proof verifier. It keeps every
//! plaintext in a table keyed by handle and exposes a decryption oracle that honours the
//! access-control ledger.
//!
//! Mock ciphertexts are `[type:u8] [value BE]` and a valid proof is `SHA-256(submitter || ciphertext)`.

use crate::{
    acl, draw,
    fhe::{require_uint32, CipherError, Coprocessor, ProofVerifier, VerifyError},
    query,
    state::State,
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::{Digest, Sha256},
    Hasher, Signer,
};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};
use thiserror::Error;
use veilhilo_types::{
    execution::Entropy,
    fhe::{CipherType, ExternalInput, Grantee, Handle},
    ledger::LedgerVariant,
};

/// Creates an account keypair for Ed25519 signatures used by users
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let private = PrivateKey::from_seed(seed);
    let public = private.public_key();
    (private, public)
}

/// Creates block entropy from a small label.
pub fn create_entropy(timestamp: u64, label: u64, sequence: u64) -> Entropy {
    Entropy::new(timestamp, Sha256::hash(&label.to_be_bytes()), sequence)
}

/// Finds block entropy under which the next guess by `player` wins, and the direction to guess.
///
/// The guess must be the first transaction of the block.
pub async fn winning_guess<S: State>(
    state: &S,
    variant: LedgerVariant,
    player: &PublicKey,
    timestamp: u64,
    sequence: u64,
) -> Option<(Entropy, bool)> {
    let record = query::latest_game(state, variant, player).await.ok()??;
    if !record.is_active() {
        return None;
    }
    (0..1_000u64).find_map(|label| {
        let block = create_entropy(timestamp, label, sequence);
        let drawn = draw::next_card(&block.for_transaction(0), player, &record.secret);
        (drawn != record.current_card).then_some((block, drawn > record.current_card))
    })
}

/// Block entropy and a direction under which the next guess by `player` loses.
pub async fn losing_guess<S: State>(
    state: &S,
    variant: LedgerVariant,
    player: &PublicKey,
    timestamp: u64,
    sequence: u64,
) -> Option<(Entropy, bool)> {
    let record = query::latest_game(state, variant, player).await.ok()??;
    let block = create_entropy(timestamp, 0, sequence);
    let drawn = draw::next_card(&block.for_transaction(0), player, &record.secret);
    Some((block, drawn <= record.current_card))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plaintext {
    Uint32(u32),
    Bool(bool),
}

impl Plaintext {
    fn ty(&self) -> CipherType {
        match self {
            Self::Uint32(_) => CipherType::Uint32,
            Self::Bool(_) => CipherType::Bool,
        }
    }

    fn to_ciphertext(self) -> Vec<u8> {
        match self {
            Self::Uint32(value) => {
                let mut bytes = vec![CipherType::Uint32 as u8];
                bytes.extend_from_slice(&value.to_be_bytes());
                bytes
            }
            Self::Bool(value) => vec![CipherType::Bool as u8, value as u8],
        }
    }

    fn from_ciphertext(bytes: &[u8]) -> Option<Self> {
        let (ty, body) = bytes.split_first()?;
        match CipherType::try_from(*ty).ok()? {
            CipherType::Uint32 => Some(Self::Uint32(u32::from_be_bytes(body.try_into().ok()?))),
            CipherType::Bool => match body {
                [0] => Some(Self::Bool(false)),
                [1] => Some(Self::Bool(true)),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("requester is not granted on this handle")]
    NotAllowed,
    #[error("unknown handle")]
    Unknown,
    #[error("state error: {0}")]
    State(#[from] anyhow::Error),
}

#[derive(Default)]
pub struct MockFhe {
    plaintexts: Mutex<BTreeMap<Handle, Plaintext>>,
    counter: AtomicU64,
}

impl MockFhe {
    fn table(&self) -> MutexGuard<'_, BTreeMap<Handle, Plaintext>> {
        self.plaintexts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, op: &[u8], value: Plaintext) -> Handle {
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);

        let mut hasher = Sha256::new();
        hasher.update(op);
        hasher.update(&counter.to_be_bytes());
        let handle = Handle::new(value.ty(), hasher.finalize());
        self.table().insert(handle, value);
        handle
    }

    fn operands(&self, a: &Handle, b: &Handle) -> Result<(u32, u32), CipherError> {
        require_uint32(a, b)?;
        let plaintexts = self.table();
        match (plaintexts.get(a), plaintexts.get(b)) {
            (Some(Plaintext::Uint32(a)), Some(Plaintext::Uint32(b))) => Ok((*a, *b)),
            _ => Err(CipherError::UnknownHandle),
        }
    }

    fn proof(submitter: &PublicKey, ciphertext: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(submitter.as_ref());
        hasher.update(ciphertext);
        hasher.finalize()
    }

    fn input(submitter: &PublicKey, value: Plaintext) -> ExternalInput {
        let ciphertext = value.to_ciphertext();
        let proof = Self::proof(submitter, &ciphertext).as_ref().to_vec();
        ExternalInput { ciphertext, proof }
    }

    /// Client-side encryption of an integer bound to `submitter`.
    pub fn encrypt_input(&self, submitter: &PublicKey, value: u32) -> ExternalInput {
        Self::input(submitter, Plaintext::Uint32(value))
    }

    pub fn encrypt_bool_input(&self, submitter: &PublicKey, value: bool) -> ExternalInput {
        Self::input(submitter, Plaintext::Bool(value))
    }

    /// Plaintext behind an integer handle, bypassing access control.
    pub fn plaintext(&self, handle: &Handle) -> Option<u32> {
        match self.table().get(handle) {
            Some(Plaintext::Uint32(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn plaintext_bool(&self, handle: &Handle) -> Option<bool> {
        match self.table().get(handle) {
            Some(Plaintext::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Decryption oracle: only grantees recorded in `state` may read a handle.
    pub async fn decrypt<S: State>(
        &self,
        state: &S,
        handle: &Handle,
        requester: &Grantee,
    ) -> Result<Plaintext, DecryptError> {
        if !acl::is_granted(state, handle, requester).await? {
            return Err(DecryptError::NotAllowed);
        }
        self.table()
            .get(handle)
            .copied()
            .ok_or(DecryptError::Unknown)
    }
}

impl Coprocessor for MockFhe {
    fn encrypt(&self, value: u32) -> Handle {
        self.store(b"encrypt", Plaintext::Uint32(value))
    }

    fn encrypt_bool(&self, value: bool) -> Handle {
        self.store(b"encrypt_bool", Plaintext::Bool(value))
    }

    fn add(&self, a: &Handle, b: &Handle) -> Result<Handle, CipherError> {
        let (a, b) = self.operands(a, b)?;
        Ok(self.store(b"add", Plaintext::Uint32(a.wrapping_add(b))))
    }

    fn sub(&self, a: &Handle, b: &Handle) -> Result<Handle, CipherError> {
        let (a, b) = self.operands(a, b)?;
        Ok(self.store(b"sub", Plaintext::Uint32(a.wrapping_sub(b))))
    }

    fn mul(&self, a: &Handle, b: &Handle) -> Result<Handle, CipherError> {
        let (a, b) = self.operands(a, b)?;
        Ok(self.store(b"mul", Plaintext::Uint32(a.wrapping_mul(b))))
    }
}

impl ProofVerifier for MockFhe {
    fn verify(&self, submitter: &PublicKey, input: &ExternalInput) -> Result<Handle, VerifyError> {
        let value = Plaintext::from_ciphertext(&input.ciphertext).ok_or(VerifyError::Malformed)?;
        if input.proof.as_slice() != Self::proof(submitter, &input.ciphertext).as_ref() {
            return Err(VerifyError::InvalidProof);
        }
        Ok(self.store(b"verify", value))
    }
}
