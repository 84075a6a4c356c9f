//! Access-control ledger: which grantees may request decryption of which handles.
//!
//! Grants only ever accumulate. A handle that has been replaced in its slot keeps the grants it
//! had.

use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use veilhilo_types::{
    execution::{Key, Value},
    fhe::{Grantee, Handle},
};

use crate::state::State;

/// Records a decryption right. Returns `false` if it was already present.
pub async fn grant<S: State>(state: &mut S, handle: Handle, grantee: Grantee) -> Result<bool> {
    let key = Key::Permission { handle, grantee };
    if state.get(&key).await?.is_some() {
        return Ok(false);
    }
    state.insert(key, Value::Permission).await?;
    Ok(true)
}

pub async fn is_granted<S: State>(state: &S, handle: &Handle, grantee: &Grantee) -> Result<bool> {
    let key = Key::Permission {
        handle: *handle,
        grantee: grantee.clone(),
    };
    Ok(matches!(state.get(&key).await?, Some(Value::Permission)))
}

/// Grants the engine and `owner` on every handle.
pub async fn grant_owned<S: State>(
    state: &mut S,
    handles: impl IntoIterator<Item = Handle>,
    owner: &PublicKey,
) -> Result<()> {
    for handle in handles {
        grant(state, handle, Grantee::Engine).await?;
        grant(state, handle, Grantee::Principal(owner.clone())).await?;
    }
    Ok(())
}
