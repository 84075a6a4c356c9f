//! Read-only views over committed or pending state.
//!
//! Confidential values are returned as handles; reading the plaintext is a separate, permissioned
//! request to the coprocessor.

use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use veilhilo_types::{
    execution::{Key, Value},
    fhe::Handle,
    game::{GameRecord, GameView},
    ledger::{ConfidentialAccount, LedgerVariant, PlainAccount},
};

use crate::state::State;

pub async fn confidential_account<S: State>(
    state: &S,
    player: &PublicKey,
) -> Result<Option<ConfidentialAccount>> {
    Ok(
        match state.get(&Key::ConfidentialAccount(player.clone())).await? {
            Some(Value::ConfidentialAccount(account)) => Some(account),
            _ => None,
        },
    )
}

pub async fn plain_account<S: State>(state: &S, player: &PublicKey) -> Result<PlainAccount> {
    Ok(match state.get(&Key::PlainAccount(player.clone())).await? {
        Some(Value::PlainAccount(account)) => account,
        _ => PlainAccount::default(),
    })
}

pub async fn encrypted_balance<S: State>(state: &S, player: &PublicKey) -> Result<Option<Handle>> {
    Ok(confidential_account(state, player)
        .await?
        .map(|account| account.balance))
}

pub async fn encrypted_score<S: State>(state: &S, player: &PublicKey) -> Result<Option<Handle>> {
    Ok(confidential_account(state, player)
        .await?
        .map(|account| account.score))
}

pub async fn encrypted_flag<S: State>(state: &S, player: &PublicKey) -> Result<Option<Handle>> {
    Ok(confidential_account(state, player)
        .await?
        .map(|account| account.flag))
}

pub async fn has_deposited<S: State>(state: &S, player: &PublicKey) -> Result<bool> {
    Ok(confidential_account(state, player)
        .await?
        .is_some_and(|account| account.has_deposited))
}

pub async fn last_activity<S: State>(state: &S, player: &PublicKey) -> Result<u64> {
    Ok(confidential_account(state, player)
        .await?
        .map_or(0, |account| account.last_activity))
}

/// True while `now - last_activity < window`. Accounts that never acted are inactive.
pub async fn is_active<S: State>(
    state: &S,
    player: &PublicKey,
    now: u64,
    window: u64,
) -> Result<bool> {
    Ok(match confidential_account(state, player).await? {
        Some(account) if account.last_activity > 0 => {
            now.saturating_sub(account.last_activity) < window
        }
        _ => false,
    })
}

pub async fn plain_balance<S: State>(state: &S, player: &PublicKey) -> Result<u64> {
    Ok(plain_account(state, player).await?.balance)
}

async fn games_started<S: State>(
    state: &S,
    variant: LedgerVariant,
    player: &PublicKey,
) -> Result<u64> {
    Ok(match variant {
        LedgerVariant::Confidential => {
            confidential_account(state, player)
                .await?
                .map_or(0, |account| account.games_started)
        }
        LedgerVariant::Plain => plain_account(state, player).await?.games_started,
    })
}

/// A specific game from the player's history.
pub async fn game_at<S: State>(
    state: &S,
    variant: LedgerVariant,
    player: &PublicKey,
    id: u64,
) -> Result<Option<GameRecord>> {
    let key = Key::Game {
        variant,
        player: player.clone(),
        id,
    };
    Ok(match state.get(&key).await? {
        Some(Value::Game(record)) => Some(record),
        _ => None,
    })
}

/// The most recently started game, whatever its status.
pub async fn latest_game<S: State>(
    state: &S,
    variant: LedgerVariant,
    player: &PublicKey,
) -> Result<Option<GameRecord>> {
    match games_started(state, variant, player).await?.checked_sub(1) {
        Some(id) => game_at(state, variant, player, id).await,
        None => Ok(None),
    }
}

pub async fn game<S: State>(
    state: &S,
    variant: LedgerVariant,
    player: &PublicKey,
) -> Result<Option<GameView>> {
    Ok(latest_game(state, variant, player)
        .await?
        .map(|record| record.view()))
}
