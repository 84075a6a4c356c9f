//! Card draws for the higher/lower game.
//!
//! Draws are a public function of the block entropy and the caller, so anyone who sees the
//! entropy before the transaction is ordered can predict the card. A verifiable or delayed-reveal
//! randomness source would be needed to remove that.
//!
//! Ranks are `1 + (uint256_be(SHA-256(inputs)) mod 13)`:
//! - first card: `now || seed || player || sequence`
//! - later cards: `now || seed || player || secret || sequence`
//!
//! where `secret = SHA-256(now || player || first card)` is fixed when the game starts.

use commonware_cryptography::{
    ed25519::PublicKey,
    sha256::{Digest, Sha256},
    Hasher,
};
use veilhilo_types::{
    constants::{CARD_RANKS, MIN_CARD},
    execution::Entropy,
};

/// Reduces a digest, read as a big-endian 256-bit integer, to a rank in `1..=13`.
fn card_from_digest(digest: &Digest) -> u8 {
    let remainder = digest
        .as_ref()
        .iter()
        .fold(0u32, |r, byte| (r * 256 + *byte as u32) % CARD_RANKS as u32);
    MIN_CARD + remainder as u8
}

pub fn first_card(entropy: &Entropy, player: &PublicKey) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(&entropy.timestamp.to_be_bytes());
    hasher.update(entropy.seed.as_ref());
    hasher.update(player.as_ref());
    hasher.update(&entropy.sequence.to_be_bytes());
    card_from_digest(&hasher.finalize())
}

pub fn commitment(timestamp: u64, player: &PublicKey, card: u8) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(&timestamp.to_be_bytes());
    hasher.update(player.as_ref());
    hasher.update(&[card]);
    hasher.finalize()
}

pub fn next_card(entropy: &Entropy, player: &PublicKey, secret: &Digest) -> u8 {
    let mut hasher = Sha256::new();
    hasher.update(&entropy.timestamp.to_be_bytes());
    hasher.update(entropy.seed.as_ref());
    hasher.update(player.as_ref());
    hasher.update(secret.as_ref());
    hasher.update(&entropy.sequence.to_be_bytes());
    card_from_digest(&hasher.finalize())
}

/// Equal ranks lose in both directions.
pub fn is_correct(higher: bool, current: u8, drawn: u8) -> bool {
    if higher {
        drawn > current
    } else {
        drawn < current
    }
}
