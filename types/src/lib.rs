//! Shared types for veilhilo: transactions, ledger accounts, ciphertext handles and game records.

pub mod codec;
pub mod config;
pub mod constants;
pub mod execution;
pub mod fhe;
pub mod game;
pub mod ledger;

#[cfg(test)]
mod compat;

pub use config::{ConfigError, EngineConfig};
pub use execution::{Entropy, Event, Instruction, Key, Output, Transaction, Value, NAMESPACE};
pub use fhe::{CipherType, ExternalInput, Grantee, Handle};
pub use game::{GameRecord, GameStatus, GameView};
pub use ledger::{Amount, ConfidentialAccount, LedgerVariant, PlainAccount};
