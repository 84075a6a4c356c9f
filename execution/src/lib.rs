//! Veilhilo execution layer.
//!
//! This crate contains the deterministic transaction execution logic (`Layer`), the confidential
//! and plain ledgers, the access-control list over encrypted handles, and the higher/lower game.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution; the block's [`Entropy`] carries the clock.
//! - Only derive randomness from the per-transaction entropy seed.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! Encrypted arithmetic is delegated to a [`fhe::Coprocessor`]; execution never sees plaintexts
//! of confidential values.
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use veilhilo_execution::{mocks::{create_entropy, MockFhe}, Layer, Memory, State};
//! use veilhilo_types::EngineConfig;
//!
//! # async fn example(txs: Vec<veilhilo_types::Transaction>) -> anyhow::Result<()> {
//! let mut state = Memory::default();
//! let fhe = MockFhe::default();
//! let mut layer = Layer::new(&state, &fhe, &fhe, EngineConfig::default(), create_entropy(1, 0, 0));
//! let (outputs, _nonces) = layer.execute(txs).await?;
//! let changes = layer.commit();
//! state.apply(changes).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Entropy`]: veilhilo_types::Entropy

pub mod acl;
pub mod draw;
pub mod error;
pub mod fhe;
pub mod ledger;
pub mod query;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod scenario_tests;

mod layer;
mod state;

pub use error::ExecutionError;
pub use layer::Layer;
pub use state::{nonce, Memory, PrepareError, State, Status};
