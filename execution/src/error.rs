use thiserror::Error;
use veilhilo_types::{
    constants::{
        ERROR_ARITHMETIC_OVERFLOW, ERROR_CIPHER_TYPE, ERROR_DEPOSIT_OUT_OF_RANGE,
        ERROR_GAME_ALREADY_ACTIVE, ERROR_INSUFFICIENT_BALANCE, ERROR_NO_ACTIVE_GAME,
        ERROR_NO_DEPOSIT, ERROR_PROOF_VERIFICATION_FAILED, ERROR_SELF_TRANSFER,
        ERROR_WRONG_LEDGER, ERROR_ZERO_VALUE_DEPOSIT, ERROR_ZERO_WAGER,
    },
    ledger::LedgerVariant,
};

use crate::fhe::{CipherError, VerifyError};

/// Why an operation did not commit.
///
/// Every variant except [`ExecutionError::State`] is a rejection: the operation is dropped as a
/// whole and reported to the caller. `State` means storage failed and the block cannot proceed.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("deposit requires a positive payment")]
    ZeroValueDeposit,
    #[error("cannot transfer to self")]
    SelfTransferNotAllowed,
    #[error("no deposit on record")]
    NoDepositOnRecord,
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: u64, required: u64 },
    #[error("proof verification failed: {0}")]
    ProofVerificationFailed(#[from] VerifyError),
    #[error("game already active")]
    GameAlreadyActive,
    #[error("no active game")]
    NoActiveGame,
    #[error("wager must be positive")]
    ZeroWager,
    #[error("converted deposit of {units} units is outside the ciphertext range")]
    DepositOutOfRange { units: u64 },
    #[error(transparent)]
    Cipher(#[from] CipherError),
    #[error("amount does not belong to the {expected:?} ledger")]
    WrongLedger { expected: LedgerVariant },
    #[error("arithmetic overflow")]
    Overflow,
    #[error("state error: {0:#}")]
    State(#[from] anyhow::Error),
}

impl ExecutionError {
    /// Stable code carried by `Event::Rejected`. Storage failures are never reported this way.
    pub fn code(&self) -> u8 {
        match self {
            Self::ZeroValueDeposit => ERROR_ZERO_VALUE_DEPOSIT,
            Self::SelfTransferNotAllowed => ERROR_SELF_TRANSFER,
            Self::NoDepositOnRecord => ERROR_NO_DEPOSIT,
            Self::InsufficientBalance { .. } => ERROR_INSUFFICIENT_BALANCE,
            Self::ProofVerificationFailed(_) => ERROR_PROOF_VERIFICATION_FAILED,
            Self::GameAlreadyActive => ERROR_GAME_ALREADY_ACTIVE,
            Self::NoActiveGame => ERROR_NO_ACTIVE_GAME,
            Self::ZeroWager => ERROR_ZERO_WAGER,
            Self::DepositOutOfRange { .. } => ERROR_DEPOSIT_OUT_OF_RANGE,
            Self::Cipher(_) => ERROR_CIPHER_TYPE,
            Self::WrongLedger { .. } => ERROR_WRONG_LEDGER,
            Self::Overflow => ERROR_ARITHMETIC_OVERFLOW,
            Self::State(_) => 0,
        }
    }
}
