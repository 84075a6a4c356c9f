//! The two balance ledgers a game can settle against.
//!
//! [`PlainLedger`] keeps native-unit balances and guards every debit. [`ConfidentialLedger`]
//! keeps ciphertext handles; it cannot compare a balance with a wager, so its debits wrap on
//! underflow. Closing that gap needs a range proof submitted alongside the debit.

use commonware_cryptography::ed25519::PublicKey;
use veilhilo_types::{
    constants::BASIS_POINTS,
    execution::{Key, Value, WagerInput},
    fhe::{CipherType, ExternalInput, Handle},
    ledger::{Amount, ConfidentialAccount, LedgerVariant, PlainAccount},
};

use crate::{
    error::ExecutionError,
    fhe::{CipherError, Coprocessor, ProofVerifier},
};

/// Balance operations shared by the game state machine.
pub trait Ledger {
    type Account: Clone;

    fn variant(&self) -> LedgerVariant;
    fn account_key(&self, player: &PublicKey) -> Key;
    fn decode_account(&self, value: Value) -> Option<Self::Account>;
    fn encode_account(&self, account: Self::Account) -> Value;
    fn new_account(&self) -> Self::Account;

    /// Turns a submitted wager into an amount on this ledger.
    fn resolve_wager(
        &self,
        player: &PublicKey,
        wager: &WagerInput,
    ) -> Result<Amount, ExecutionError>;
    /// Checks whatever this ledger can check before a wager is escrowed.
    fn ensure_can_wager(&self, account: &Self::Account, wager: &Amount)
        -> Result<(), ExecutionError>;

    fn debit(&self, account: &mut Self::Account, amount: &Amount) -> Result<(), ExecutionError>;
    fn credit(&self, account: &mut Self::Account, amount: &Amount) -> Result<(), ExecutionError>;

    /// Payout for one correct guess.
    fn winnings(&self, wager: &Amount) -> Result<Amount, ExecutionError>;
    fn zero(&self) -> Amount;
    fn increment(&self, score: &Amount) -> Result<Amount, ExecutionError>;
    /// Amount returned to the player on cash-out, if any.
    fn cash_out_refund(&self, wager: &Amount) -> Option<Amount>;

    fn touch(&self, account: &mut Self::Account, now: u64);
    /// Allocates the id of the next game and counts it.
    fn next_game_id(&self, account: &mut Self::Account) -> u64;
    fn latest_game_id(&self, account: &Self::Account) -> Option<u64>;
    /// Handles that must stay decryptable by the engine and the owner.
    fn decryptable_handles(&self, account: &Self::Account) -> Vec<Handle>;
}

pub struct PlainLedger {
    multiplier_bps: u64,
}

impl PlainLedger {
    pub fn new(multiplier_bps: u64) -> Self {
        Self { multiplier_bps }
    }

    fn plain(amount: &Amount) -> Result<u64, ExecutionError> {
        match amount {
            Amount::Plain(value) => Ok(*value),
            Amount::Encrypted(_) => Err(ExecutionError::WrongLedger {
                expected: LedgerVariant::Plain,
            }),
        }
    }

    pub fn deposit(&self, account: &mut PlainAccount, payment: u64) -> Result<(), ExecutionError> {
        if payment == 0 {
            return Err(ExecutionError::ZeroValueDeposit);
        }
        account.balance = account
            .balance
            .checked_add(payment)
            .ok_or(ExecutionError::Overflow)?;
        account.has_deposited = true;
        Ok(())
    }
}

impl Ledger for PlainLedger {
    type Account = PlainAccount;

    fn variant(&self) -> LedgerVariant {
        LedgerVariant::Plain
    }

    fn account_key(&self, player: &PublicKey) -> Key {
        Key::PlainAccount(player.clone())
    }

    fn decode_account(&self, value: Value) -> Option<PlainAccount> {
        match value {
            Value::PlainAccount(account) => Some(account),
            _ => None,
        }
    }

    fn encode_account(&self, account: PlainAccount) -> Value {
        Value::PlainAccount(account)
    }

    fn new_account(&self) -> PlainAccount {
        PlainAccount::default()
    }

    fn resolve_wager(&self, _: &PublicKey, wager: &WagerInput) -> Result<Amount, ExecutionError> {
        match wager {
            WagerInput::Plain(0) => Err(ExecutionError::ZeroWager),
            WagerInput::Plain(value) => Ok(Amount::Plain(*value)),
            WagerInput::Encrypted(_) => Err(ExecutionError::WrongLedger {
                expected: LedgerVariant::Plain,
            }),
        }
    }

    fn ensure_can_wager(
        &self,
        account: &PlainAccount,
        wager: &Amount,
    ) -> Result<(), ExecutionError> {
        let required = Self::plain(wager)?;
        if account.balance < required {
            return Err(ExecutionError::InsufficientBalance {
                available: account.balance,
                required,
            });
        }
        Ok(())
    }

    fn debit(&self, account: &mut PlainAccount, amount: &Amount) -> Result<(), ExecutionError> {
        let amount = Self::plain(amount)?;
        account.balance =
            account
                .balance
                .checked_sub(amount)
                .ok_or(ExecutionError::InsufficientBalance {
                    available: account.balance,
                    required: amount,
                })?;
        Ok(())
    }

    fn credit(&self, account: &mut PlainAccount, amount: &Amount) -> Result<(), ExecutionError> {
        account.balance = account
            .balance
            .checked_add(Self::plain(amount)?)
            .ok_or(ExecutionError::Overflow)?;
        Ok(())
    }

    fn winnings(&self, wager: &Amount) -> Result<Amount, ExecutionError> {
        let wager = Self::plain(wager)? as u128;
        let winnings = wager * self.multiplier_bps as u128 / BASIS_POINTS as u128;
        u64::try_from(winnings)
            .map(Amount::Plain)
            .map_err(|_| ExecutionError::Overflow)
    }

    fn zero(&self) -> Amount {
        Amount::Plain(0)
    }

    fn increment(&self, score: &Amount) -> Result<Amount, ExecutionError> {
        Self::plain(score)?
            .checked_add(1)
            .map(Amount::Plain)
            .ok_or(ExecutionError::Overflow)
    }

    fn cash_out_refund(&self, wager: &Amount) -> Option<Amount> {
        Some(*wager)
    }

    fn touch(&self, account: &mut PlainAccount, now: u64) {
        account.last_activity = now;
    }

    fn next_game_id(&self, account: &mut PlainAccount) -> u64 {
        let id = account.games_started;
        account.games_started += 1;
        id
    }

    fn latest_game_id(&self, account: &PlainAccount) -> Option<u64> {
        account.games_started.checked_sub(1)
    }

    fn decryptable_handles(&self, _: &PlainAccount) -> Vec<Handle> {
        Vec::new()
    }
}

pub struct ConfidentialLedger<'c> {
    coprocessor: &'c dyn Coprocessor,
    verifier: &'c dyn ProofVerifier,
    multiplier: u32,
}

impl<'c> ConfidentialLedger<'c> {
    pub fn new(
        coprocessor: &'c dyn Coprocessor,
        verifier: &'c dyn ProofVerifier,
        multiplier: u32,
    ) -> Self {
        Self {
            coprocessor,
            verifier,
            multiplier,
        }
    }

    /// Validates an externally encrypted integer.
    pub fn from_external(
        &self,
        submitter: &PublicKey,
        input: &ExternalInput,
    ) -> Result<Handle, ExecutionError> {
        let handle = self.verifier.verify(submitter, input)?;
        if handle.ty != CipherType::Uint32 {
            return Err(CipherError::TypeMismatch {
                expected: CipherType::Uint32,
                found: handle.ty,
            }
            .into());
        }
        Ok(handle)
    }

    fn encrypted(amount: &Amount) -> Result<Handle, ExecutionError> {
        match amount {
            Amount::Encrypted(handle) => Ok(*handle),
            Amount::Plain(_) => Err(ExecutionError::WrongLedger {
                expected: LedgerVariant::Confidential,
            }),
        }
    }

    /// A fresh account holding encryptions of zero and `false`.
    pub fn default_account(&self) -> ConfidentialAccount {
        ConfidentialAccount::new(self.coprocessor.encrypt(0), self.coprocessor.encrypt_bool(false))
    }
}

impl Ledger for ConfidentialLedger<'_> {
    type Account = ConfidentialAccount;

    fn variant(&self) -> LedgerVariant {
        LedgerVariant::Confidential
    }

    fn account_key(&self, player: &PublicKey) -> Key {
        Key::ConfidentialAccount(player.clone())
    }

    fn decode_account(&self, value: Value) -> Option<ConfidentialAccount> {
        match value {
            Value::ConfidentialAccount(account) => Some(account),
            _ => None,
        }
    }

    fn encode_account(&self, account: ConfidentialAccount) -> Value {
        Value::ConfidentialAccount(account)
    }

    fn new_account(&self) -> ConfidentialAccount {
        self.default_account()
    }

    fn resolve_wager(
        &self,
        player: &PublicKey,
        wager: &WagerInput,
    ) -> Result<Amount, ExecutionError> {
        match wager {
            WagerInput::Encrypted(input) => {
                Ok(Amount::Encrypted(self.from_external(player, input)?))
            }
            WagerInput::Plain(_) => Err(ExecutionError::WrongLedger {
                expected: LedgerVariant::Confidential,
            }),
        }
    }

    fn ensure_can_wager(
        &self,
        account: &ConfidentialAccount,
        _: &Amount,
    ) -> Result<(), ExecutionError> {
        if !account.has_deposited {
            return Err(ExecutionError::NoDepositOnRecord);
        }
        Ok(())
    }

    fn debit(
        &self,
        account: &mut ConfidentialAccount,
        amount: &Amount,
    ) -> Result<(), ExecutionError> {
        // Wraps if the plaintext balance is smaller than the amount.
        account.balance = self
            .coprocessor
            .sub(&account.balance, &Self::encrypted(amount)?)?;
        Ok(())
    }

    fn credit(
        &self,
        account: &mut ConfidentialAccount,
        amount: &Amount,
    ) -> Result<(), ExecutionError> {
        account.balance = self
            .coprocessor
            .add(&account.balance, &Self::encrypted(amount)?)?;
        Ok(())
    }

    fn winnings(&self, wager: &Amount) -> Result<Amount, ExecutionError> {
        let multiplier = self.coprocessor.encrypt(self.multiplier);
        Ok(Amount::Encrypted(
            self.coprocessor.mul(&Self::encrypted(wager)?, &multiplier)?,
        ))
    }

    fn zero(&self) -> Amount {
        Amount::Encrypted(self.coprocessor.encrypt(0))
    }

    fn increment(&self, score: &Amount) -> Result<Amount, ExecutionError> {
        let one = self.coprocessor.encrypt(1);
        Ok(Amount::Encrypted(
            self.coprocessor.add(&Self::encrypted(score)?, &one)?,
        ))
    }

    fn cash_out_refund(&self, _: &Amount) -> Option<Amount> {
        // Winnings were credited as they accrued.
        None
    }

    fn touch(&self, account: &mut ConfidentialAccount, now: u64) {
        account.last_activity = now;
    }

    fn next_game_id(&self, account: &mut ConfidentialAccount) -> u64 {
        let id = account.games_started;
        account.games_started += 1;
        id
    }

    fn latest_game_id(&self, account: &ConfidentialAccount) -> Option<u64> {
        account.games_started.checked_sub(1)
    }

    fn decryptable_handles(&self, account: &ConfidentialAccount) -> Vec<Handle> {
        account.handles().to_vec()
    }
}
