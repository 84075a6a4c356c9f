use anyhow::{Context as _, Result};
use commonware_cryptography::ed25519::PublicKey;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use veilhilo_types::{
    config::EngineConfig,
    constants::MAX_MESSAGE_LENGTH,
    execution::{Entropy, Event, Instruction, Key, Output, Transaction, Value, WagerInput},
    ledger::LedgerVariant,
};

use crate::{
    error::ExecutionError,
    fhe::{Coprocessor, ProofVerifier},
    ledger::{ConfidentialLedger, PlainLedger},
    state::{load_account, validate_and_increment_nonce, PrepareError, State, Status},
};

mod handlers;

/// Executes one block of ordered transactions against `state`.
///
/// Writes go to a per-transaction scratch overlay first. A transaction that is rejected has its
/// scratch discarded, so no partial effect survives; only its nonce is consumed.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
    scratch: BTreeMap<Key, Status>,

    coprocessor: &'a dyn Coprocessor,
    verifier: &'a dyn ProofVerifier,
    config: EngineConfig,

    block: Entropy,
    entropy: Entropy,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(
        state: &'a S,
        coprocessor: &'a dyn Coprocessor,
        verifier: &'a dyn ProofVerifier,
        config: EngineConfig,
        entropy: Entropy,
    ) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
            scratch: BTreeMap::new(),

            coprocessor,
            verifier,
            config,

            block: entropy,
            entropy,
        }
    }

    /// Logical time of the block.
    pub fn now(&self) -> u64 {
        self.block.timestamp
    }

    fn plain_ledger(&self) -> PlainLedger {
        PlainLedger::new(self.config.plain_multiplier_bps)
    }

    fn confidential_ledger(&self) -> ConfidentialLedger<'a> {
        ConfidentialLedger::new(
            self.coprocessor,
            self.verifier,
            self.config.confidential_multiplier,
        )
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public)
            .await
            .map_err(PrepareError::State)?;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.pending.insert(
            Key::Account(transaction.public.clone()),
            Status::Update(Value::Account(account)),
        );

        Ok(())
    }

    async fn apply(&mut self, transaction: &Transaction) -> Result<Vec<Event>, ExecutionError> {
        let public = &transaction.public;

        match &transaction.instruction {
            Instruction::DepositEncrypted { payment, amount } => {
                self.handle_deposit_encrypted(public, *payment, amount).await
            }
            Instruction::DepositPlainConverted { payment } => {
                self.handle_deposit_plain_converted(public, *payment).await
            }
            Instruction::TransferEncrypted { to, amount } => {
                self.handle_transfer_encrypted(public, to, amount).await
            }
            Instruction::PerformArithmetic { a, b } => {
                self.handle_perform_arithmetic(public, a, b).await
            }
            Instruction::SetFlag { value } => self.handle_set_flag(public, *value).await,
            Instruction::IncrementScore => self.handle_increment_score(public).await,
            Instruction::GrantAllPermissions => self.handle_grant_all_permissions(public).await,
            Instruction::ResetAccount => self.handle_reset_account(public).await,

            Instruction::PlainDeposit { payment } => {
                self.handle_plain_deposit(public, *payment).await
            }
            Instruction::PlainTransfer { to, amount } => {
                self.handle_plain_transfer(public, to, *amount).await
            }
            Instruction::PlainWithdraw { amount } => {
                self.handle_plain_withdraw(public, *amount).await
            }

            Instruction::StartGame { wager } => match wager.variant() {
                LedgerVariant::Confidential => {
                    let ledger = self.confidential_ledger();
                    self.handle_start_game(&ledger, public, wager).await
                }
                LedgerVariant::Plain => {
                    let ledger = self.plain_ledger();
                    self.handle_start_game(&ledger, public, wager).await
                }
            },
            Instruction::MakeGuess { variant, higher } => match variant {
                LedgerVariant::Confidential => {
                    let ledger = self.confidential_ledger();
                    self.handle_make_guess(&ledger, public, *higher).await
                }
                LedgerVariant::Plain => {
                    let ledger = self.plain_ledger();
                    self.handle_make_guess(&ledger, public, *higher).await
                }
            },
            Instruction::CashOut { variant } => match variant {
                LedgerVariant::Confidential => {
                    let ledger = self.confidential_ledger();
                    self.handle_cash_out(&ledger, public).await
                }
                LedgerVariant::Plain => {
                    let ledger = self.plain_ledger();
                    self.handle_cash_out(&ledger, public).await
                }
            },
        }
    }

    pub async fn execute(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<(Vec<Output>, BTreeMap<PublicKey, u64>)> {
        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();
        let mut admitted = 0u64;

        for tx in transactions {
            match self.prepare(&tx).await {
                Ok(()) => {}
                Err(PrepareError::NonceMismatch { expected, got }) => {
                    debug!(
                        public = ?tx.public,
                        expected,
                        got,
                        "nonce mismatch; dropping transaction"
                    );
                    continue;
                }
                Err(PrepareError::State(err)) => {
                    return Err(err).context("state error during prepare");
                }
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));

            self.entropy = self.block.for_transaction(admitted);
            admitted += 1;

            match self.apply(&tx).await {
                Ok(events) => {
                    debug!(
                        public = ?tx.public,
                        sequence = self.entropy.sequence,
                        events = events.len(),
                        "applied transaction"
                    );
                    self.pending.append(&mut self.scratch);
                    outputs.extend(events.into_iter().map(Output::Event));
                }
                Err(ExecutionError::State(err)) => {
                    return Err(err).context("state error during apply");
                }
                Err(rejection) => {
                    warn!(
                        public = ?tx.public,
                        sequence = self.entropy.sequence,
                        error = %rejection,
                        "rejected transaction"
                    );
                    self.scratch.clear();
                    outputs.push(Output::Event(Event::Rejected {
                        player: tx.public.clone(),
                        error_code: rejection.code(),
                        message: truncate(rejection.to_string()),
                    }));
                }
            }
            outputs.push(Output::Transaction(tx));
        }

        Ok((outputs, processed_nonces))
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

fn truncate(mut message: String) -> String {
    if message.len() > MAX_MESSAGE_LENGTH {
        let mut end = MAX_MESSAGE_LENGTH;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.scratch.get(key).or_else(|| self.pending.get(key)) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.scratch.insert(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.scratch.insert(key.clone(), Status::Delete);
        Ok(())
    }
}
