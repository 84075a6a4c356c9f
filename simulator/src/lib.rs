//! Replays YAML scenarios against an in-memory engine backed by the mock coprocessor.
//!
//! A scenario is a list of blocks; each block carries a timestamp, an entropy label, and the
//! signed steps to submit. Signers are identified by the seed of their key.

use anyhow::{Context, Result};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::{debug, info, warn, Level};
use veilhilo_execution::{
    mocks::{create_entropy, MockFhe, Plaintext},
    nonce, query, Layer, Memory, State,
};
use veilhilo_types::{
    execution::WagerInput, fhe::Grantee, ledger::LedgerVariant, ConfigError, EngineConfig, Event,
    Instruction, Output, Transaction,
};

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("invalid engine config: {0}")]
    Engine(#[from] ConfigError),
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("scenario has no blocks")]
    EmptyScenario,
    #[error("block {index} has timestamp {timestamp}, before the previous block ({previous})")]
    TimestampRegression {
        index: usize,
        timestamp: u64,
        previous: u64,
    },
    #[error("confidential wager {value} does not fit in 32 bits")]
    WagerOutOfRange { value: u64 },
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Scenario file, relative to the config file when not absolute.
    pub scenario: PathBuf,
}

impl SimulatorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        serde_yaml::from_str(&contents).context("Could not parse config file")
    }

    pub fn validate(&self) -> Result<Level, SimulatorError> {
        self.engine.validate()?;
        Level::from_str(&self.log_level).map_err(|_| SimulatorError::InvalidLogLevel {
            value: self.log_level.clone(),
        })
    }

    pub fn scenario_path(&self, config_path: &Path) -> PathBuf {
        match config_path.parent() {
            Some(dir) if self.scenario.is_relative() => dir.join(&self.scenario),
            _ => self.scenario.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Confidential,
    Plain,
}

impl From<Variant> for LedgerVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Confidential => LedgerVariant::Confidential,
            Variant::Plain => LedgerVariant::Plain,
        }
    }
}

/// A scenario step. Encrypted amounts are given in the clear and encrypted for the signer.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    DepositEncrypted { payment: u64, amount: u32 },
    DepositPlainConverted { payment: u64 },
    TransferEncrypted { to: u64, amount: u32 },
    PerformArithmetic { a: u32, b: u32 },
    SetFlag { value: bool },
    IncrementScore,
    GrantAllPermissions,
    ResetAccount,
    PlainDeposit { payment: u64 },
    PlainTransfer { to: u64, amount: u64 },
    PlainWithdraw { amount: u64 },
    StartGame { variant: Variant, wager: u64 },
    MakeGuess { variant: Variant, higher: bool },
    CashOut { variant: Variant },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    pub signer: u64,
    pub action: Action,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Block {
    pub timestamp: u64,
    /// Label hashed into the block seed.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub transactions: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    pub blocks: Vec<Block>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read scenario file {}", path.display()))?;
        serde_yaml::from_str(&contents).context("Could not parse scenario file")
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        if self.blocks.is_empty() {
            return Err(SimulatorError::EmptyScenario);
        }
        for (index, pair) in self.blocks.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(SimulatorError::TimestampRegression {
                    index: index + 1,
                    timestamp: pair[1].timestamp,
                    previous: pair[0].timestamp,
                });
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSummary {
    pub seed: u64,
    pub plain_balance: u64,
    pub has_deposited: bool,
    /// Decrypted by the owner; `None` without a confidential account.
    pub confidential_balance: Option<u32>,
    pub confidential_score: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub blocks: u64,
    pub transactions: u64,
    pub events: u64,
    pub rejections: u64,
    pub accounts: Vec<AccountSummary>,
}

pub struct Simulator {
    state: Memory,
    fhe: MockFhe,
    config: EngineConfig,
    sequence: u64,
    signers: BTreeMap<u64, PrivateKey>,
    summary: Summary,
}

impl Simulator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: Memory::default(),
            fhe: MockFhe::default(),
            config,
            sequence: 0,
            signers: BTreeMap::new(),
            summary: Summary::default(),
        }
    }

    pub fn state(&self) -> &Memory {
        &self.state
    }

    fn signer(&mut self, seed: u64) -> PrivateKey {
        self.signers
            .entry(seed)
            .or_insert_with(|| PrivateKey::from_seed(seed))
            .clone()
    }

    fn public(&mut self, seed: u64) -> PublicKey {
        self.signer(seed).public_key()
    }

    fn instruction(&mut self, submitter: &PublicKey, action: &Action) -> Result<Instruction> {
        Ok(match action {
            Action::DepositEncrypted { payment, amount } => Instruction::DepositEncrypted {
                payment: *payment,
                amount: self.fhe.encrypt_input(submitter, *amount),
            },
            Action::DepositPlainConverted { payment } => {
                Instruction::DepositPlainConverted { payment: *payment }
            }
            Action::TransferEncrypted { to, amount } => Instruction::TransferEncrypted {
                to: self.public(*to),
                amount: self.fhe.encrypt_input(submitter, *amount),
            },
            Action::PerformArithmetic { a, b } => Instruction::PerformArithmetic {
                a: self.fhe.encrypt_input(submitter, *a),
                b: self.fhe.encrypt_input(submitter, *b),
            },
            Action::SetFlag { value } => Instruction::SetFlag { value: *value },
            Action::IncrementScore => Instruction::IncrementScore,
            Action::GrantAllPermissions => Instruction::GrantAllPermissions,
            Action::ResetAccount => Instruction::ResetAccount,
            Action::PlainDeposit { payment } => Instruction::PlainDeposit { payment: *payment },
            Action::PlainTransfer { to, amount } => Instruction::PlainTransfer {
                to: self.public(*to),
                amount: *amount,
            },
            Action::PlainWithdraw { amount } => Instruction::PlainWithdraw { amount: *amount },
            Action::StartGame { variant, wager } => Instruction::StartGame {
                wager: match variant {
                    Variant::Plain => WagerInput::Plain(*wager),
                    Variant::Confidential => {
                        let value = u32::try_from(*wager)
                            .map_err(|_| SimulatorError::WagerOutOfRange { value: *wager })?;
                        WagerInput::Encrypted(self.fhe.encrypt_input(submitter, value))
                    }
                },
            },
            Action::MakeGuess { variant, higher } => Instruction::MakeGuess {
                variant: (*variant).into(),
                higher: *higher,
            },
            Action::CashOut { variant } => Instruction::CashOut {
                variant: (*variant).into(),
            },
        })
    }

    /// Signs, executes, and commits one block.
    pub async fn execute_block(&mut self, block: &Block) -> Result<Vec<Output>> {
        let mut nonces: BTreeMap<PublicKey, u64> = BTreeMap::new();
        let mut txs = Vec::with_capacity(block.transactions.len());
        for step in &block.transactions {
            let signer = self.signer(step.signer);
            let public = signer.public_key();
            let next = match nonces.get(&public) {
                Some(next) => *next,
                None => nonce(&self.state, &public).await?,
            };
            nonces.insert(public.clone(), next + 1);
            let instruction = self.instruction(&public, &step.action)?;
            txs.push(Transaction::sign(&signer, next, instruction));
        }

        let entropy = create_entropy(block.timestamp, block.seed, self.sequence);
        let (outputs, changes) = {
            let mut layer = Layer::new(
                &self.state,
                &self.fhe,
                &self.fhe,
                self.config.clone(),
                entropy,
            );
            let (outputs, _) = layer.execute(txs).await?;
            (outputs, layer.commit())
        };
        self.state.apply(changes).await?;

        let admitted = outputs
            .iter()
            .filter(|output| matches!(output, Output::Transaction(_)))
            .count() as u64;
        self.sequence += admitted;
        self.summary.blocks += 1;
        self.summary.transactions += admitted;
        for output in &outputs {
            if let Output::Event(event) = output {
                self.summary.events += 1;
                if let Event::Rejected {
                    error_code, message, ..
                } = event
                {
                    self.summary.rejections += 1;
                    warn!(error_code, message, "transaction rejected");
                } else {
                    info!(?event, "event");
                }
            }
        }
        debug!(
            timestamp = block.timestamp,
            admitted,
            sequence = self.sequence,
            "block committed"
        );
        Ok(outputs)
    }

    pub async fn run(&mut self, scenario: &Scenario) -> Result<Summary> {
        scenario.validate()?;
        for block in &scenario.blocks {
            self.execute_block(block).await?;
        }
        self.summary().await
    }

    /// Totals so far plus the view of every signer seen.
    pub async fn summary(&self) -> Result<Summary> {
        let mut summary = self.summary.clone();
        summary.accounts.clear();
        for (seed, signer) in &self.signers {
            let public = signer.public_key();
            let owner = Grantee::Principal(public.clone());
            let (confidential_balance, confidential_score) =
                match query::confidential_account(&self.state, &public).await? {
                    Some(account) => (
                        self.reveal(&account.balance, &owner).await?,
                        self.reveal(&account.score, &owner).await?,
                    ),
                    None => (None, None),
                };
            summary.accounts.push(AccountSummary {
                seed: *seed,
                plain_balance: query::plain_balance(&self.state, &public).await?,
                has_deposited: query::has_deposited(&self.state, &public).await?,
                confidential_balance,
                confidential_score,
            });
        }
        Ok(summary)
    }

    async fn reveal(
        &self,
        handle: &veilhilo_types::Handle,
        owner: &Grantee,
    ) -> Result<Option<u32>> {
        Ok(match self.fhe.decrypt(&self.state, handle, owner).await? {
            Plaintext::Uint32(value) => Some(value),
            Plaintext::Bool(_) => None,
        })
    }
}
