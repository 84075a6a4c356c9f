use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::{Digest, Sha256},
    Digestible, Hasher, Signer, Verifier,
};
use commonware_utils::union;

use crate::codec::{read_string, string_encode_size, write_string};
use crate::constants::MAX_MESSAGE_LENGTH;
use crate::fhe::{ExternalInput, Grantee, Handle};
use crate::game::GameRecord;
use crate::ledger::{Amount, ConfidentialAccount, LedgerVariant, PlainAccount};

pub const NAMESPACE: &[u8] = b"_VEILHILO";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

/// Environment-supplied clock and unpredictability inputs.
///
/// The environment hands one `Entropy` to each block; the engine advances `sequence` once per
/// admitted transaction and derives a per-transaction seed from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entropy {
    /// Logical time in seconds.
    pub timestamp: u64,
    pub seed: Digest,
    pub sequence: u64,
}

impl Entropy {
    pub fn new(timestamp: u64, seed: Digest, sequence: u64) -> Self {
        Self {
            timestamp,
            seed,
            sequence,
        }
    }

    /// Entropy for the transaction at `offset` within the block.
    pub fn for_transaction(&self, offset: u64) -> Self {
        let sequence = self.sequence.saturating_add(offset);
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_ref());
        hasher.update(&sequence.to_be_bytes());
        Self {
            timestamp: self.timestamp,
            seed: hasher.finalize(),
            sequence,
        }
    }
}

impl Write for Entropy {
    fn write(&self, writer: &mut impl BufMut) {
        self.timestamp.write(writer);
        self.seed.write(writer);
        self.sequence.write(writer);
    }
}

impl Read for Entropy {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            timestamp: u64::read(reader)?,
            seed: Digest::read(reader)?,
            sequence: u64::read(reader)?,
        })
    }
}

impl FixedSize for Entropy {
    const SIZE: usize = u64::SIZE + Digest::SIZE + u64::SIZE;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
            instruction: Instruction::read(reader)?,
            public: ed25519::PublicKey::read(reader)?,
            signature: ed25519::Signature::read(reader)?,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

impl Digestible for Transaction {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes().as_ref());
        hasher.update(self.instruction.encode().as_ref());
        hasher.update(self.public.as_ref());
        // Any valid signature authorizes the same transaction, so it is not part of the digest.
        hasher.finalize()
    }
}

/// A wager submitted with `StartGame`. The representation selects the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WagerInput {
    Encrypted(ExternalInput),
    Plain(u64),
}

impl WagerInput {
    pub fn variant(&self) -> LedgerVariant {
        match self {
            Self::Encrypted(_) => LedgerVariant::Confidential,
            Self::Plain(_) => LedgerVariant::Plain,
        }
    }
}

impl Write for WagerInput {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Encrypted(input) => {
                0u8.write(writer);
                input.write(writer);
            }
            Self::Plain(amount) => {
                1u8.write(writer);
                amount.write(writer);
            }
        }
    }
}

impl Read for WagerInput {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Encrypted(ExternalInput::read(reader)?)),
            1 => Ok(Self::Plain(u64::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for WagerInput {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Encrypted(input) => input.encode_size(),
                Self::Plain(amount) => amount.encode_size(),
            }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    // Confidential ledger (tags 10-17)
    /// Binary: [10] [payment:u64 BE] [amount:ExternalInput]
    DepositEncrypted { payment: u64, amount: ExternalInput },

    /// Binary: [11] [payment:u64 BE]
    DepositPlainConverted { payment: u64 },

    /// Binary: [12] [to:PublicKey] [amount:ExternalInput]
    TransferEncrypted { to: PublicKey, amount: ExternalInput },

    /// Binary: [13] [a:ExternalInput] [b:ExternalInput]
    PerformArithmetic { a: ExternalInput, b: ExternalInput },

    /// Binary: [14] [value:u8]
    SetFlag { value: bool },

    /// Binary: [15]
    IncrementScore,

    /// Binary: [16]
    GrantAllPermissions,

    /// Binary: [17]
    ResetAccount,

    // Plaintext ledger (tags 20-22)
    /// Binary: [20] [payment:u64 BE]
    PlainDeposit { payment: u64 },

    /// Binary: [21] [to:PublicKey] [amount:u64 BE]
    PlainTransfer { to: PublicKey, amount: u64 },

    /// Binary: [22] [amount:u64 BE]
    PlainWithdraw { amount: u64 },

    // Game (tags 30-32)
    /// Binary: [30] [wager:WagerInput]
    StartGame { wager: WagerInput },

    /// Binary: [31] [variant:u8] [higher:u8]
    MakeGuess { variant: LedgerVariant, higher: bool },

    /// Binary: [32] [variant:u8]
    CashOut { variant: LedgerVariant },
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::DepositEncrypted { payment, amount } => {
                10u8.write(writer);
                payment.write(writer);
                amount.write(writer);
            }
            Self::DepositPlainConverted { payment } => {
                11u8.write(writer);
                payment.write(writer);
            }
            Self::TransferEncrypted { to, amount } => {
                12u8.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::PerformArithmetic { a, b } => {
                13u8.write(writer);
                a.write(writer);
                b.write(writer);
            }
            Self::SetFlag { value } => {
                14u8.write(writer);
                value.write(writer);
            }
            Self::IncrementScore => 15u8.write(writer),
            Self::GrantAllPermissions => 16u8.write(writer),
            Self::ResetAccount => 17u8.write(writer),

            Self::PlainDeposit { payment } => {
                20u8.write(writer);
                payment.write(writer);
            }
            Self::PlainTransfer { to, amount } => {
                21u8.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::PlainWithdraw { amount } => {
                22u8.write(writer);
                amount.write(writer);
            }

            Self::StartGame { wager } => {
                30u8.write(writer);
                wager.write(writer);
            }
            Self::MakeGuess { variant, higher } => {
                31u8.write(writer);
                variant.write(writer);
                higher.write(writer);
            }
            Self::CashOut { variant } => {
                32u8.write(writer);
                variant.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            10 => Self::DepositEncrypted {
                payment: u64::read(reader)?,
                amount: ExternalInput::read(reader)?,
            },
            11 => Self::DepositPlainConverted {
                payment: u64::read(reader)?,
            },
            12 => Self::TransferEncrypted {
                to: PublicKey::read(reader)?,
                amount: ExternalInput::read(reader)?,
            },
            13 => Self::PerformArithmetic {
                a: ExternalInput::read(reader)?,
                b: ExternalInput::read(reader)?,
            },
            14 => Self::SetFlag {
                value: bool::read(reader)?,
            },
            15 => Self::IncrementScore,
            16 => Self::GrantAllPermissions,
            17 => Self::ResetAccount,

            20 => Self::PlainDeposit {
                payment: u64::read(reader)?,
            },
            21 => Self::PlainTransfer {
                to: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            22 => Self::PlainWithdraw {
                amount: u64::read(reader)?,
            },

            30 => Self::StartGame {
                wager: WagerInput::read(reader)?,
            },
            31 => Self::MakeGuess {
                variant: LedgerVariant::read(reader)?,
                higher: bool::read(reader)?,
            },
            32 => Self::CashOut {
                variant: LedgerVariant::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::DepositEncrypted { payment, amount } => {
                    payment.encode_size() + amount.encode_size()
                }
                Self::DepositPlainConverted { payment } => payment.encode_size(),
                Self::TransferEncrypted { to, amount } => to.encode_size() + amount.encode_size(),
                Self::PerformArithmetic { a, b } => a.encode_size() + b.encode_size(),
                Self::SetFlag { value } => value.encode_size(),
                Self::IncrementScore | Self::GrantAllPermissions | Self::ResetAccount => 0,

                Self::PlainDeposit { payment } => payment.encode_size(),
                Self::PlainTransfer { to, amount } => to.encode_size() + amount.encode_size(),
                Self::PlainWithdraw { amount } => amount.encode_size(),

                Self::StartGame { wager } => wager.encode_size(),
                Self::MakeGuess { variant, higher } => {
                    variant.encode_size() + higher.encode_size()
                }
                Self::CashOut { variant } => variant.encode_size(),
            }
    }
}

/// Minimal account structure for transaction nonce tracking.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Nonce account (tag 0)
    Account(PublicKey),

    // Ledger keys (tags 10-12)
    ConfidentialAccount(PublicKey),
    PlainAccount(PublicKey),
    Permission { handle: Handle, grantee: Grantee },

    // Game keys (tag 13)
    Game {
        variant: LedgerVariant,
        player: PublicKey,
        id: u64,
    },
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }
            Self::ConfidentialAccount(pk) => {
                10u8.write(writer);
                pk.write(writer);
            }
            Self::PlainAccount(pk) => {
                11u8.write(writer);
                pk.write(writer);
            }
            Self::Permission { handle, grantee } => {
                12u8.write(writer);
                handle.write(writer);
                grantee.write(writer);
            }
            Self::Game {
                variant,
                player,
                id,
            } => {
                13u8.write(writer);
                variant.write(writer);
                player.write(writer);
                id.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Account(PublicKey::read(reader)?),
            10 => Self::ConfidentialAccount(PublicKey::read(reader)?),
            11 => Self::PlainAccount(PublicKey::read(reader)?),
            12 => Self::Permission {
                handle: Handle::read(reader)?,
                grantee: Grantee::read(reader)?,
            },
            13 => Self::Game {
                variant: LedgerVariant::read(reader)?,
                player: PublicKey::read(reader)?,
                id: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) | Self::ConfidentialAccount(_) | Self::PlainAccount(_) => {
                    PublicKey::SIZE
                }
                Self::Permission { grantee, .. } => Handle::SIZE + grantee.encode_size(),
                Self::Game { .. } => LedgerVariant::SIZE + PublicKey::SIZE + u64::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Account(Account),

    ConfidentialAccount(ConfidentialAccount),
    PlainAccount(PlainAccount),
    /// Marker stored under `Key::Permission`; presence is the grant.
    Permission,

    Game(GameRecord),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::ConfidentialAccount(account) => {
                10u8.write(writer);
                account.write(writer);
            }
            Self::PlainAccount(account) => {
                11u8.write(writer);
                account.write(writer);
            }
            Self::Permission => 12u8.write(writer),
            Self::Game(record) => {
                13u8.write(writer);
                record.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Account(Account::read(reader)?),
            10 => Self::ConfidentialAccount(ConfidentialAccount::read(reader)?),
            11 => Self::PlainAccount(PlainAccount::read(reader)?),
            12 => Self::Permission,
            13 => Self::Game(GameRecord::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::ConfidentialAccount(account) => account.encode_size(),
                Self::PlainAccount(account) => account.encode_size(),
                Self::Permission => 0,
                Self::Game(record) => record.encode_size(),
            }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    // Confidential ledger events (tags 40-46)
    ConfidentialDeposited {
        player: PublicKey,
        payment: u64,
        balance: Handle,
    },
    ConfidentialTransferred {
        from: PublicKey,
        to: PublicKey,
        from_balance: Handle,
        to_balance: Handle,
    },
    ArithmeticPerformed {
        player: PublicKey,
        score: Handle,
    },
    FlagSet {
        player: PublicKey,
        flag: Handle,
    },
    ScoreIncremented {
        player: PublicKey,
        score: Handle,
    },
    PermissionsGranted {
        player: PublicKey,
    },
    AccountReset {
        player: PublicKey,
    },

    // Plaintext ledger events (tags 50-52)
    PlainDeposited {
        player: PublicKey,
        amount: u64,
        balance: u64,
    },
    PlainTransferred {
        from: PublicKey,
        to: PublicKey,
        amount: u64,
    },
    PlainWithdrawn {
        player: PublicKey,
        amount: u64,
        balance: u64,
    },

    // Game events (tags 60-62)
    GameStarted {
        player: PublicKey,
        variant: LedgerVariant,
        game_id: u64,
        card: u8,
    },
    GuessResolved {
        player: PublicKey,
        variant: LedgerVariant,
        game_id: u64,
        previous_card: u8,
        new_card: u8,
        higher: bool,
        correct: bool,
        winnings: Option<Amount>,
    },
    GameCashedOut {
        player: PublicKey,
        variant: LedgerVariant,
        game_id: u64,
        refund: Option<Amount>,
    },

    /// The operation was rejected as a whole (tag 70).
    Rejected {
        player: PublicKey,
        error_code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::ConfidentialDeposited {
                player,
                payment,
                balance,
            } => {
                40u8.write(writer);
                player.write(writer);
                payment.write(writer);
                balance.write(writer);
            }
            Self::ConfidentialTransferred {
                from,
                to,
                from_balance,
                to_balance,
            } => {
                41u8.write(writer);
                from.write(writer);
                to.write(writer);
                from_balance.write(writer);
                to_balance.write(writer);
            }
            Self::ArithmeticPerformed { player, score } => {
                42u8.write(writer);
                player.write(writer);
                score.write(writer);
            }
            Self::FlagSet { player, flag } => {
                43u8.write(writer);
                player.write(writer);
                flag.write(writer);
            }
            Self::ScoreIncremented { player, score } => {
                44u8.write(writer);
                player.write(writer);
                score.write(writer);
            }
            Self::PermissionsGranted { player } => {
                45u8.write(writer);
                player.write(writer);
            }
            Self::AccountReset { player } => {
                46u8.write(writer);
                player.write(writer);
            }

            Self::PlainDeposited {
                player,
                amount,
                balance,
            } => {
                50u8.write(writer);
                player.write(writer);
                amount.write(writer);
                balance.write(writer);
            }
            Self::PlainTransferred { from, to, amount } => {
                51u8.write(writer);
                from.write(writer);
                to.write(writer);
                amount.write(writer);
            }
            Self::PlainWithdrawn {
                player,
                amount,
                balance,
            } => {
                52u8.write(writer);
                player.write(writer);
                amount.write(writer);
                balance.write(writer);
            }

            Self::GameStarted {
                player,
                variant,
                game_id,
                card,
            } => {
                60u8.write(writer);
                player.write(writer);
                variant.write(writer);
                game_id.write(writer);
                card.write(writer);
            }
            Self::GuessResolved {
                player,
                variant,
                game_id,
                previous_card,
                new_card,
                higher,
                correct,
                winnings,
            } => {
                61u8.write(writer);
                player.write(writer);
                variant.write(writer);
                game_id.write(writer);
                previous_card.write(writer);
                new_card.write(writer);
                higher.write(writer);
                correct.write(writer);
                winnings.write(writer);
            }
            Self::GameCashedOut {
                player,
                variant,
                game_id,
                refund,
            } => {
                62u8.write(writer);
                player.write(writer);
                variant.write(writer);
                game_id.write(writer);
                refund.write(writer);
            }

            Self::Rejected {
                player,
                error_code,
                message,
            } => {
                70u8.write(writer);
                player.write(writer);
                error_code.write(writer);
                write_string(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            40 => Self::ConfidentialDeposited {
                player: PublicKey::read(reader)?,
                payment: u64::read(reader)?,
                balance: Handle::read(reader)?,
            },
            41 => Self::ConfidentialTransferred {
                from: PublicKey::read(reader)?,
                to: PublicKey::read(reader)?,
                from_balance: Handle::read(reader)?,
                to_balance: Handle::read(reader)?,
            },
            42 => Self::ArithmeticPerformed {
                player: PublicKey::read(reader)?,
                score: Handle::read(reader)?,
            },
            43 => Self::FlagSet {
                player: PublicKey::read(reader)?,
                flag: Handle::read(reader)?,
            },
            44 => Self::ScoreIncremented {
                player: PublicKey::read(reader)?,
                score: Handle::read(reader)?,
            },
            45 => Self::PermissionsGranted {
                player: PublicKey::read(reader)?,
            },
            46 => Self::AccountReset {
                player: PublicKey::read(reader)?,
            },

            50 => Self::PlainDeposited {
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            51 => Self::PlainTransferred {
                from: PublicKey::read(reader)?,
                to: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            52 => Self::PlainWithdrawn {
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },

            60 => Self::GameStarted {
                player: PublicKey::read(reader)?,
                variant: LedgerVariant::read(reader)?,
                game_id: u64::read(reader)?,
                card: u8::read(reader)?,
            },
            61 => Self::GuessResolved {
                player: PublicKey::read(reader)?,
                variant: LedgerVariant::read(reader)?,
                game_id: u64::read(reader)?,
                previous_card: u8::read(reader)?,
                new_card: u8::read(reader)?,
                higher: bool::read(reader)?,
                correct: bool::read(reader)?,
                winnings: Option::<Amount>::read(reader)?,
            },
            62 => Self::GameCashedOut {
                player: PublicKey::read(reader)?,
                variant: LedgerVariant::read(reader)?,
                game_id: u64::read(reader)?,
                refund: Option::<Amount>::read(reader)?,
            },

            70 => Self::Rejected {
                player: PublicKey::read(reader)?,
                error_code: u8::read(reader)?,
                message: read_string(reader, MAX_MESSAGE_LENGTH)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::ConfidentialDeposited { .. } => PublicKey::SIZE + u64::SIZE + Handle::SIZE,
                Self::ConfidentialTransferred { .. } => PublicKey::SIZE * 2 + Handle::SIZE * 2,
                Self::ArithmeticPerformed { .. }
                | Self::FlagSet { .. }
                | Self::ScoreIncremented { .. } => PublicKey::SIZE + Handle::SIZE,
                Self::PermissionsGranted { .. } | Self::AccountReset { .. } => PublicKey::SIZE,

                Self::PlainDeposited { .. } | Self::PlainWithdrawn { .. } => {
                    PublicKey::SIZE + u64::SIZE * 2
                }
                Self::PlainTransferred { .. } => PublicKey::SIZE * 2 + u64::SIZE,

                Self::GameStarted { .. } => {
                    PublicKey::SIZE + LedgerVariant::SIZE + u64::SIZE + u8::SIZE
                }
                Self::GuessResolved { winnings, .. } => {
                    PublicKey::SIZE
                        + LedgerVariant::SIZE
                        + u64::SIZE
                        + u8::SIZE * 2
                        + bool::SIZE * 2
                        + winnings.encode_size()
                }
                Self::GameCashedOut { refund, .. } => {
                    PublicKey::SIZE + LedgerVariant::SIZE + u64::SIZE + refund.encode_size()
                }

                Self::Rejected { message, .. } => {
                    PublicKey::SIZE + u8::SIZE + string_encode_size(message)
                }
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Event(event) => event.encode_size(),
            Self::Transaction(transaction) => transaction.encode_size(),
        }
    }
}
