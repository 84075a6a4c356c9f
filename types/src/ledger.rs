use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

use crate::fhe::Handle;

/// Which balance ledger backs an account or a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LedgerVariant {
    Confidential = 0,
    Plain = 1,
}

impl Write for LedgerVariant {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for LedgerVariant {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Confidential),
            1 => Ok(Self::Plain),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for LedgerVariant {
    const SIZE: usize = u8::SIZE;
}

/// A balance-typed value: encrypted on the confidential ledger, native units on the plain one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Amount {
    Encrypted(Handle),
    Plain(u64),
}

impl Write for Amount {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Encrypted(handle) => {
                0u8.write(writer);
                handle.write(writer);
            }
            Self::Plain(value) => {
                1u8.write(writer);
                value.write(writer);
            }
        }
    }
}

impl Read for Amount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Encrypted(Handle::read(reader)?)),
            1 => Ok(Self::Plain(u64::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Amount {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Encrypted(_) => Handle::SIZE,
                Self::Plain(_) => u64::SIZE,
            }
    }
}

/// Per-principal encrypted balance, score and flag.
///
/// Created lazily with encryptions of zero/false the first time an operation touches the
/// principal. Never deleted; `resetAccount` restores the defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfidentialAccount {
    pub balance: Handle,
    pub score: Handle,
    pub flag: Handle,
    pub has_deposited: bool,
    pub last_activity: u64,
    pub games_started: u64,
}

impl ConfidentialAccount {
    pub fn new(zero: Handle, false_flag: Handle) -> Self {
        Self {
            balance: zero,
            score: zero,
            flag: false_flag,
            has_deposited: false,
            last_activity: 0,
            games_started: 0,
        }
    }

    /// Handles in the account's current slots.
    pub fn handles(&self) -> [Handle; 3] {
        [self.balance, self.score, self.flag]
    }
}

impl Write for ConfidentialAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        self.score.write(writer);
        self.flag.write(writer);
        self.has_deposited.write(writer);
        self.last_activity.write(writer);
        self.games_started.write(writer);
    }
}

impl Read for ConfidentialAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balance: Handle::read(reader)?,
            score: Handle::read(reader)?,
            flag: Handle::read(reader)?,
            has_deposited: bool::read(reader)?,
            last_activity: u64::read(reader)?,
            games_started: u64::read(reader)?,
        })
    }
}

impl FixedSize for ConfidentialAccount {
    const SIZE: usize = Handle::SIZE * 3 + bool::SIZE + u64::SIZE * 2;
}

/// Per-principal plaintext balance in native base units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlainAccount {
    pub balance: u64,
    pub has_deposited: bool,
    pub last_activity: u64,
    pub games_started: u64,
}

impl Write for PlainAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        self.has_deposited.write(writer);
        self.last_activity.write(writer);
        self.games_started.write(writer);
    }
}

impl Read for PlainAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balance: u64::read(reader)?,
            has_deposited: bool::read(reader)?,
            last_activity: u64::read(reader)?,
            games_started: u64::read(reader)?,
        })
    }
}

impl FixedSize for PlainAccount {
    const SIZE: usize = u64::SIZE + bool::SIZE + u64::SIZE * 2;
}
