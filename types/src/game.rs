//! Game records for the higher/lower card game.
//!
//! Record lifecycle:
//! `NoGame -> Active -> {Lost, CashedOut}`, and a settled player may start a fresh game.
//! Records are never removed; each one is stored under its `(variant, player, game_id)`.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};

use crate::ledger::{Amount, LedgerVariant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GameStatus {
    Active = 0,
    /// Settled by an incorrect guess.
    Lost = 1,
    CashedOut = 2,
}

impl Write for GameStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Active),
            1 => Ok(Self::Lost),
            2 => Ok(Self::CashedOut),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for GameStatus {
    const SIZE: usize = u8::SIZE;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub id: u64,
    pub player: PublicKey,
    pub variant: LedgerVariant,
    pub wager: Amount,
    pub score: Amount,
    /// Rank in `1..=13`.
    pub current_card: u8,
    pub status: GameStatus,
    pub started_at: u64,
    /// Commitment mixed into every draw after the first.
    pub secret: Digest,
    pub guesses: u32,
}

impl GameRecord {
    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    pub fn view(&self) -> GameView {
        GameView {
            current_card: self.current_card,
            is_active: self.is_active(),
            started_at: self.started_at,
            score: self.score,
            wager: self.wager,
        }
    }
}

impl Write for GameRecord {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.player.write(writer);
        self.variant.write(writer);
        self.wager.write(writer);
        self.score.write(writer);
        self.current_card.write(writer);
        self.status.write(writer);
        self.started_at.write(writer);
        self.secret.write(writer);
        self.guesses.write(writer);
    }
}

impl Read for GameRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            player: PublicKey::read(reader)?,
            variant: LedgerVariant::read(reader)?,
            wager: Amount::read(reader)?,
            score: Amount::read(reader)?,
            current_card: u8::read(reader)?,
            status: GameStatus::read(reader)?,
            started_at: u64::read(reader)?,
            secret: Digest::read(reader)?,
            guesses: u32::read(reader)?,
        })
    }
}

impl EncodeSize for GameRecord {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.player.encode_size()
            + self.variant.encode_size()
            + self.wager.encode_size()
            + self.score.encode_size()
            + self.current_card.encode_size()
            + self.status.encode_size()
            + self.started_at.encode_size()
            + self.secret.encode_size()
            + self.guesses.encode_size()
    }
}

/// Read-only snapshot returned by `getGame`. Encrypted fields stay as handles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameView {
    pub current_card: u8,
    pub is_active: bool,
    pub started_at: u64,
    pub score: Amount,
    pub wager: Amount,
}
