//! Ciphertext handles and the access-control principals that may decrypt them.
//!
//! A [`Handle`] is an opaque reference to a value held by the encryption coprocessor. The engine
//! never sees the plaintext behind a handle; it only passes handles to the coprocessor for
//! arithmetic and records which [`Grantee`]s may ask for decryption.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};

use crate::constants::{MAX_CIPHERTEXT_LENGTH, MAX_PROOF_LENGTH};

/// Plaintext type behind a ciphertext handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum CipherType {
    Uint32 = 0,
    Bool = 1,
}

impl TryFrom<u8> for CipherType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Uint32),
            1 => Ok(Self::Bool),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl Write for CipherType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for CipherType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Self::try_from(u8::read(reader)?)
    }
}

impl FixedSize for CipherType {
    const SIZE: usize = u8::SIZE;
}

/// Opaque, immutable reference to an encrypted value.
///
/// Updating a ledger slot assigns a new handle; the previous handle stays valid wherever it is
/// still referenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    pub ty: CipherType,
    pub id: Digest,
}

impl Handle {
    pub fn new(ty: CipherType, id: Digest) -> Self {
        Self { ty, id }
    }
}

impl Write for Handle {
    fn write(&self, writer: &mut impl BufMut) {
        self.ty.write(writer);
        self.id.write(writer);
    }
}

impl Read for Handle {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            ty: CipherType::read(reader)?,
            id: Digest::read(reader)?,
        })
    }
}

impl FixedSize for Handle {
    const SIZE: usize = CipherType::SIZE + Digest::SIZE;
}

/// A principal that may request decryption of a handle.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grantee {
    /// The engine itself, so it can keep computing on the value.
    Engine,
    Principal(PublicKey),
}

impl Write for Grantee {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Engine => 0u8.write(writer),
            Self::Principal(pk) => {
                1u8.write(writer);
                pk.write(writer);
            }
        }
    }
}

impl Read for Grantee {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Engine),
            1 => Ok(Self::Principal(PublicKey::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Grantee {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Engine => 0,
                Self::Principal(_) => PublicKey::SIZE,
            }
    }
}

/// A ciphertext produced outside the engine plus the proof binding it to its submitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalInput {
    pub ciphertext: Vec<u8>,
    pub proof: Vec<u8>,
}

impl Write for ExternalInput {
    fn write(&self, writer: &mut impl BufMut) {
        self.ciphertext.write(writer);
        self.proof.write(writer);
    }
}

impl Read for ExternalInput {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            ciphertext: Vec::<u8>::read_range(reader, 0..=MAX_CIPHERTEXT_LENGTH)?,
            proof: Vec::<u8>::read_range(reader, 0..=MAX_PROOF_LENGTH)?,
        })
    }
}

impl EncodeSize for ExternalInput {
    fn encode_size(&self) -> usize {
        self.ciphertext.encode_size() + self.proof.encode_size()
    }
}
