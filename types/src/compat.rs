#![cfg(test)]
use crate::execution::{Entropy, Event, Instruction, Key, Transaction, WagerInput};
use crate::fhe::ExternalInput;
use crate::ledger::LedgerVariant;
use commonware_codec::{DecodeExt, Encode};
use commonware_cryptography::{ed25519::PrivateKey, sha256::Sha256, Hasher, Signer};

#[test]
fn instruction_encoding_is_stable() {
    assert_eq!(Instruction::SetFlag { value: true }.encode().as_ref(), &[14u8, 1]);
    assert_eq!(Instruction::IncrementScore.encode().as_ref(), &[15u8]);
    assert_eq!(Instruction::GrantAllPermissions.encode().as_ref(), &[16u8]);
    assert_eq!(Instruction::ResetAccount.encode().as_ref(), &[17u8]);
    assert_eq!(
        Instruction::PlainDeposit { payment: 100 }.encode().as_ref(),
        &[20u8, 0, 0, 0, 0, 0, 0, 0, 100]
    );
    assert_eq!(
        Instruction::MakeGuess {
            variant: LedgerVariant::Plain,
            higher: true
        }
        .encode()
        .as_ref(),
        &[31u8, 1, 1]
    );
    assert_eq!(
        Instruction::CashOut {
            variant: LedgerVariant::Confidential
        }
        .encode()
        .as_ref(),
        &[32u8, 0]
    );
    assert_eq!(
        Instruction::StartGame {
            wager: WagerInput::Plain(7)
        }
        .encode()
        .as_ref(),
        &[30u8, 1, 0, 0, 0, 0, 0, 0, 0, 7]
    );
}

#[test]
fn external_input_uses_length_prefixes() {
    let instruction = Instruction::DepositEncrypted {
        payment: 1,
        amount: ExternalInput {
            ciphertext: vec![0xaa, 0xbb],
            proof: vec![0xcc],
        },
    };
    // Lengths are varint-prefixed.
    assert_eq!(
        instruction.encode().as_ref(),
        &[10u8, 0, 0, 0, 0, 0, 0, 0, 1, 2, 0xaa, 0xbb, 1, 0xcc]
    );
}

#[test]
fn oversized_ciphertext_is_rejected() {
    let mut bytes = vec![10u8, 0, 0, 0, 0, 0, 0, 0, 1];
    // varint(2048)
    bytes.extend_from_slice(&[0x80, 0x10]);
    bytes.extend(std::iter::repeat(0u8).take(2048));
    bytes.push(0);
    assert!(Instruction::decode(bytes.as_slice()).is_err());
}

#[test]
fn unknown_instruction_tag_is_rejected() {
    assert!(Instruction::decode([99u8].as_slice()).is_err());
}

#[test]
fn transaction_signature_binds_payload() {
    let private = PrivateKey::from_seed(1);
    let tx = Transaction::sign(&private, 0, Instruction::PlainDeposit { payment: 100 });
    assert!(tx.verify());

    let decoded = Transaction::decode(tx.encode()).expect("decode");
    assert_eq!(decoded, tx);
    assert!(decoded.verify());

    let mut tampered = tx.clone();
    tampered.nonce = 1;
    assert!(!tampered.verify());

    let mut tampered = tx;
    tampered.instruction = Instruction::PlainDeposit { payment: 101 };
    assert!(!tampered.verify());
}

#[test]
fn key_encoding_is_stable() {
    let public = PrivateKey::from_seed(3).public_key();
    let encoded = Key::PlainAccount(public.clone()).encode();
    assert_eq!(encoded[0], 11);
    assert_eq!(&encoded[1..], public.as_ref());

    let game = Key::Game {
        variant: LedgerVariant::Confidential,
        player: public,
        id: 2,
    }
    .encode();
    assert_eq!(game[0], 13);
    assert_eq!(game[1], 0);
    assert_eq!(&game[game.len() - 8..], &[0, 0, 0, 0, 0, 0, 0, 2]);
}

#[test]
fn rejected_event_roundtrips() {
    let event = Event::Rejected {
        player: PrivateKey::from_seed(2).public_key(),
        error_code: 4,
        message: "insufficient balance".to_string(),
    };
    let decoded = Event::decode(event.encode()).expect("decode");
    assert_eq!(decoded, event);
}

#[test]
fn transaction_entropy_advances_sequence() {
    let entropy = Entropy::new(1_000, Sha256::hash(b"block"), 10);
    let first = entropy.for_transaction(0);
    let second = entropy.for_transaction(1);
    assert_eq!(first.sequence, 10);
    assert_eq!(second.sequence, 11);
    assert_eq!(first.timestamp, 1_000);
    assert_ne!(first.seed, second.seed);
    assert_eq!(first, entropy.for_transaction(0));
}
