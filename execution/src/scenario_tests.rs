//! Multi-block scenarios driven through `Layer::execute`, committing between blocks.

use crate::{
    mocks::{
        create_account_keypair, create_entropy, losing_guess, winning_guess, MockFhe, Plaintext,
    },
    query,
    state::{nonce, Memory, State},
    Layer,
};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use commonware_runtime::{deterministic::Runner, Runner as _};
use veilhilo_types::{
    config::EngineConfig,
    constants::{
        ERROR_GAME_ALREADY_ACTIVE, ERROR_INSUFFICIENT_BALANCE, ERROR_NO_ACTIVE_GAME,
        ERROR_NO_DEPOSIT, ERROR_SELF_TRANSFER, NATIVE_UNIT,
    },
    execution::{Entropy, Event, Instruction, Output, Transaction, WagerInput},
    fhe::{ExternalInput, Grantee, Handle},
    game::GameStatus,
    ledger::{Amount, LedgerVariant},
};

struct Harness {
    state: Memory,
    fhe: MockFhe,
    config: EngineConfig,
    timestamp: u64,
    sequence: u64,
}

impl Harness {
    fn new() -> Self {
        Self {
            state: Memory::default(),
            fhe: MockFhe::default(),
            config: EngineConfig::default(),
            timestamp: 1_000,
            sequence: 0,
        }
    }

    async fn tx(&self, signer: &PrivateKey, instruction: Instruction) -> Transaction {
        let next = nonce(&self.state, &signer.public_key()).await.unwrap();
        Transaction::sign(signer, next, instruction)
    }

    /// Executes one block under default entropy and commits it.
    async fn run(&mut self, signer: &PrivateKey, instructions: Vec<Instruction>) -> Vec<Event> {
        let entropy = create_entropy(self.timestamp, 0, self.sequence);
        self.run_with(entropy, signer, instructions).await
    }

    async fn run_with(
        &mut self,
        entropy: Entropy,
        signer: &PrivateKey,
        instructions: Vec<Instruction>,
    ) -> Vec<Event> {
        let mut next = nonce(&self.state, &signer.public_key()).await.unwrap();
        let txs: Vec<Transaction> = instructions
            .into_iter()
            .map(|instruction| {
                let tx = Transaction::sign(signer, next, instruction);
                next += 1;
                tx
            })
            .collect();
        let count = txs.len() as u64;

        let (outputs, changes) = {
            let mut layer = Layer::new(
                &self.state,
                &self.fhe,
                &self.fhe,
                self.config.clone(),
                entropy,
            );
            let (outputs, _) = layer.execute(txs).await.unwrap();
            (outputs, layer.commit())
        };
        self.state.apply(changes).await.unwrap();
        self.timestamp += 5;
        self.sequence = entropy.sequence + count;

        outputs
            .into_iter()
            .filter_map(|output| match output {
                Output::Event(event) => Some(event),
                Output::Transaction(_) => None,
            })
            .collect()
    }

    /// Submits a guess that the draw will honour.
    async fn guess_correctly(
        &mut self,
        signer: &PrivateKey,
        player: &PublicKey,
        variant: LedgerVariant,
    ) -> Event {
        let (entropy, higher) =
            winning_guess(&self.state, variant, player, self.timestamp, self.sequence)
                .await
                .unwrap();
        let mut events = self
            .run_with(
                entropy,
                signer,
                vec![Instruction::MakeGuess { variant, higher }],
            )
            .await;
        events.remove(0)
    }

    async fn guess_wrongly(
        &mut self,
        signer: &PrivateKey,
        player: &PublicKey,
        variant: LedgerVariant,
    ) -> Event {
        let (entropy, higher) =
            losing_guess(&self.state, variant, player, self.timestamp, self.sequence)
                .await
                .unwrap();
        let mut events = self
            .run_with(
                entropy,
                signer,
                vec![Instruction::MakeGuess { variant, higher }],
            )
            .await;
        events.remove(0)
    }

    async fn decrypt(&self, handle: &Handle, owner: &PublicKey) -> Plaintext {
        self.fhe
            .decrypt(&self.state, handle, &Grantee::Principal(owner.clone()))
            .await
            .unwrap()
    }
}

fn rejection_code(event: &Event) -> Option<u8> {
    match event {
        Event::Rejected { error_code, .. } => Some(*error_code),
        _ => None,
    }
}

#[test]
fn scenario_a_plain_deposit() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(1);

        let events = h
            .run(
                &signer,
                vec![Instruction::PlainDeposit {
                    payment: NATIVE_UNIT,
                }],
            )
            .await;
        assert_eq!(
            events,
            vec![Event::PlainDeposited {
                player: player.clone(),
                amount: NATIVE_UNIT,
                balance: NATIVE_UNIT,
            }]
        );
        assert_eq!(
            query::plain_balance(&h.state, &player).await.unwrap(),
            NATIVE_UNIT
        );
    });
}

#[test]
fn scenarios_b_c_d_plain_game() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(2);

        // B: deposit 10.0 and wager 1.0.
        let events = h
            .run(
                &signer,
                vec![
                    Instruction::PlainDeposit {
                        payment: 10 * NATIVE_UNIT,
                    },
                    Instruction::StartGame {
                        wager: WagerInput::Plain(NATIVE_UNIT),
                    },
                ],
            )
            .await;
        let Event::GameStarted { card, game_id, .. } = events[1] else {
            panic!("expected game start, got {:?}", events[1]);
        };
        assert_eq!(game_id, 0);
        assert!((1..=13).contains(&card));
        assert_eq!(
            query::plain_balance(&h.state, &player).await.unwrap(),
            9 * NATIVE_UNIT
        );
        let view = query::game(&h.state, LedgerVariant::Plain, &player)
            .await
            .unwrap()
            .unwrap();
        assert!(view.is_active);
        assert_eq!(view.current_card, card);
        assert_eq!(view.wager, Amount::Plain(NATIVE_UNIT));

        // C: three correct guesses at 1.5x.
        for round in 1..=3u64 {
            let event = h
                .guess_correctly(&signer, &player, LedgerVariant::Plain)
                .await;
            let Event::GuessResolved {
                correct, winnings, ..
            } = event
            else {
                panic!("expected a resolved guess, got {event:?}");
            };
            assert!(correct);
            assert_eq!(winnings, Some(Amount::Plain(NATIVE_UNIT * 3 / 2)));
            assert_eq!(
                query::plain_balance(&h.state, &player).await.unwrap(),
                9 * NATIVE_UNIT + round * NATIVE_UNIT * 3 / 2
            );
        }
        let view = query::game(&h.state, LedgerVariant::Plain, &player)
            .await
            .unwrap()
            .unwrap();
        assert!(view.is_active);
        assert_eq!(view.score, Amount::Plain(3));

        // D: cash out refunds the wager and closes the game.
        let events = h
            .run(
                &signer,
                vec![
                    Instruction::CashOut {
                        variant: LedgerVariant::Plain,
                    },
                    Instruction::MakeGuess {
                        variant: LedgerVariant::Plain,
                        higher: true,
                    },
                ],
            )
            .await;
        assert_eq!(
            events[0],
            Event::GameCashedOut {
                player: player.clone(),
                variant: LedgerVariant::Plain,
                game_id: 0,
                refund: Some(Amount::Plain(NATIVE_UNIT)),
            }
        );
        assert_eq!(rejection_code(&events[1]), Some(ERROR_NO_ACTIVE_GAME));
        assert_eq!(
            query::plain_balance(&h.state, &player).await.unwrap(),
            10 * NATIVE_UNIT + 3 * NATIVE_UNIT * 3 / 2
        );
        let record = query::game_at(&h.state, LedgerVariant::Plain, &player, 0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, GameStatus::CashedOut);
        assert_eq!(record.guesses, 3);
    });
}

#[test]
fn scenario_e_start_without_deposit() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(3);
        let wager = h.fhe.encrypt_input(&player, 1);

        let events = h
            .run(
                &signer,
                vec![
                    Instruction::StartGame {
                        wager: WagerInput::Plain(NATIVE_UNIT),
                    },
                    Instruction::StartGame {
                        wager: WagerInput::Encrypted(wager),
                    },
                ],
            )
            .await;
        assert_eq!(rejection_code(&events[0]), Some(ERROR_INSUFFICIENT_BALANCE));
        assert_eq!(rejection_code(&events[1]), Some(ERROR_NO_DEPOSIT));
        assert!(query::game(&h.state, LedgerVariant::Plain, &player)
            .await
            .unwrap()
            .is_none());
        assert!(query::confidential_account(&h.state, &player)
            .await
            .unwrap()
            .is_none());
    });
}

#[test]
fn confidential_wager_above_balance_wraps() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(4);
        let deposit = h.fhe.encrypt_input(&player, 5);
        let wager = h.fhe.encrypt_input(&player, 10);

        let events = h
            .run(
                &signer,
                vec![
                    Instruction::DepositEncrypted {
                        payment: 1,
                        amount: deposit,
                    },
                    Instruction::StartGame {
                        wager: WagerInput::Encrypted(wager),
                    },
                ],
            )
            .await;
        assert!(matches!(events[1], Event::GameStarted { .. }));

        let balance = query::encrypted_balance(&h.state, &player)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            h.decrypt(&balance, &player).await,
            Plaintext::Uint32(u32::MAX - 4)
        );
    });
}

#[test]
fn losing_guess_settles_and_allows_new_game() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(5);

        h.run(
            &signer,
            vec![
                Instruction::PlainDeposit { payment: 100 },
                Instruction::StartGame {
                    wager: WagerInput::Plain(40),
                },
            ],
        )
        .await;

        let event = h.guess_wrongly(&signer, &player, LedgerVariant::Plain).await;
        assert!(matches!(
            event,
            Event::GuessResolved {
                correct: false,
                winnings: None,
                ..
            }
        ));
        assert_eq!(query::plain_balance(&h.state, &player).await.unwrap(), 60);
        let lost = query::game_at(&h.state, LedgerVariant::Plain, &player, 0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(lost.status, GameStatus::Lost);

        let events = h
            .run(
                &signer,
                vec![
                    Instruction::CashOut {
                        variant: LedgerVariant::Plain,
                    },
                    Instruction::StartGame {
                        wager: WagerInput::Plain(10),
                    },
                    Instruction::StartGame {
                        wager: WagerInput::Plain(10),
                    },
                ],
            )
            .await;
        assert_eq!(rejection_code(&events[0]), Some(ERROR_NO_ACTIVE_GAME));
        assert!(matches!(events[1], Event::GameStarted { game_id: 1, .. }));
        assert_eq!(rejection_code(&events[2]), Some(ERROR_GAME_ALREADY_ACTIVE));

        // History is kept.
        assert_eq!(
            query::game_at(&h.state, LedgerVariant::Plain, &player, 0)
                .await
                .unwrap()
                .unwrap()
                .status,
            GameStatus::Lost
        );
        assert_eq!(query::plain_balance(&h.state, &player).await.unwrap(), 50);
    });
}

#[test]
fn confidential_cash_out_only_deactivates() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(6);
        let deposit = h.fhe.encrypt_input(&player, 50);
        let wager = h.fhe.encrypt_input(&player, 5);

        h.run(
            &signer,
            vec![
                Instruction::DepositEncrypted {
                    payment: 1,
                    amount: deposit,
                },
                Instruction::StartGame {
                    wager: WagerInput::Encrypted(wager),
                },
            ],
        )
        .await;
        let event = h
            .guess_correctly(&signer, &player, LedgerVariant::Confidential)
            .await;
        assert!(matches!(event, Event::GuessResolved { correct: true, .. }));

        let events = h
            .run(
                &signer,
                vec![Instruction::CashOut {
                    variant: LedgerVariant::Confidential,
                }],
            )
            .await;
        assert!(matches!(
            events[0],
            Event::GameCashedOut { refund: None, .. }
        ));

        // 50 - 5 + 2 * 5
        let balance = query::encrypted_balance(&h.state, &player)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(h.decrypt(&balance, &player).await, Plaintext::Uint32(55));

        let record = query::game_at(&h.state, LedgerVariant::Confidential, &player, 0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.status, GameStatus::CashedOut);
        let Amount::Encrypted(score) = record.score else {
            panic!("expected encrypted score");
        };
        assert_eq!(h.decrypt(&score, &player).await, Plaintext::Uint32(1));
    });
}

#[test]
fn self_transfer_always_fails() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(7);
        let deposit = h.fhe.encrypt_input(&player, 10);

        let mut instructions = vec![Instruction::DepositEncrypted {
            payment: 1,
            amount: deposit,
        }];
        for amount in [0, 1, 10, u32::MAX] {
            instructions.push(Instruction::TransferEncrypted {
                to: player.clone(),
                amount: h.fhe.encrypt_input(&player, amount),
            });
        }
        // Even a forged proof is rejected as a self transfer first.
        instructions.push(Instruction::TransferEncrypted {
            to: player.clone(),
            amount: ExternalInput {
                ciphertext: vec![0xff],
                proof: vec![],
            },
        });

        let events = h.run(&signer, instructions).await;
        for event in &events[1..] {
            assert_eq!(rejection_code(event), Some(ERROR_SELF_TRANSFER));
        }
        let balance = query::encrypted_balance(&h.state, &player)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(h.decrypt(&balance, &player).await, Plaintext::Uint32(10));
    });
}

#[test]
fn reset_restores_defaults() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(8);
        let deposit = h.fhe.encrypt_input(&player, 30);

        h.run(
            &signer,
            vec![
                Instruction::DepositEncrypted {
                    payment: 1,
                    amount: deposit,
                },
                Instruction::SetFlag { value: true },
                Instruction::IncrementScore,
                Instruction::ResetAccount,
            ],
        )
        .await;

        let account = query::confidential_account(&h.state, &player)
            .await
            .unwrap()
            .unwrap();
        assert!(!account.has_deposited);
        assert_eq!(h.decrypt(&account.balance, &player).await, Plaintext::Uint32(0));
        assert_eq!(h.decrypt(&account.score, &player).await, Plaintext::Uint32(0));
        assert_eq!(h.decrypt(&account.flag, &player).await, Plaintext::Bool(false));
        assert!(!query::has_deposited(&h.state, &player).await.unwrap());

        // Deposit-gated operations are closed again.
        let events = h.run(&signer, vec![Instruction::IncrementScore]).await;
        assert_eq!(rejection_code(&events[0]), Some(ERROR_NO_DEPOSIT));
    });
}

#[test]
fn grant_all_permissions_is_idempotent() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(9);

        h.run(&signer, vec![Instruction::GrantAllPermissions]).await;
        let after_first = h.state.len();
        let account = query::confidential_account(&h.state, &player)
            .await
            .unwrap()
            .unwrap();

        h.run(&signer, vec![Instruction::GrantAllPermissions]).await;
        assert_eq!(h.state.len(), after_first);
        assert_eq!(
            query::confidential_account(&h.state, &player)
                .await
                .unwrap()
                .unwrap(),
            account
        );
        for handle in account.handles() {
            assert!(h
                .fhe
                .decrypt(&h.state, &handle, &Grantee::Engine)
                .await
                .is_ok());
        }
    });
}

#[test]
fn stale_handles_keep_their_grants() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(10);
        let first = h.fhe.encrypt_input(&player, 3);
        let second = h.fhe.encrypt_input(&player, 4);

        h.run(
            &signer,
            vec![Instruction::DepositEncrypted {
                payment: 1,
                amount: first,
            }],
        )
        .await;
        let old = query::encrypted_balance(&h.state, &player)
            .await
            .unwrap()
            .unwrap();
        h.run(
            &signer,
            vec![Instruction::DepositEncrypted {
                payment: 1,
                amount: second,
            }],
        )
        .await;
        let new = query::encrypted_balance(&h.state, &player)
            .await
            .unwrap()
            .unwrap();

        assert_ne!(old, new);
        assert_eq!(h.decrypt(&old, &player).await, Plaintext::Uint32(3));
        assert_eq!(h.decrypt(&new, &player).await, Plaintext::Uint32(7));
    });
}

#[test]
fn ordered_debits_settle_serially() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (alice_key, alice) = create_account_keypair(11);
        let (_, bob) = create_account_keypair(12);

        let events = h
            .run(
                &alice_key,
                vec![
                    Instruction::PlainDeposit { payment: 100 },
                    Instruction::PlainWithdraw { amount: 70 },
                    Instruction::PlainTransfer {
                        to: bob.clone(),
                        amount: 70,
                    },
                    Instruction::PlainTransfer {
                        to: bob.clone(),
                        amount: 30,
                    },
                ],
            )
            .await;
        assert!(matches!(events[1], Event::PlainWithdrawn { balance: 30, .. }));
        assert_eq!(rejection_code(&events[2]), Some(ERROR_INSUFFICIENT_BALANCE));
        assert!(matches!(events[3], Event::PlainTransferred { amount: 30, .. }));

        assert_eq!(query::plain_balance(&h.state, &alice).await.unwrap(), 0);
        assert_eq!(query::plain_balance(&h.state, &bob).await.unwrap(), 30);
    });
}

#[test]
fn activity_tracks_block_time() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let mut h = Harness::new();
        let (signer, player) = create_account_keypair(13);
        let window = h.config.activity_window_secs;

        let started = h.timestamp;
        h.run(&signer, vec![Instruction::SetFlag { value: false }])
            .await;
        assert_eq!(
            query::last_activity(&h.state, &player).await.unwrap(),
            started
        );
        assert!(query::is_active(&h.state, &player, started + window - 1, window)
            .await
            .unwrap());
        assert!(!query::is_active(&h.state, &player, started + window, window)
            .await
            .unwrap());
    });
}

#[test]
fn replayed_transaction_is_dropped() {
    let executor = Runner::default();
    executor.start(|_| async move {
        let h = Harness::new();
        let (signer, player) = create_account_keypair(14);
        let tx = h
            .tx(&signer, Instruction::PlainDeposit { payment: 5 })
            .await;

        let mut layer = Layer::new(
            &h.state,
            &h.fhe,
            &h.fhe,
            h.config.clone(),
            create_entropy(h.timestamp, 0, 0),
        );
        let (outputs, nonces) = layer.execute(vec![tx.clone(), tx]).await.unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(nonces.get(&player), Some(&1));
        assert_eq!(query::plain_balance(&layer, &player).await.unwrap(), 5);
    });
}
