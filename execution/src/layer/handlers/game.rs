use super::*;
use crate::draw;
use tracing::info;
use veilhilo_types::game::GameStatus;

impl<'a, S: State> Layer<'a, S> {
    async fn active_game<L: Ledger>(
        &self,
        ledger: &L,
        public: &PublicKey,
        account: &L::Account,
    ) -> Result<Option<GameRecord>, ExecutionError> {
        let Some(id) = ledger.latest_game_id(account) else {
            return Ok(None);
        };
        Ok(self
            .load_game(ledger.variant(), public, id)
            .await?
            .filter(GameRecord::is_active))
    }

    pub(in crate::layer) async fn handle_start_game<L: Ledger>(
        &mut self,
        ledger: &L,
        public: &PublicKey,
        wager: &WagerInput,
    ) -> Result<Vec<Event>, ExecutionError> {
        let mut account = self.load_ledger_account(ledger, public).await?;
        if self.active_game(ledger, public, &account).await?.is_some() {
            return Err(ExecutionError::GameAlreadyActive);
        }
        let wager = ledger.resolve_wager(public, wager)?;
        ledger.ensure_can_wager(&account, &wager)?;

        // Escrow by debit.
        ledger.debit(&mut account, &wager)?;

        let now = self.now();
        let card = draw::first_card(&self.entropy, public);
        let id = ledger.next_game_id(&mut account);
        ledger.touch(&mut account, now);

        let record = GameRecord {
            id,
            player: public.clone(),
            variant: ledger.variant(),
            wager,
            score: ledger.zero(),
            current_card: card,
            status: GameStatus::Active,
            started_at: now,
            secret: draw::commitment(now, public, card),
            guesses: 0,
        };
        self.store_ledger_account(ledger, public, account).await?;
        self.store_game(record).await?;

        info!(
            player = ?public,
            variant = ?ledger.variant(),
            game_id = id,
            card,
            "game started"
        );
        Ok(vec![Event::GameStarted {
            player: public.clone(),
            variant: ledger.variant(),
            game_id: id,
            card,
        }])
    }

    pub(in crate::layer) async fn handle_make_guess<L: Ledger>(
        &mut self,
        ledger: &L,
        public: &PublicKey,
        higher: bool,
    ) -> Result<Vec<Event>, ExecutionError> {
        let mut account = self.load_ledger_account(ledger, public).await?;
        let Some(mut record) = self.active_game(ledger, public, &account).await? else {
            return Err(ExecutionError::NoActiveGame);
        };

        let previous_card = record.current_card;
        let new_card = draw::next_card(&self.entropy, public, &record.secret);
        let correct = draw::is_correct(higher, previous_card, new_card);
        record.guesses = record.guesses.saturating_add(1);

        let winnings = if correct {
            record.score = ledger.increment(&record.score)?;
            record.current_card = new_card;
            let winnings = ledger.winnings(&record.wager)?;
            ledger.credit(&mut account, &winnings)?;
            if let Amount::Encrypted(handle) = winnings {
                acl::grant_owned(self, [handle], public).await?;
            }
            Some(winnings)
        } else {
            record.status = GameStatus::Lost;
            None
        };
        ledger.touch(&mut account, self.now());

        let game_id = record.id;
        self.store_ledger_account(ledger, public, account).await?;
        self.store_game(record).await?;

        info!(
            player = ?public,
            variant = ?ledger.variant(),
            game_id,
            previous_card,
            new_card,
            higher,
            correct,
            "guess resolved"
        );
        Ok(vec![Event::GuessResolved {
            player: public.clone(),
            variant: ledger.variant(),
            game_id,
            previous_card,
            new_card,
            higher,
            correct,
            winnings,
        }])
    }

    pub(in crate::layer) async fn handle_cash_out<L: Ledger>(
        &mut self,
        ledger: &L,
        public: &PublicKey,
    ) -> Result<Vec<Event>, ExecutionError> {
        let mut account = self.load_ledger_account(ledger, public).await?;
        let Some(mut record) = self.active_game(ledger, public, &account).await? else {
            return Err(ExecutionError::NoActiveGame);
        };

        let refund = ledger.cash_out_refund(&record.wager);
        if let Some(refund) = &refund {
            ledger.credit(&mut account, refund)?;
        }
        ledger.touch(&mut account, self.now());
        record.status = GameStatus::CashedOut;

        let game_id = record.id;
        self.store_ledger_account(ledger, public, account).await?;
        self.store_game(record).await?;

        info!(
            player = ?public,
            variant = ?ledger.variant(),
            game_id,
            "cashed out"
        );
        Ok(vec![Event::GameCashedOut {
            player: public.clone(),
            variant: ledger.variant(),
            game_id,
            refund,
        }])
    }
}
