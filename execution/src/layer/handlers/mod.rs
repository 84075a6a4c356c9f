use super::*;
use crate::{acl, ledger::Ledger};
use veilhilo_types::{fhe::Handle, game::GameRecord, ledger::Amount};

mod confidential;
mod game;
mod plain;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn load_ledger_account<L: Ledger>(
        &self,
        ledger: &L,
        public: &PublicKey,
    ) -> Result<L::Account, ExecutionError> {
        Ok(
            match self.get(&ledger.account_key(public)).await? {
                Some(value) => ledger.decode_account(value),
                None => None,
            }
            .unwrap_or_else(|| ledger.new_account()),
        )
    }

    /// Stores the account and grants the engine and the owner on its current handles.
    pub(in crate::layer) async fn store_ledger_account<L: Ledger>(
        &mut self,
        ledger: &L,
        public: &PublicKey,
        account: L::Account,
    ) -> Result<(), ExecutionError> {
        let handles = ledger.decryptable_handles(&account);
        acl::grant_owned(self, handles, public).await?;
        self.insert(ledger.account_key(public), ledger.encode_account(account))
            .await?;
        Ok(())
    }

    pub(in crate::layer) async fn load_game(
        &self,
        variant: LedgerVariant,
        player: &PublicKey,
        id: u64,
    ) -> Result<Option<GameRecord>, ExecutionError> {
        let key = Key::Game {
            variant,
            player: player.clone(),
            id,
        };
        Ok(match self.get(&key).await? {
            Some(Value::Game(record)) => Some(record),
            _ => None,
        })
    }

    pub(in crate::layer) async fn store_game(
        &mut self,
        record: GameRecord,
    ) -> Result<(), ExecutionError> {
        let handles: Vec<Handle> = [record.wager, record.score]
            .into_iter()
            .filter_map(|amount| match amount {
                Amount::Encrypted(handle) => Some(handle),
                Amount::Plain(_) => None,
            })
            .collect();
        acl::grant_owned(self, handles, &record.player).await?;

        let key = Key::Game {
            variant: record.variant,
            player: record.player.clone(),
            id: record.id,
        };
        self.insert(key, Value::Game(record)).await?;
        Ok(())
    }
}
