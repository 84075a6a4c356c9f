use super::*;
use veilhilo_types::ledger::PlainAccount;

impl<'a, S: State> Layer<'a, S> {
    async fn plain_account(&self, public: &PublicKey) -> Result<PlainAccount, ExecutionError> {
        let ledger = self.plain_ledger();
        self.load_ledger_account(&ledger, public).await
    }

    async fn store_plain_account(
        &mut self,
        public: &PublicKey,
        mut account: PlainAccount,
    ) -> Result<(), ExecutionError> {
        let ledger = self.plain_ledger();
        ledger.touch(&mut account, self.now());
        self.store_ledger_account(&ledger, public, account).await
    }

    pub(in crate::layer) async fn handle_plain_deposit(
        &mut self,
        public: &PublicKey,
        payment: u64,
    ) -> Result<Vec<Event>, ExecutionError> {
        let mut account = self.plain_account(public).await?;
        self.plain_ledger().deposit(&mut account, payment)?;
        let balance = account.balance;
        self.store_plain_account(public, account).await?;

        Ok(vec![Event::PlainDeposited {
            player: public.clone(),
            amount: payment,
            balance,
        }])
    }

    pub(in crate::layer) async fn handle_plain_transfer(
        &mut self,
        public: &PublicKey,
        to: &PublicKey,
        amount: u64,
    ) -> Result<Vec<Event>, ExecutionError> {
        if to == public {
            return Err(ExecutionError::SelfTransferNotAllowed);
        }
        let ledger = self.plain_ledger();
        let mut sender = self.plain_account(public).await?;
        if !sender.has_deposited {
            return Err(ExecutionError::NoDepositOnRecord);
        }
        let mut recipient = self.plain_account(to).await?;

        ledger.debit(&mut sender, &Amount::Plain(amount))?;
        ledger.credit(&mut recipient, &Amount::Plain(amount))?;
        recipient.has_deposited = true;

        self.store_plain_account(public, sender).await?;
        self.store_plain_account(to, recipient).await?;

        Ok(vec![Event::PlainTransferred {
            from: public.clone(),
            to: to.clone(),
            amount,
        }])
    }

    pub(in crate::layer) async fn handle_plain_withdraw(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Result<Vec<Event>, ExecutionError> {
        let ledger = self.plain_ledger();
        let mut account = self.plain_account(public).await?;
        ledger.debit(&mut account, &Amount::Plain(amount))?;
        let balance = account.balance;
        self.store_plain_account(public, account).await?;

        Ok(vec![Event::PlainWithdrawn {
            player: public.clone(),
            amount,
            balance,
        }])
    }
}
