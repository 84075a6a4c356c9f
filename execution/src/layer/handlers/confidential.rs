use super::*;
use veilhilo_types::{fhe::ExternalInput, ledger::ConfidentialAccount};

impl<'a, S: State> Layer<'a, S> {
    async fn confidential_account(
        &self,
        public: &PublicKey,
    ) -> Result<ConfidentialAccount, ExecutionError> {
        let ledger = self.confidential_ledger();
        self.load_ledger_account(&ledger, public).await
    }

    async fn store_confidential_account(
        &mut self,
        public: &PublicKey,
        mut account: ConfidentialAccount,
    ) -> Result<(), ExecutionError> {
        let ledger = self.confidential_ledger();
        ledger.touch(&mut account, self.now());
        self.store_ledger_account(&ledger, public, account).await
    }

    pub(in crate::layer) async fn handle_deposit_encrypted(
        &mut self,
        public: &PublicKey,
        payment: u64,
        amount: &ExternalInput,
    ) -> Result<Vec<Event>, ExecutionError> {
        if payment == 0 {
            return Err(ExecutionError::ZeroValueDeposit);
        }
        let ledger = self.confidential_ledger();
        let amount = ledger.from_external(public, amount)?;

        let mut account = self.confidential_account(public).await?;
        account.balance = self.coprocessor.add(&account.balance, &amount)?;
        account.has_deposited = true;
        let balance = account.balance;
        self.store_confidential_account(public, account).await?;

        Ok(vec![Event::ConfidentialDeposited {
            player: public.clone(),
            payment,
            balance,
        }])
    }

    pub(in crate::layer) async fn handle_deposit_plain_converted(
        &mut self,
        public: &PublicKey,
        payment: u64,
    ) -> Result<Vec<Event>, ExecutionError> {
        if payment == 0 {
            return Err(ExecutionError::ZeroValueDeposit);
        }
        // Payments below one divisor would credit nothing.
        let units = payment / self.config.payment_divisor;
        let units = match u32::try_from(units) {
            Ok(units) if units > 0 => units,
            _ => return Err(ExecutionError::DepositOutOfRange { units }),
        };

        let mut account = self.confidential_account(public).await?;
        let amount = self.coprocessor.encrypt(units);
        account.balance = self.coprocessor.add(&account.balance, &amount)?;
        account.has_deposited = true;
        let balance = account.balance;
        self.store_confidential_account(public, account).await?;

        Ok(vec![Event::ConfidentialDeposited {
            player: public.clone(),
            payment,
            balance,
        }])
    }

    pub(in crate::layer) async fn handle_transfer_encrypted(
        &mut self,
        public: &PublicKey,
        to: &PublicKey,
        amount: &ExternalInput,
    ) -> Result<Vec<Event>, ExecutionError> {
        if to == public {
            return Err(ExecutionError::SelfTransferNotAllowed);
        }
        let mut sender = self.confidential_account(public).await?;
        if !sender.has_deposited {
            return Err(ExecutionError::NoDepositOnRecord);
        }
        let ledger = self.confidential_ledger();
        let amount = ledger.from_external(public, amount)?;
        let mut recipient = self.confidential_account(to).await?;

        // No balance check is possible here; an oversized amount wraps the sender's balance.
        sender.balance = self.coprocessor.sub(&sender.balance, &amount)?;
        recipient.balance = self.coprocessor.add(&recipient.balance, &amount)?;
        recipient.has_deposited = true;

        let from_balance = sender.balance;
        let to_balance = recipient.balance;
        self.store_confidential_account(public, sender).await?;
        self.store_confidential_account(to, recipient).await?;

        Ok(vec![Event::ConfidentialTransferred {
            from: public.clone(),
            to: to.clone(),
            from_balance,
            to_balance,
        }])
    }

    pub(in crate::layer) async fn handle_perform_arithmetic(
        &mut self,
        public: &PublicKey,
        a: &ExternalInput,
        b: &ExternalInput,
    ) -> Result<Vec<Event>, ExecutionError> {
        let ledger = self.confidential_ledger();
        let a = ledger.from_external(public, a)?;
        let b = ledger.from_external(public, b)?;

        let sum = self.coprocessor.add(&a, &b)?;
        let difference = self.coprocessor.sub(&a, &b)?;
        let product = self.coprocessor.mul(&a, &b)?;
        let partial = self.coprocessor.add(&sum, &difference)?;
        let score = self.coprocessor.add(&partial, &product)?;

        let mut account = self.confidential_account(public).await?;
        account.score = score;
        self.store_confidential_account(public, account).await?;

        Ok(vec![Event::ArithmeticPerformed {
            player: public.clone(),
            score,
        }])
    }

    pub(in crate::layer) async fn handle_set_flag(
        &mut self,
        public: &PublicKey,
        value: bool,
    ) -> Result<Vec<Event>, ExecutionError> {
        let mut account = self.confidential_account(public).await?;
        account.flag = self.coprocessor.encrypt_bool(value);
        let flag = account.flag;
        self.store_confidential_account(public, account).await?;

        Ok(vec![Event::FlagSet {
            player: public.clone(),
            flag,
        }])
    }

    pub(in crate::layer) async fn handle_increment_score(
        &mut self,
        public: &PublicKey,
    ) -> Result<Vec<Event>, ExecutionError> {
        let mut account = self.confidential_account(public).await?;
        if !account.has_deposited {
            return Err(ExecutionError::NoDepositOnRecord);
        }
        let one = self.coprocessor.encrypt(1);
        account.score = self.coprocessor.add(&account.score, &one)?;
        let score = account.score;
        self.store_confidential_account(public, account).await?;

        Ok(vec![Event::ScoreIncremented {
            player: public.clone(),
            score,
        }])
    }

    pub(in crate::layer) async fn handle_grant_all_permissions(
        &mut self,
        public: &PublicKey,
    ) -> Result<Vec<Event>, ExecutionError> {
        let ledger = self.confidential_ledger();
        let account = self.confidential_account(public).await?;
        // Grants are re-asserted without touching activity.
        self.store_ledger_account(&ledger, public, account).await?;

        Ok(vec![Event::PermissionsGranted {
            player: public.clone(),
        }])
    }

    pub(in crate::layer) async fn handle_reset_account(
        &mut self,
        public: &PublicKey,
    ) -> Result<Vec<Event>, ExecutionError> {
        let ledger = self.confidential_ledger();
        let previous = self.confidential_account(public).await?;
        let mut account = ledger.default_account();
        // Game ids keep counting so history is never overwritten.
        account.games_started = previous.games_started;
        self.store_confidential_account(public, account).await?;

        Ok(vec![Event::AccountReset {
            player: public.clone(),
        }])
    }
}
