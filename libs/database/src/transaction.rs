//! Unit-of-work helpers
//!
//! [`scoped`] runs a block of writes against a transaction and settles it:
//! commit when the block returns `Ok`, rollback when it returns `Err`. The
//! transaction is consumed either way, so its connection always goes back to
//! the pool.
//!
//! ```ignore
//! let txn = database::transaction::begin(&db).await?;
//! let saved = scoped(txn, |txn| Box::pin(async move {
//!     images::Entity::delete_many().exec(txn).await?;
//!     product.insert(txn).await
//! }))
//! .await?;
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use sea_orm::{DatabaseTransaction, DbErr, TransactionTrait};
use tracing::{debug, warn};

/// A transaction that can be settled exactly once
#[async_trait]
pub trait Transaction: Send + Sync + Sized {
    type Error: std::fmt::Display + Send;

    async fn commit(self) -> Result<(), Self::Error>;

    async fn rollback(self) -> Result<(), Self::Error>;
}

#[async_trait]
impl Transaction for DatabaseTransaction {
    type Error = DbErr;

    async fn commit(self) -> Result<(), DbErr> {
        DatabaseTransaction::commit(self).await
    }

    async fn rollback(self) -> Result<(), DbErr> {
        DatabaseTransaction::rollback(self).await
    }
}

pub async fn begin<C: TransactionTrait<Transaction = DatabaseTransaction>>(db: &C) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    debug!("Transaction started");
    Ok(txn)
}

/// Run `work` inside `txn`, committing on success and rolling back on failure.
///
/// The error of `work` wins over a failed rollback, which is only logged.
pub async fn scoped<T, R, E, F>(txn: T, work: F) -> Result<R, E>
where
    T: Transaction,
    E: From<T::Error>,
    F: for<'a> FnOnce(&'a T) -> BoxFuture<'a, Result<R, E>>,
{
    match work(&txn).await {
        Ok(value) => {
            txn.commit().await?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            match txn.rollback().await {
                Ok(()) => debug!("Transaction rolled back"),
                Err(rollback_err) => warn!(error = %rollback_err, "Transaction rollback failed"),
            }
            Err(err)
        }
    }
}

/// Begin a transaction on `db` and run `work` in it through [`scoped`]
pub async fn with_transaction<C, R, E, F>(db: &C, work: F) -> Result<R, E>
where
    C: TransactionTrait<Transaction = DatabaseTransaction>,
    E: From<DbErr>,
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, Result<R, E>>,
{
    let txn = begin(db).await?;
    scoped(txn, work).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Outcome {
        Committed,
        RolledBack,
    }

    struct RecordingTransaction {
        outcome: Arc<Mutex<Option<Outcome>>>,
        fail_settle: bool,
    }

    impl RecordingTransaction {
        fn new(fail_settle: bool) -> (Self, Arc<Mutex<Option<Outcome>>>) {
            let outcome = Arc::new(Mutex::new(None));
            let txn = Self {
                outcome: outcome.clone(),
                fail_settle,
            };
            (txn, outcome)
        }

        fn settle(self, outcome: Outcome) -> Result<(), String> {
            *self.outcome.lock().unwrap() = Some(outcome);
            if self.fail_settle {
                Err(format!("{outcome:?} failed"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Transaction for RecordingTransaction {
        type Error = String;

        async fn commit(self) -> Result<(), String> {
            self.settle(Outcome::Committed)
        }

        async fn rollback(self) -> Result<(), String> {
            self.settle(Outcome::RolledBack)
        }
    }

    #[tokio::test]
    async fn test_ok_commits() {
        let (txn, outcome) = RecordingTransaction::new(false);

        let result: Result<u32, String> = scoped(txn, |_| Box::pin(async { Ok(7) })).await;

        assert_eq!(result, Ok(7));
        assert_eq!(*outcome.lock().unwrap(), Some(Outcome::Committed));
    }

    #[tokio::test]
    async fn test_err_rolls_back() {
        let (txn, outcome) = RecordingTransaction::new(false);

        let result: Result<u32, String> =
            scoped(txn, |_| Box::pin(async { Err("write failed".to_string()) })).await;

        assert_eq!(result, Err("write failed".to_string()));
        assert_eq!(*outcome.lock().unwrap(), Some(Outcome::RolledBack));
    }

    #[tokio::test]
    async fn test_work_error_wins_over_rollback_error() {
        let (txn, _) = RecordingTransaction::new(true);

        let result: Result<u32, String> =
            scoped(txn, |_| Box::pin(async { Err("write failed".to_string()) })).await;

        assert_eq!(result, Err("write failed".to_string()));
    }

    #[tokio::test]
    async fn test_commit_error_is_returned() {
        let (txn, _) = RecordingTransaction::new(true);

        let result: Result<u32, String> = scoped(txn, |_| Box::pin(async { Ok(7) })).await;

        assert_eq!(result, Err("Committed failed".to_string()));
    }
}
