use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use futures::FutureExt;

use super::Core;
use super::ExecResult;
use super::RowCursor;
use super::Session;
use crate::error::Error;
use crate::error::Result;
use crate::value::Value;

/// A session whose statements run inside `BEGIN ... COMMIT/ROLLBACK`.
///
/// Clones share the same transaction. Exactly one of [`commit`](Self::commit)
/// or [`rollback`](Self::rollback) may succeed; afterwards every call fails
/// with [`Error::TxFinished`].
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<dyn Session>,
    state: Arc<TxState>,
}

struct TxState {
    finished: AtomicBool,
}

impl Drop for TxState {
    fn drop(&mut self) {
        if !self.finished.load(Ordering::SeqCst) {
            tracing::warn!("transaction dropped without commit or rollback");
        }
    }
}

impl Transaction {
    pub async fn begin<S: Session + Clone>(session: &S) -> Result<Self> {
        let inner: Arc<dyn Session> = Arc::new(session.clone());
        inner.exec_context("BEGIN", Vec::new()).await?;
        tracing::debug!("transaction started");
        Ok(Self { inner, state: Arc::new(TxState { finished: AtomicBool::new(false) }) })
    }

    pub async fn commit(&self) -> Result<()> {
        self.finish()?;
        self.inner.exec_context("COMMIT", Vec::new()).await?;
        tracing::debug!("transaction committed");
        Ok(())
    }

    pub async fn rollback(&self) -> Result<()> {
        self.finish()?;
        self.inner.exec_context("ROLLBACK", Vec::new()).await?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::SeqCst)
    }

    fn finish(&self) -> Result<()> {
        if self.state.finished.swap(true, Ordering::SeqCst) { Err(Error::TxFinished) } else { Ok(()) }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_finished() { Err(Error::TxFinished) } else { Ok(()) }
    }
}

#[async_trait]
impl Session for Transaction {
    fn core(&self) -> &Arc<Core> {
        self.inner.core()
    }

    async fn query_context(&self, sql: &str, args: Vec<Value>) -> Result<Box<dyn RowCursor>> {
        self.ensure_active()?;
        self.inner.query_context(sql, args).await
    }

    async fn exec_context(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult> {
        self.ensure_active()?;
        self.inner.exec_context(sql, args).await
    }
}

/// Runs `f` inside a transaction.
///
/// The transaction commits when `f` returns `Ok`. When `f` returns `Err` or
/// panics it is rolled back and the error (or [`Error::TxFuncFailed`] for a
/// panic) is returned; if the rollback itself fails the result is
/// [`Error::TxRollbackFailed`]. A failed commit yields [`Error::TxCommitFailed`].
/// A transaction the callback already committed is left as it is.
pub async fn do_tx<S, F, Fut, R>(session: &S, f: F) -> Result<R>
where
    S: Session + Clone,
    F: FnOnce(Transaction) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let tx = Transaction::begin(session).await?;
    let callback_tx = tx.clone();
    let outcome = AssertUnwindSafe(async move { f(callback_tx).await }).catch_unwind().await;

    match outcome {
        Ok(Ok(value)) if tx.is_finished() => Ok(value),
        Ok(Ok(value)) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(e) => Err(Error::TxCommitFailed { source: Box::new(e) }),
        },
        Ok(Err(e)) => rollback_with(&tx, e).await,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!("transaction callback panicked: {}", message);
            rollback_with(&tx, Error::TxFuncFailed { source: Box::new(Error::Unknown(message)) }).await
        }
    }
}

async fn rollback_with<R>(tx: &Transaction, cause: Error) -> Result<R> {
    if tx.is_finished() {
        return Err(cause);
    }
    match tx.rollback().await {
        Ok(()) => Err(cause),
        Err(e) => Err(Error::TxRollbackFailed { source: Box::new(e), cause: Box::new(cause) }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSession;

    fn executed(session: &MockSession) -> Vec<String> {
        session.statements().into_iter().map(|q| q.sql).collect()
    }

    #[tokio::test]
    async fn test_do_tx_commits_on_success() {
        let session = MockSession::new();
        let value = do_tx(&session, |tx| async move {
            tx.exec_context("INSERT INTO `t` VALUES(?);", vec![Value::Integer(1)]).await?;
            Ok(7)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(executed(&session), vec!["BEGIN", "INSERT INTO `t` VALUES(?);", "COMMIT"]);
    }

    #[tokio::test]
    async fn test_do_tx_rolls_back_on_error() {
        let session = MockSession::new();
        let err = do_tx(&session, |_tx| async move { Err::<(), _>(Error::NoRows) }).await.unwrap_err();

        assert!(matches!(err, Error::NoRows));
        assert_eq!(executed(&session), vec!["BEGIN", "ROLLBACK"]);
    }

    #[tokio::test]
    async fn test_do_tx_converts_panic() {
        let session = MockSession::new();
        let err = do_tx(&session, |_tx| async move {
            if true {
                panic!("boom");
            }
            Ok(())
        })
        .await
        .unwrap_err();

        match err {
            Error::TxFuncFailed { source } => assert!(source.to_string().contains("boom")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(executed(&session), vec!["BEGIN", "ROLLBACK"]);
    }

    #[tokio::test]
    async fn test_do_tx_reports_failed_rollback() {
        let session = MockSession::new();
        session.fail_exec("ROLLBACK", "connection lost");

        let err = do_tx(&session, |_tx| async move { Err::<(), _>(Error::NoRows) }).await.unwrap_err();
        match err {
            Error::TxRollbackFailed { source, cause } => {
                assert!(source.to_string().contains("connection lost"));
                assert!(matches!(*cause, Error::NoRows));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_do_tx_reports_failed_commit() {
        let session = MockSession::new();
        session.fail_exec("COMMIT", "disk full");

        let err = do_tx(&session, |_tx| async move { Ok(()) }).await.unwrap_err();
        assert!(matches!(err, Error::TxCommitFailed { .. }));
        assert_eq!(executed(&session), vec!["BEGIN", "COMMIT"]);
    }

    #[tokio::test]
    async fn test_finished_transaction_rejects_work() {
        let session = MockSession::new();
        let tx = Transaction::begin(&session).await.unwrap();
        tx.commit().await.unwrap();

        assert!(matches!(tx.commit().await, Err(Error::TxFinished)));
        assert!(matches!(tx.rollback().await, Err(Error::TxFinished)));
        assert!(matches!(tx.exec_context("DELETE FROM `t`;", Vec::new()).await, Err(Error::TxFinished)));
        assert_eq!(executed(&session), vec!["BEGIN", "COMMIT"]);
    }

    #[tokio::test]
    async fn test_explicit_rollback_inside_callback() {
        let session = MockSession::new();
        let err = do_tx(&session, |tx| async move {
            tx.rollback().await?;
            Err::<(), _>(Error::Unknown("aborted".to_string()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Unknown(_)));
        assert_eq!(executed(&session), vec!["BEGIN", "ROLLBACK"]);
    }
    #[tokio::test]
    async fn test_explicit_commit_inside_callback() {
        let session = MockSession::new();
        let value = do_tx(&session, |tx| async move {
            tx.commit().await?;
            Ok(7)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(executed(&session), vec!["BEGIN", "COMMIT"]);
    }
}
