pub(crate) mod builder;
pub(crate) mod database;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use self::builder::ConnectionInfo;
use crate::error::Result;
use crate::session::Core;
use crate::session::ExecResult;
use crate::session::RowCursor;
use crate::session::Session;
use crate::session::Transaction;
use crate::session::tx;
use crate::value::Value;

pub mod prelude {
    pub use super::Connection;
    pub use super::builder::Builder;
    pub use super::database::Database;
}

/// A turso connection plus the ORM configuration it was opened with.
#[derive(Clone)]
pub struct Connection {
    inner: turso::Connection,
    info:  ConnectionInfo,
    core:  Arc<Core>,
}

impl Connection {
    fn new(inner: turso::Connection, info: ConnectionInfo, core: Arc<Core>) -> Self {
        Self { inner, info, core }
    }

    /// Starts a transaction with `BEGIN`. The returned [`Transaction`] is a
    /// [`Session`] of its own; pass it to statement builders.
    pub async fn begin(&self) -> Result<Transaction> {
        Transaction::begin(self).await
    }

    /// Runs `f` in a transaction, committing on `Ok` and rolling back on
    /// `Err` or panic.
    pub async fn do_tx<F, Fut, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(Transaction) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        tx::do_tx(self, f).await
    }

    pub fn is_mvcc_enabled(&self) -> bool {
        self.info.mvcc
    }

    pub fn is_encryption_enabled(&self) -> bool {
        self.info.encryption
    }

    pub fn path(&self) -> &str {
        self.info.path.as_str()
    }

    pub async fn query(&self, sql: &str, params: impl turso::IntoParams) -> Result<turso::Rows> {
        Ok(self.inner.query(sql, params).await?)
    }

    pub async fn execute(&self, sql: &str, params: impl turso::IntoParams) -> Result<u64> {
        Ok(self.inner.execute(sql, params).await?)
    }

    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        Ok(self.inner.execute_batch(sql).await?)
    }

    pub async fn prepare(&self, sql: &str) -> Result<turso::Statement> {
        Ok(self.inner.prepare(sql).await?)
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.inner.last_insert_rowid()
    }

    pub fn is_autocommit(&self) -> Result<bool> {
        Ok(self.inner.is_autocommit()?)
    }

    pub fn busy_timeout(&self, duration: std::time::Duration) -> Result<()> {
        Ok(self.inner.busy_timeout(duration)?)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("path", &self.info.path).field("core", &self.core).finish()
    }
}

struct TursoRows {
    columns: Vec<String>,
    rows:    turso::Rows,
}

#[async_trait]
impl RowCursor for TursoRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(row) = self.rows.next().await? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(row.column_count());
        for i in 0..row.column_count() {
            values.push(row.get_value(i)?);
        }
        Ok(Some(values))
    }
}

#[async_trait]
impl Session for Connection {
    fn core(&self) -> &Arc<Core> {
        &self.core
    }

    async fn query_context(&self, sql: &str, args: Vec<Value>) -> Result<Box<dyn RowCursor>> {
        let mut stmt = self.inner.prepare(sql).await?;
        let columns = stmt.columns().iter().map(|column| column.name().to_string()).collect();
        let rows = stmt.query(args).await?;
        Ok(Box::new(TursoRows { columns, rows }))
    }

    async fn exec_context(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult> {
        let rows_affected = self.inner.execute(sql, args).await?;
        Ok(ExecResult { rows_affected, last_insert_id: self.inner.last_insert_rowid() })
    }
}
