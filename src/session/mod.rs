//! The execution seam between statement builders and a database
//!
//! Anything that can run a query and an exec statement is a [`Session`]:
//! a [`Connection`](crate::Connection), a [`Transaction`], or a custom
//! backend. Every session carries a shared [`Core`] holding the model
//! registry, the dialect, the value strategy and the middleware chain.

pub(crate) mod tx;

use std::sync::Arc;

use async_trait::async_trait;
pub use tx::Transaction;

use crate::dialect::Dialect;
use crate::dialect::Sqlite;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::model::Registry;
use crate::valuer::ValueStrategy;
use crate::value::Value;

/// Outcome of an INSERT/UPDATE/DELETE.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected:  u64,
    pub last_insert_id: i64,
}

/// A forward-only cursor over a result set.
#[async_trait]
pub trait RowCursor: Send {
    /// Result column names, in order.
    fn columns(&self) -> &[String];

    async fn next_row(&mut self) -> Result<Option<Vec<Value>>>;
}

#[async_trait]
pub trait Session: Send + Sync + 'static {
    fn core(&self) -> &Arc<Core>;

    async fn query_context(&self, sql: &str, args: Vec<Value>) -> Result<Box<dyn RowCursor>>;

    async fn exec_context(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult>;
}

/// Shared configuration for every statement run through a session.
#[derive(Clone)]
pub struct Core {
    registry:       Arc<Registry>,
    dialect:        Arc<dyn Dialect>,
    value_strategy: ValueStrategy,
    middlewares:    Vec<Middleware>,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            registry:       Arc::new(Registry::new()),
            dialect:        Arc::new(Sqlite),
            value_strategy: ValueStrategy::default(),
            middlewares:    Vec::new(),
        }
    }
}

impl Core {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_value_strategy(mut self, strategy: ValueStrategy) -> Self {
        self.value_strategy = strategy;
        self
    }

    /// Middlewares run in the order they are added: the first one sees the
    /// call first and the result last.
    pub fn with_middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn value_strategy(&self) -> ValueStrategy {
        self.value_strategy
    }

    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("dialect", &self.dialect.name())
            .field("value_strategy", &self.value_strategy)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}
