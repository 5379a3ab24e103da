//! Interceptors wrapped around statement execution
//!
//! A [`Middleware`] receives the next [`Handler`] and returns a new one. The
//! chain is composed so that the first registered middleware is the outermost:
//!
//! ```ignore
//! let timing = middleware(|next: Handler| {
//!     handler(move |ctx| {
//!         let next = next.clone();
//!         async move {
//!             let started = std::time::Instant::now();
//!             let result = next(ctx).await;
//!             tracing::info!(elapsed = ?started.elapsed(), "statement finished");
//!             result
//!         }
//!     })
//! });
//! ```

pub mod query_log;

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::error::Result;
use crate::model::Model;
use crate::query::QueryBuilder;
use crate::query::QueryType;
use crate::session::ExecResult;

/// Everything a middleware may inspect about the statement being run. The
/// statement is not built yet; call `builder.build()` to see its SQL.
#[derive(Clone)]
pub struct QueryContext {
    pub query_type: QueryType,
    pub builder:    Arc<dyn QueryBuilder>,
    pub model:      Arc<Model>,
    pub cancel:     CancellationToken,
}

impl std::fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryContext")
            .field("query_type", &self.query_type)
            .field("table", &self.model.table_name())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// What a handler produced. `One` holds a single entity and `Many` a
/// `Vec` of entities, both boxed as `Any`.
pub enum QueryOutput {
    Exec(ExecResult),
    One(Box<dyn Any + Send>),
    Many(Box<dyn Any + Send>),
}

impl QueryOutput {
    pub fn into_exec(self) -> Result<ExecResult> {
        match self {
            QueryOutput::Exec(result) => Ok(result),
            other => Err(other.mismatch("exec result")),
        }
    }

    pub fn into_one<T: 'static>(self) -> Result<T> {
        match self {
            QueryOutput::One(value) => value.downcast::<T>().map(|v| *v).map_err(|_| Self::wrong_type::<T>()),
            other => Err(other.mismatch("single row")),
        }
    }

    pub fn into_many<T: 'static>(self) -> Result<Vec<T>> {
        match self {
            QueryOutput::Many(values) => {
                values.downcast::<Vec<T>>().map(|v| *v).map_err(|_| Self::wrong_type::<Vec<T>>())
            }
            other => Err(other.mismatch("row list")),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            QueryOutput::Exec(_) => "exec result",
            QueryOutput::One(_) => "single row",
            QueryOutput::Many(_) => "row list",
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::Unknown(format!("handler returned a {} where a {} was expected", self.kind(), expected))
    }

    fn wrong_type<T>() -> Error {
        Error::Unknown(format!("handler returned a value that is not {}", std::any::type_name::<T>()))
    }
}

impl std::fmt::Debug for QueryOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryOutput::Exec(result) => f.debug_tuple("Exec").field(result).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

pub type Handler = Arc<dyn Fn(QueryContext) -> BoxFuture<'static, Result<QueryOutput>> + Send + Sync>;

pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Boxes an async closure into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(QueryContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<QueryOutput>> + Send + 'static,
{
    Arc::new(move |ctx: QueryContext| -> BoxFuture<'static, Result<QueryOutput>> { Box::pin(f(ctx)) })
}

pub fn middleware<F>(f: F) -> Middleware
where F: Fn(Handler) -> Handler + Send + Sync + 'static {
    Arc::new(f)
}

/// Wraps `terminal` so that `middlewares[0]` runs outermost.
pub fn chain(middlewares: &[Middleware], terminal: Handler) -> Handler {
    middlewares.iter().rev().fold(terminal, |next, middleware| middleware(next))
}
