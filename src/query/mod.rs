pub(crate) mod delete;
pub(crate) mod insert;
pub(crate) mod raw;
pub(crate) mod select;
pub(crate) mod update;

use std::future::Future;
use std::sync::Arc;

pub use delete::Deleter;
pub use insert::Inserter;
pub use insert::OnDuplicateKeyBuilder;
pub use raw::RawQuerier;
pub use select::Order;
pub use select::OrderBy;
pub use select::Selectable;
pub use select::Selector;
pub use select::asc;
pub use select::desc;
use tokio_util::sync::CancellationToken;
pub use update::Updater;

use crate::entity::Entity;
use crate::error::Error;
use crate::error::Result;
use crate::middleware::QueryContext;
use crate::middleware::QueryOutput;
use crate::middleware::chain;
use crate::middleware::handler;
use crate::session::ExecResult;
use crate::session::Session;
use crate::value::Value;

/// A compiled statement: SQL ending in `;` and its arguments in placeholder
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub sql:  String,
    pub args: Vec<Value>,
}

pub trait QueryBuilder: Send + Sync {
    fn build(&self) -> Result<Query>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Raw,
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
            QueryType::Raw => "RAW",
        };
        f.write_str(name)
    }
}

/// Packs a statement for the middleware chain.
pub(crate) fn context<T, B>(
    session: &Arc<dyn Session>,
    query_type: QueryType,
    builder: B,
    cancel: CancellationToken,
) -> Result<QueryContext>
where
    T: Entity,
    B: QueryBuilder + 'static,
{
    let model = session.core().registry().get::<T>()?;
    Ok(QueryContext { query_type, builder: Arc::new(builder), model, cancel })
}

/// Runs a statement expected to produce exactly one row.
pub(crate) async fn get<T: Entity>(session: Arc<dyn Session>, ctx: QueryContext) -> Result<T> {
    let terminal = {
        let session = Arc::clone(&session);
        handler(move |ctx| {
            let session = Arc::clone(&session);
            async move {
                let query_type = ctx.query_type;
                let entity = lifecycle(query_type, fetch_one::<T>(session, ctx).await)?;
                Ok(QueryOutput::One(Box::new(entity)))
            }
        })
    };
    let run = chain(session.core().middlewares(), terminal);
    run(ctx).await?.into_one::<T>()
}

/// Runs a statement and binds every returned row.
pub(crate) async fn get_multi<T: Entity>(session: Arc<dyn Session>, ctx: QueryContext) -> Result<Vec<T>> {
    let terminal = {
        let session = Arc::clone(&session);
        handler(move |ctx| {
            let session = Arc::clone(&session);
            async move {
                let query_type = ctx.query_type;
                let entities = lifecycle(query_type, fetch_all::<T>(session, ctx).await)?;
                Ok(QueryOutput::Many(Box::new(entities)))
            }
        })
    };
    let run = chain(session.core().middlewares(), terminal);
    run(ctx).await?.into_many::<T>()
}

pub(crate) async fn exec(session: Arc<dyn Session>, ctx: QueryContext) -> Result<ExecResult> {
    let terminal = {
        let session = Arc::clone(&session);
        handler(move |ctx| {
            let session = Arc::clone(&session);
            async move {
                let query_type = ctx.query_type;
                let result = lifecycle(query_type, run_exec(session, ctx).await)?;
                Ok(QueryOutput::Exec(result))
            }
        })
    };
    let run = chain(session.core().middlewares(), terminal);
    run(ctx).await?.into_exec()
}

async fn fetch_one<T: Entity>(session: Arc<dyn Session>, ctx: QueryContext) -> Result<T> {
    let query = compile(&ctx)?;
    let mut rows = cancellable(&ctx.cancel, session.query_context(&query.sql, query.args)).await?;
    let values = cancellable(&ctx.cancel, rows.next_row()).await?.ok_or(Error::NoRows)?;

    let valuer = session.core().value_strategy().valuer::<T>(Arc::clone(&ctx.model));
    let mut entity = T::default();
    valuer.set_columns(&mut entity, rows.columns(), values)?;
    Ok(entity)
}

async fn fetch_all<T: Entity>(session: Arc<dyn Session>, ctx: QueryContext) -> Result<Vec<T>> {
    let query = compile(&ctx)?;
    let mut rows = cancellable(&ctx.cancel, session.query_context(&query.sql, query.args)).await?;

    let valuer = session.core().value_strategy().valuer::<T>(Arc::clone(&ctx.model));
    let mut entities = Vec::new();
    while let Some(values) = cancellable(&ctx.cancel, rows.next_row()).await? {
        let mut entity = T::default();
        valuer.set_columns(&mut entity, rows.columns(), values)?;
        entities.push(entity);
    }
    Ok(entities)
}

async fn run_exec(session: Arc<dyn Session>, ctx: QueryContext) -> Result<ExecResult> {
    let query = compile(&ctx)?;
    cancellable(&ctx.cancel, session.exec_context(&query.sql, query.args)).await
}

fn compile(ctx: &QueryContext) -> Result<Query> {
    let query = ctx.builder.build()?;
    tracing::debug!(query_type = %ctx.query_type, sql = %query.sql, args = ?query.args, "executing");
    Ok(query)
}

fn lifecycle<R>(query_type: QueryType, result: Result<R>) -> Result<R> {
    match &result {
        Ok(_) => tracing::trace!(%query_type, "completed"),
        Err(e) => tracing::debug!(%query_type, error = %e, "failed"),
    }
    result
}

async fn cancellable<F, R>(cancel: &CancellationToken, fut: F) -> Result<R>
where F: Future<Output = Result<R>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
