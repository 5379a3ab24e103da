use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::Query;
use super::QueryBuilder;
use super::QueryType;
use crate::entity::Entity;
use crate::error::Result;
use crate::session::ExecResult;
use crate::session::Session;
use crate::value::IntoValue;
use crate::value::Value;

/// A hand-written statement that still runs through the middleware chain and
/// binds its rows onto `T`.
///
/// The SQL is passed to the driver as given, terminator included.
pub struct RawQuerier<T: Entity> {
    session: Arc<dyn Session>,
    sql:     String,
    args:    Vec<Value>,
    cancel:  CancellationToken,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RawQuerier<T> {
    pub fn new<S: Session + Clone>(session: &S, sql: impl Into<String>) -> Self {
        Self {
            session: Arc::new(session.clone()),
            sql:     sql.into(),
            args:    Vec::new(),
            cancel:  CancellationToken::new(),
            _entity: PhantomData,
        }
    }

    pub fn args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        self.args.extend(args.into_iter().map(IntoValue::into_value));
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[tracing::instrument(skip_all)]
    pub async fn exec(self) -> Result<ExecResult> {
        let session = Arc::clone(&self.session);
        let cancel = self.cancel.clone();
        let ctx = super::context::<T, _>(&session, QueryType::Raw, self, cancel)?;
        super::exec(session, ctx).await
    }

    #[tracing::instrument(skip_all)]
    pub async fn get(self) -> Result<T> {
        let session = Arc::clone(&self.session);
        let cancel = self.cancel.clone();
        let ctx = super::context::<T, _>(&session, QueryType::Raw, self, cancel)?;
        super::get::<T>(session, ctx).await
    }

    #[tracing::instrument(skip_all)]
    pub async fn get_multi(self) -> Result<Vec<T>> {
        let session = Arc::clone(&self.session);
        let cancel = self.cancel.clone();
        let ctx = super::context::<T, _>(&session, QueryType::Raw, self, cancel)?;
        super::get_multi::<T>(session, ctx).await
    }
}

impl<T: Entity> QueryBuilder for RawQuerier<T> {
    fn build(&self) -> Result<Query> {
        Ok(Query { sql: self.sql.clone(), args: self.args.clone() })
    }
}
