use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::Query;
use super::QueryBuilder;
use super::QueryType;
use crate::builder::Builder;
use crate::entity::Entity;
use crate::error::Result;
use crate::expr::Predicate;
use crate::session::ExecResult;
use crate::session::Session;
use crate::table::Table;
use crate::table::TableReference;

/// Builds and runs `DELETE` statements for entity `T`. Without a predicate
/// every row of the table is deleted.
pub struct Deleter<T: Entity> {
    session: Arc<dyn Session>,
    table:   Option<Table>,
    wheres:  Vec<Predicate>,
    cancel:  CancellationToken,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Deleter<T> {
    pub fn new<S: Session + Clone>(session: &S) -> Self {
        Self {
            session: Arc::new(session.clone()),
            table:   None,
            wheres:  Vec::new(),
            cancel:  CancellationToken::new(),
            _entity: PhantomData,
        }
    }

    pub fn from(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.wheres.push(predicate);
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
        let ctx = super::context::<T, _>(&session, QueryType::Delete, self, cancel)?;
        super::exec(session, ctx).await
    }
}

impl<T: Entity> QueryBuilder for Deleter<T> {
    fn build(&self) -> Result<Query> {
        let core = self.session.core();
        let model = core.registry().get::<T>()?;
        let table = self.table.clone().map(TableReference::Table);

        let mut builder = Builder::new(core, model);
        builder.write_str("DELETE FROM ");
        builder.build_table(table.as_ref())?;

        if !self.wheres.is_empty() {
            builder.write_str(" WHERE ");
            builder.build_predicates(&self.wheres)?;
        }

        Ok(builder.finish())
    }
}
