use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::Query;
use super::QueryBuilder;
use super::QueryType;
use crate::builder::Builder;
use crate::entity::Entity;
use crate::error::Error;
use crate::error::Result;
use crate::expr::Assignable;
use crate::expr::Expression;
use crate::expr::Predicate;
use crate::session::ExecResult;
use crate::session::Session;
use crate::table::Table;
use crate::table::TableReference;

/// Builds and runs `UPDATE` statements for entity `T`.
///
/// Bare columns in [`set`](Self::set) take their value from the entity passed
/// to [`update`](Self::update); assignments carry their own expression.
pub struct Updater<T: Entity> {
    session: Arc<dyn Session>,
    value:   T,
    assigns: Vec<Assignable>,
    wheres:  Vec<Predicate>,
    table:   Option<Table>,
    cancel:  CancellationToken,
}

impl<T: Entity> Updater<T> {
    pub fn new<S: Session + Clone>(session: &S) -> Self {
        Self {
            session: Arc::new(session.clone()),
            value:   T::default(),
            assigns: Vec::new(),
            wheres:  Vec::new(),
            table:   None,
            cancel:  CancellationToken::new(),
        }
    }

    pub fn update(mut self, value: T) -> Self {
        self.value = value;
        self
    }

    pub fn set<I, A>(mut self, assigns: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Assignable>,
    {
        self.assigns.extend(assigns.into_iter().map(Into::into));
        self
    }

    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.wheres.push(predicate);
        self
    }

    /// Updates through an explicit (usually aliased) table reference.
    pub fn table(mut self, table: Table) -> Self {
        self.table = Some(table);
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
        let ctx = super::context::<T, _>(&session, QueryType::Update, self, cancel)?;
        super::exec(session, ctx).await
    }
}

impl<T: Entity> QueryBuilder for Updater<T> {
    fn build(&self) -> Result<Query> {
        if self.assigns.is_empty() {
            return Err(Error::NoUpdatedColumns);
        }

        let core = self.session.core();
        let model = core.registry().get::<T>()?;
        let valuer = core.value_strategy().valuer::<T>(Arc::clone(&model));
        let table = self.table.clone().map(TableReference::Table);

        let mut builder = Builder::new(core, model);
        builder.write_str("UPDATE ");
        builder.build_table(table.as_ref())?;
        builder.write_str(" SET ");

        for (i, assign) in self.assigns.iter().enumerate() {
            if i > 0 {
                builder.write_char(',');
            }
            match assign {
                Assignable::Column(column) => {
                    let name = builder.column_name(&column.name)?;
                    builder.quote(&name);
                    builder.write_str("=?");
                    builder.add_arg(valuer.field(&self.value, &column.name)?);
                }
                Assignable::Assignment(assignment) => {
                    let name = builder.column_name(&assignment.column)?;
                    builder.quote(&name);
                    builder.write_char('=');
                    builder.build_expression(&assignment.value)?;
                }
                Assignable::Raw(raw) => builder.build_expression(&Expression::Raw(raw.clone()))?,
            }
        }

        if !self.wheres.is_empty() {
            builder.write_str(" WHERE ");
            builder.build_predicates(&self.wheres)?;
        }

        Ok(builder.finish())
    }
}
