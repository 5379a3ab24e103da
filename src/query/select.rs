use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::Query;
use super::QueryBuilder;
use super::QueryType;
use crate::builder::Builder;
use crate::entity::Entity;
use crate::error::Result;
use crate::expr::Aggregate;
use crate::expr::Column;
use crate::expr::Predicate;
use crate::expr::RawExpr;
use crate::expr::Subquery;
use crate::model::Registry;
use crate::session::Session;
use crate::table::TableReference;
use crate::value::Value;

/// One item of a SELECT list.
#[derive(Clone, Debug)]
pub enum Selectable {
    Column(Column),
    Aggregate(Aggregate),
    Raw(RawExpr),
}

impl From<Column> for Selectable {
    fn from(column: Column) -> Self {
        Selectable::Column(column)
    }
}

impl From<Aggregate> for Selectable {
    fn from(aggregate: Aggregate) -> Self {
        Selectable::Aggregate(aggregate)
    }
}

impl From<RawExpr> for Selectable {
    fn from(raw: RawExpr) -> Self {
        Selectable::Raw(raw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Asc => write!(f, "ASC"),
            Order::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrderBy {
    pub(crate) field: String,
    pub(crate) order: Order,
}

pub fn asc(field: impl Into<String>) -> OrderBy {
    OrderBy { field: field.into(), order: Order::Asc }
}

pub fn desc(field: impl Into<String>) -> OrderBy {
    OrderBy { field: field.into(), order: Order::Desc }
}

/// Builds and runs `SELECT` statements for entity `T`.
///
/// ```ignore
/// let adults = Selector::<User>::new(&conn)
///     .where_(c("age").gt(18))
///     .order_by(desc("age"))
///     .limit(10)
///     .get_multi()
///     .await?;
/// ```
pub struct Selector<T: Entity> {
    session:  Arc<dyn Session>,
    columns:  Vec<Selectable>,
    table:    Option<TableReference>,
    wheres:   Vec<Predicate>,
    group_by: Vec<String>,
    having:   Vec<Predicate>,
    order_by: Vec<OrderBy>,
    limit:    u64,
    offset:   u64,
    cancel:   CancellationToken,
    _entity:  PhantomData<fn() -> T>,
}

impl<T: Entity> Selector<T> {
    pub fn new<S: Session + Clone>(session: &S) -> Self {
        Self {
            session:  Arc::new(session.clone()),
            columns:  Vec::new(),
            table:    None,
            wheres:   Vec::new(),
            group_by: Vec::new(),
            having:   Vec::new(),
            order_by: Vec::new(),
            limit:    0,
            offset:   0,
            cancel:   CancellationToken::new(),
            _entity:  PhantomData,
        }
    }

    /// Replaces the SELECT list. An empty list selects `*`.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Selectable>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Selects from a table, join or subquery instead of `T`'s own table.
    pub fn from(mut self, table: impl Into<TableReference>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Adds a WHERE predicate; repeated calls are combined with AND.
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.wheres.push(predicate);
        self
    }

    pub fn group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having.push(predicate);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Zero means no limit. Values above `i64::MAX` are bound as `i64::MAX`.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Zero means no offset. Values above `i64::MAX` are bound as `i64::MAX`.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Aborts the statement with [`Error::Cancelled`](crate::Error::Cancelled)
    /// once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Turns this statement into a derived table named `alias`.
    pub fn as_subquery(self, alias: impl Into<String>) -> Subquery {
        let columns = self.columns.clone();
        Subquery::new(Arc::new(self), Some(alias.into()), columns, Registry::get::<T>)
    }

    /// Turns this statement into an unnamed subquery, for `IN`, `EXISTS` and
    /// `ANY`/`ALL`/`SOME`.
    pub fn subquery(self) -> Subquery {
        let columns = self.columns.clone();
        Subquery::new(Arc::new(self), None, columns, Registry::get::<T>)
    }

    /// Returns the first row, or [`Error::NoRows`](crate::Error::NoRows).
    #[tracing::instrument(skip_all)]
    pub async fn get(self) -> Result<T> {
        let session = Arc::clone(&self.session);
        let cancel = self.cancel.clone();
        let ctx = super::context::<T, _>(&session, QueryType::Select, self, cancel)?;
        super::get::<T>(session, ctx).await
    }

    /// Returns every row; no rows is an empty `Vec`.
    #[tracing::instrument(skip_all)]
    pub async fn get_multi(self) -> Result<Vec<T>> {
        let session = Arc::clone(&self.session);
        let cancel = self.cancel.clone();
        let ctx = super::context::<T, _>(&session, QueryType::Select, self, cancel)?;
        super::get_multi::<T>(session, ctx).await
    }
}

impl<T: Entity> QueryBuilder for Selector<T> {
    fn build(&self) -> Result<Query> {
        let core = self.session.core();
        let model = core.registry().get::<T>()?;
        let mut builder = Builder::new(core, model);

        builder.write_str("SELECT ");
        if self.columns.is_empty() {
            builder.write_char('*');
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                builder.write_char(',');
            }
            builder.build_selectable(column)?;
        }

        builder.write_str(" FROM ");
        builder.build_table(self.table.as_ref())?;

        if !self.wheres.is_empty() {
            builder.write_str(" WHERE ");
            builder.build_predicates(&self.wheres)?;
        }

        if !self.group_by.is_empty() {
            builder.write_str(" GROUP BY ");
            for (i, field) in self.group_by.iter().enumerate() {
                if i > 0 {
                    builder.write_char(',');
                }
                let column = builder.column_name(field)?;
                builder.quote(&column);
            }
        }

        if !self.having.is_empty() {
            builder.write_str(" HAVING ");
            builder.build_predicates(&self.having)?;
        }

        if !self.order_by.is_empty() {
            builder.write_str(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    builder.write_char(',');
                }
                let column = builder.column_name(&order.field)?;
                builder.quote(&column);
                builder.write_char(' ');
                builder.write_str(&order.order.to_string());
            }
        }

        if self.limit > 0 {
            builder.write_str(" LIMIT ?");
            builder.add_arg(Value::Integer(self.limit.min(i64::MAX as u64) as i64));
        }

        if self.offset > 0 {
            builder.write_str(" OFFSET ?");
            builder.add_arg(Value::Integer(self.offset.min(i64::MAX as u64) as i64));
        }

        Ok(builder.finish())
    }
}
