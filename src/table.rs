//! Table references used in FROM clauses: entity tables, joins and subqueries

use crate::entity::Entity;
use crate::expr::Column;
use crate::expr::Predicate;
use crate::expr::Subquery;
use crate::model::ModelResolver;
use crate::model::Registry;

#[derive(Clone, Debug)]
pub enum TableReference {
    Table(Table),
    Join(Box<Join>),
    Subquery(Subquery),
}

/// The table of entity `T`, optionally aliased.
#[derive(Clone)]
pub struct Table {
    pub(crate) model:     ModelResolver,
    pub(crate) type_name: &'static str,
    pub(crate) alias:     Option<String>,
}

pub fn table_of<T: Entity>() -> Table {
    Table { model: Registry::get::<T>, type_name: std::any::type_name::<T>(), alias: None }
}

impl Table {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// A column of this table, qualified with the table's alias.
    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of(TableReference::Table(self.clone()), name)
    }

    pub fn join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Inner)
    }

    pub fn left_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Left)
    }

    pub fn right_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Right)
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("entity", &self.type_name).field("alias", &self.alias).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// Two table references combined with either `USING (...)` or `ON ...`.
#[derive(Clone, Debug)]
pub struct Join {
    pub(crate) left:  TableReference,
    pub(crate) right: TableReference,
    pub(crate) kind:  JoinKind,
    pub(crate) on:    Vec<Predicate>,
    pub(crate) using: Vec<String>,
}

impl Join {
    pub fn join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Inner)
    }

    pub fn left_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Left)
    }

    pub fn right_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder::new(self.into(), right.into(), JoinKind::Right)
    }
}

#[derive(Clone, Debug)]
pub struct JoinBuilder {
    left:  TableReference,
    right: TableReference,
    kind:  JoinKind,
}

impl JoinBuilder {
    fn new(left: TableReference, right: TableReference, kind: JoinKind) -> Self {
        Self { left, right, kind }
    }

    pub fn on(self, predicates: impl IntoIterator<Item = Predicate>) -> Join {
        Join {
            left:  self.left,
            right: self.right,
            kind:  self.kind,
            on:    predicates.into_iter().collect(),
            using: Vec::new(),
        }
    }

    pub fn using<I, S>(self, columns: I) -> Join
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Join {
            left:  self.left,
            right: self.right,
            kind:  self.kind,
            on:    Vec::new(),
            using: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Table> for TableReference {
    fn from(table: Table) -> Self {
        TableReference::Table(table)
    }
}

impl From<Join> for TableReference {
    fn from(join: Join) -> Self {
        TableReference::Join(Box::new(join))
    }
}

impl From<Subquery> for TableReference {
    fn from(sub: Subquery) -> Self {
        TableReference::Subquery(sub)
    }
}
