use std::sync::Arc;

use super::Column;
use crate::model::ModelResolver;
use crate::query::QueryBuilder;
use crate::query::Selectable;
use crate::table::TableReference;

/// A SELECT nested in another statement.
///
/// It is compiled again every time the outer statement references it, and its
/// arguments are spliced in at that position.
#[derive(Clone)]
pub struct Subquery {
    pub(crate) builder: Arc<dyn QueryBuilder>,
    pub(crate) alias:   Option<String>,
    pub(crate) columns: Vec<Selectable>,
    pub(crate) model:   ModelResolver,
}

impl Subquery {
    pub(crate) fn new(
        builder: Arc<dyn QueryBuilder>,
        alias: Option<String>,
        columns: Vec<Selectable>,
        model: ModelResolver,
    ) -> Self {
        Self { builder, alias, columns, model }
    }

    /// A column exposed by this subquery, qualified with its alias.
    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of(TableReference::Subquery(self.clone()), name)
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl std::fmt::Debug for Subquery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subquery").field("alias", &self.alias).field("columns", &self.columns).finish()
    }
}

/// `ANY (...)`, `ALL (...)` or `SOME (...)`.
#[derive(Clone, Debug)]
pub struct SubqueryExpr {
    pub(crate) sub:     Subquery,
    pub(crate) keyword: &'static str,
}

pub fn any(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr { sub, keyword: "ANY" }
}

pub fn all(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr { sub, keyword: "ALL" }
}

pub fn some(sub: Subquery) -> SubqueryExpr {
    SubqueryExpr { sub, keyword: "SOME" }
}
