use super::Expression;
use super::IntoExpression;
use super::MathExpr;
use super::MathOp;
use super::Op;
use super::Predicate;
use super::Subquery;
use crate::table::TableReference;
use crate::value::IntoValue;

/// A field of a model, optionally qualified by the table it belongs to.
///
/// The name is the entity's field name; it is resolved to the stored column
/// name when the statement is built.
#[derive(Clone, Debug)]
pub struct Column {
    pub(crate) table: Option<TableReference>,
    pub(crate) name:  String,
    pub(crate) alias: Option<String>,
}

pub fn c(name: impl Into<String>) -> Column {
    Column { table: None, name: name.into(), alias: None }
}

impl Column {
    pub(crate) fn of(table: TableReference, name: impl Into<String>) -> Self {
        Self { table: Some(table), name: name.into(), alias: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Only honoured in a projection list.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn eq(self, value: impl IntoExpression) -> Predicate {
        self.compare(Op::Eq, value)
    }

    pub fn ne(self, value: impl IntoExpression) -> Predicate {
        self.compare(Op::Ne, value)
    }

    pub fn lt(self, value: impl IntoExpression) -> Predicate {
        self.compare(Op::Lt, value)
    }

    pub fn le(self, value: impl IntoExpression) -> Predicate {
        self.compare(Op::Le, value)
    }

    pub fn gt(self, value: impl IntoExpression) -> Predicate {
        self.compare(Op::Gt, value)
    }

    pub fn ge(self, value: impl IntoExpression) -> Predicate {
        self.compare(Op::Ge, value)
    }

    /// `col IN (?,?,...)`, one placeholder per value. An empty list fails
    /// to build with [`Error::UnsupportedExpressionType`](crate::Error::UnsupportedExpressionType).
    pub fn is_in<I, V>(self, values: I) -> Predicate
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        let args: Vec<_> = values.into_iter().map(IntoValue::into_value).collect();
        let placeholders = vec!["?"; args.len()].join(",");
        let list = super::raw(format!("({})", placeholders)).args(args);
        Predicate::binary(self.into_expression(), Op::In, Expression::Raw(list))
    }

    /// `col IN (SELECT ...)`
    pub fn in_query(self, sub: Subquery) -> Predicate {
        Predicate::binary(self.into_expression(), Op::In, Expression::Subquery(sub))
    }

    pub fn add(self, value: impl IntoExpression) -> MathExpr {
        MathExpr::new(self.into_expression(), MathOp::Add, value.into_expression())
    }

    pub fn sub(self, value: impl IntoExpression) -> MathExpr {
        MathExpr::new(self.into_expression(), MathOp::Sub, value.into_expression())
    }

    pub fn multi(self, value: impl IntoExpression) -> MathExpr {
        MathExpr::new(self.into_expression(), MathOp::Multi, value.into_expression())
    }

    fn compare(self, op: Op, value: impl IntoExpression) -> Predicate {
        Predicate::binary(self.into_expression(), op, value.into_expression())
    }
}
