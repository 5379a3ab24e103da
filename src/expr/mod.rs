//! SQL expression tree
//!
//! Statement builders take these nodes and the compiler in
//! [`builder`](crate::builder) renders them. Every node is an immutable value;
//! combinators consume their inputs and return new nodes.
//!
//! ```ignore
//! use morm::expr::*;
//!
//! let adults = c("age").gt(18).and(c("age").lt(65));
//! let named = not(c("first_name").eq("Tom"));
//! let bump = assign("age", c("age").add(1));
//! ```

mod aggregate;
mod assign;
mod column;
mod predicate;
mod raw;
mod subquery;

pub use aggregate::Aggregate;
pub use aggregate::avg;
pub use aggregate::count;
pub use aggregate::max;
pub use aggregate::min;
pub use aggregate::sum;
pub use assign::Assignable;
pub use assign::Assignment;
pub use assign::assign;
pub use assign::assign_columns;
pub use assign::assign_non_null_columns;
pub use assign::assign_non_zero_columns;
pub use column::Column;
pub use column::c;
pub(crate) use predicate::Op;
pub use predicate::Predicate;
pub use predicate::exists;
pub use predicate::not;
pub use raw::RawExpr;
pub use raw::raw;
pub use subquery::Subquery;
pub use subquery::SubqueryExpr;
pub use subquery::all;
pub use subquery::any;
pub use subquery::some;

use crate::value::IntoValue;
use crate::value::Value;

#[derive(Clone, Debug)]
pub enum Expression {
    Column(Column),
    Value(Value),
    Predicate(Box<Predicate>),
    Aggregate(Aggregate),
    Math(Box<MathExpr>),
    Raw(RawExpr),
    Subquery(Subquery),
    SubqueryExpr(SubqueryExpr),
}

/// Anything usable as an operand. Plain values become bound arguments.
pub trait IntoExpression {
    fn into_expression(self) -> Expression;
}

impl<V: IntoValue> IntoExpression for V {
    fn into_expression(self) -> Expression {
        Expression::Value(self.into_value())
    }
}

impl IntoExpression for Expression {
    fn into_expression(self) -> Expression {
        self
    }
}

impl IntoExpression for Column {
    fn into_expression(self) -> Expression {
        Expression::Column(self)
    }
}

impl IntoExpression for Predicate {
    fn into_expression(self) -> Expression {
        Expression::Predicate(Box::new(self))
    }
}

impl IntoExpression for Aggregate {
    fn into_expression(self) -> Expression {
        Expression::Aggregate(self)
    }
}

impl IntoExpression for MathExpr {
    fn into_expression(self) -> Expression {
        Expression::Math(Box::new(self))
    }
}

impl IntoExpression for RawExpr {
    fn into_expression(self) -> Expression {
        Expression::Raw(self)
    }
}

impl IntoExpression for Subquery {
    fn into_expression(self) -> Expression {
        Expression::Subquery(self)
    }
}

impl IntoExpression for SubqueryExpr {
    fn into_expression(self) -> Expression {
        Expression::SubqueryExpr(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MathOp {
    Add,
    Sub,
    Multi,
}

impl MathOp {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
            MathOp::Multi => "*",
        }
    }
}

/// `left OP right`, rendered without parentheses.
#[derive(Clone, Debug)]
pub struct MathExpr {
    pub(crate) left:  Expression,
    pub(crate) op:    MathOp,
    pub(crate) right: Expression,
}

impl MathExpr {
    pub(crate) fn new(left: Expression, op: MathOp, right: Expression) -> Self {
        Self { left, op, right }
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

    pub fn eq(self, value: impl IntoExpression) -> Predicate {
        Predicate::binary(self.into_expression(), Op::Eq, value.into_expression())
    }

    pub fn gt(self, value: impl IntoExpression) -> Predicate {
        Predicate::binary(self.into_expression(), Op::Gt, value.into_expression())
    }

    pub fn lt(self, value: impl IntoExpression) -> Predicate {
        Predicate::binary(self.into_expression(), Op::Lt, value.into_expression())
    }
}
