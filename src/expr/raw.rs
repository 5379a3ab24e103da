use super::Expression;
use super::Op;
use super::Predicate;
use crate::value::IntoValue;
use crate::value::Value;

/// SQL written by the caller. It is emitted verbatim and never validated.
#[derive(Clone, Debug)]
pub struct RawExpr {
    pub(crate) sql:  String,
    pub(crate) args: Vec<Value>,
}

pub fn raw(sql: impl Into<String>) -> RawExpr {
    RawExpr { sql: sql.into(), args: Vec::new() }
}

impl RawExpr {
    /// Binds values to the `?` placeholders in the fragment, in order.
    pub fn args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        self.args.extend(args.into_iter().map(IntoValue::into_value));
        self
    }

    pub fn as_predicate(self) -> Predicate {
        Predicate::unary(Op::Raw, Expression::Raw(self))
    }
}
