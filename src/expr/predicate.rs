use super::Expression;
use super::IntoExpression;
use super::Subquery;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    In,
    Exists,
    /// Emits nothing; the right side is a raw fragment used as a predicate.
    Raw,
}

impl Op {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "NOT",
            Op::In => "IN",
            Op::Exists => "EXISTS",
            Op::Raw => "",
        }
    }
}

/// A boolean condition. Unary predicates (`NOT`, `EXISTS`) have no left side.
#[derive(Clone, Debug)]
pub struct Predicate {
    pub(crate) left:  Option<Expression>,
    pub(crate) op:    Op,
    pub(crate) right: Expression,
}

impl Predicate {
    pub(crate) fn binary(left: Expression, op: Op, right: Expression) -> Self {
        Self { left: Some(left), op, right }
    }

    pub(crate) fn unary(op: Op, right: Expression) -> Self {
        Self { left: None, op, right }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::binary(self.into_expression(), Op::And, other.into_expression())
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::binary(self.into_expression(), Op::Or, other.into_expression())
    }
}

pub fn not(predicate: Predicate) -> Predicate {
    Predicate::unary(Op::Not, predicate.into_expression())
}

pub fn exists(sub: Subquery) -> Predicate {
    Predicate::unary(Op::Exists, Expression::Subquery(sub))
}
