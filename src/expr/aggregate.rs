use super::IntoExpression;
use super::Op;
use super::Predicate;

/// `FN(col)`. The alias is only emitted inside a projection list.
#[derive(Clone, Debug)]
pub struct Aggregate {
    pub(crate) func:  &'static str,
    pub(crate) arg:   String,
    pub(crate) alias: Option<String>,
}

impl Aggregate {
    fn new(func: &'static str, field: impl Into<String>) -> Self {
        Self { func, arg: field.into(), alias: None }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn eq(self, value: impl IntoExpression) -> Predicate {
        Predicate::binary(self.into_expression(), Op::Eq, value.into_expression())
    }

    pub fn lt(self, value: impl IntoExpression) -> Predicate {
        Predicate::binary(self.into_expression(), Op::Lt, value.into_expression())
    }

    pub fn gt(self, value: impl IntoExpression) -> Predicate {
        Predicate::binary(self.into_expression(), Op::Gt, value.into_expression())
    }
}

pub fn avg(field: impl Into<String>) -> Aggregate {
    Aggregate::new("AVG", field)
}

pub fn max(field: impl Into<String>) -> Aggregate {
    Aggregate::new("MAX", field)
}

pub fn min(field: impl Into<String>) -> Aggregate {
    Aggregate::new("MIN", field)
}

pub fn count(field: impl Into<String>) -> Aggregate {
    Aggregate::new("COUNT", field)
}

pub fn sum(field: impl Into<String>) -> Aggregate {
    Aggregate::new("SUM", field)
}
