use super::Column;
use super::Expression;
use super::IntoExpression;
use super::RawExpr;
use crate::entity::Entity;
use crate::value::Value;
use crate::value::is_zero_value;

/// One entry of an UPDATE's SET list or an upsert's update list.
///
/// - `Column`: take the value from the entity being written (or, in an
///   upsert, from the row that was just inserted)
/// - `Assignment`: `col = <expression>`
/// - `Raw`: a fragment emitted verbatim
#[derive(Clone, Debug)]
pub enum Assignable {
    Column(Column),
    Assignment(Assignment),
    Raw(RawExpr),
}

#[derive(Clone, Debug)]
pub struct Assignment {
    pub(crate) column: String,
    pub(crate) value:  Expression,
}

pub fn assign(column: impl Into<String>, value: impl IntoExpression) -> Assignment {
    Assignment { column: column.into(), value: value.into_expression() }
}

impl From<Column> for Assignable {
    fn from(column: Column) -> Self {
        Assignable::Column(column)
    }
}

impl From<Assignment> for Assignable {
    fn from(assignment: Assignment) -> Self {
        Assignable::Assignment(assignment)
    }
}

impl From<RawExpr> for Assignable {
    fn from(raw: RawExpr) -> Self {
        Assignable::Raw(raw)
    }
}

/// Assigns every field of `entity` accepted by `filter` to its current value.
pub fn assign_columns<T, F>(entity: &T, filter: F) -> Vec<Assignable>
where
    T: Entity,
    F: Fn(&str, &Value) -> bool,
{
    let mut assigns = Vec::new();
    for field in T::descriptor().fields {
        if let Some(value) = entity.field_value(field.name) {
            if filter(field.name, &value) {
                assigns.push(Assignable::Assignment(assign(field.name, value)));
            }
        }
    }
    assigns
}

/// Assigns the fields of `entity` that are not NULL.
pub fn assign_non_null_columns<T: Entity>(entity: &T) -> Vec<Assignable> {
    assign_columns(entity, |_, value| !matches!(value, Value::Null))
}

/// Assigns the fields of `entity` that do not hold their type's zero value.
pub fn assign_non_zero_columns<T: Entity>(entity: &T) -> Vec<Assignable> {
    assign_columns(entity, |_, value| !is_zero_value(value))
}
