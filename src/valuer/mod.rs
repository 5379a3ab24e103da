//! Binding result rows onto entities and reading entity fields back out
//!
//! Two strategies are available and are picked once per session through
//! [`ValueStrategy`]:
//!
//! - [`ValueStrategy::Reflect`] goes through the entity's generated
//!   `field_value`/`set_field` accessors.
//! - [`ValueStrategy::Unsafe`] (feature `unsafe-value`) decodes each column
//!   straight into the field's storage using the offset recorded in the model.
//!
//! Both produce the same results.

mod reflect;
#[cfg(feature = "unsafe-value")]
mod unsafe_value;

use std::sync::Arc;

pub use reflect::ReflectValuer;
#[cfg(feature = "unsafe-value")]
pub use unsafe_value::UnsafeValuer;

use crate::entity::Entity;
use crate::error::Error;
use crate::error::Result;
use crate::model::Field;
use crate::model::Model;
use crate::value::Value;

pub trait Valuer<T>: Send + Sync {
    /// Reads the field with the given declared name.
    fn field(&self, entity: &T, name: &str) -> Result<Value>;

    /// Assigns `values[i]` to the field stored in `columns[i]`.
    fn set_columns(&self, entity: &mut T, columns: &[String], values: Vec<Value>) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueStrategy {
    #[default]
    Reflect,
    #[cfg(feature = "unsafe-value")]
    Unsafe,
}

impl ValueStrategy {
    pub fn valuer<T: Entity>(self, model: Arc<Model>) -> Box<dyn Valuer<T>> {
        match self {
            ValueStrategy::Reflect => Box::new(ReflectValuer::new(model)),
            #[cfg(feature = "unsafe-value")]
            ValueStrategy::Unsafe => Box::new(UnsafeValuer::new(model)),
        }
    }
}

/// Maps result columns to model fields, rejecting result sets that cannot
/// belong to the model.
pub(crate) fn resolve_columns<'m>(model: &'m Model, columns: &[String]) -> Result<Vec<&'m Field>> {
    if columns.len() > model.fields().len() {
        return Err(Error::TooManyReturnedColumns { columns: columns.to_vec() });
    }

    columns.iter().map(|column| model.field_by_column(column).ok_or_else(|| Error::unknown_field(column))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Registry;
    use crate::model::with_column_name;
    use crate::testing::TestModel;

    fn strategies() -> Vec<ValueStrategy> {
        vec![
            ValueStrategy::Reflect,
            #[cfg(feature = "unsafe-value")]
            ValueStrategy::Unsafe,
        ]
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_set_columns_all_strategies() {
        let model = Registry::new().get::<TestModel>().unwrap();
        for strategy in strategies() {
            let valuer = strategy.valuer::<TestModel>(Arc::clone(&model));
            let mut entity = TestModel::default();
            valuer
                .set_columns(
                    &mut entity,
                    &columns(&["id", "first_name", "age", "last_name"]),
                    vec![
                        Value::Integer(1),
                        Value::Text("Tom".into()),
                        Value::Integer(18),
                        Value::Text("Jerry".into()),
                    ],
                )
                .unwrap();

            assert_eq!(
                entity,
                TestModel { id: 1, first_name: "Tom".into(), age: 18, last_name: Some("Jerry".into()) },
                "strategy {:?}",
                strategy
            );
        }
    }

    #[test]
    fn test_set_columns_partial_and_reordered() {
        let model = Registry::new().get::<TestModel>().unwrap();
        for strategy in strategies() {
            let valuer = strategy.valuer::<TestModel>(Arc::clone(&model));
            let mut entity = TestModel::default();
            valuer
                .set_columns(&mut entity, &columns(&["last_name", "id"]), vec![Value::Null, Value::Integer(9)])
                .unwrap();

            assert_eq!(entity.id, 9);
            assert_eq!(entity.last_name, None);
            assert_eq!(entity.first_name, "");
        }
    }

    #[test]
    fn test_set_columns_unknown_column() {
        let model = Registry::new().get::<TestModel>().unwrap();
        for strategy in strategies() {
            let valuer = strategy.valuer::<TestModel>(Arc::clone(&model));
            let mut entity = TestModel::default();
            let err = valuer
                .set_columns(&mut entity, &columns(&["id", "nickname"]), vec![Value::Integer(1), Value::Null])
                .unwrap_err();
            assert!(matches!(err, Error::UnknownField { ref name } if name == "nickname"));
        }
    }

    #[test]
    fn test_set_columns_too_many_columns() {
        let model = Registry::new().get::<TestModel>().unwrap();
        for strategy in strategies() {
            let valuer = strategy.valuer::<TestModel>(Arc::clone(&model));
            let mut entity = TestModel::default();
            let names = columns(&["id", "first_name", "age", "last_name", "extra"]);
            let values = vec![Value::Null; names.len()];
            let err = valuer.set_columns(&mut entity, &names, values).unwrap_err();
            assert!(matches!(err, Error::TooManyReturnedColumns { .. }));
        }
    }

    #[test]
    fn test_set_columns_type_mismatch() {
        let model = Registry::new().get::<TestModel>().unwrap();
        for strategy in strategies() {
            let valuer = strategy.valuer::<TestModel>(Arc::clone(&model));
            let mut entity = TestModel::default();
            let err = valuer.set_columns(&mut entity, &columns(&["first_name"]), vec![Value::Integer(3)]).unwrap_err();
            assert!(matches!(err, Error::TypeConversion { .. }));
        }
    }

    #[test]
    fn test_set_columns_renamed_column() {
        let registry = Registry::new();
        let model = registry.register::<TestModel>([with_column_name("first_name", "fname")]).unwrap();
        for strategy in strategies() {
            let valuer = strategy.valuer::<TestModel>(Arc::clone(&model));
            let mut entity = TestModel::default();
            valuer.set_columns(&mut entity, &columns(&["fname"]), vec![Value::Text("Ann".into())]).unwrap();
            assert_eq!(entity.first_name, "Ann");
        }
    }

    #[test]
    fn test_field_all_strategies() {
        let model = Registry::new().get::<TestModel>().unwrap();
        let entity = TestModel { id: 3, first_name: "Ann".into(), age: 21, last_name: None };
        for strategy in strategies() {
            let valuer = strategy.valuer::<TestModel>(Arc::clone(&model));
            assert_eq!(valuer.field(&entity, "id").unwrap(), Value::Integer(3));
            assert_eq!(valuer.field(&entity, "first_name").unwrap(), Value::Text("Ann".into()));
            assert_eq!(valuer.field(&entity, "age").unwrap(), Value::Integer(21));
            assert_eq!(valuer.field(&entity, "last_name").unwrap(), Value::Null);
            assert!(matches!(valuer.field(&entity, "missing"), Err(Error::UnknownField { .. })));
        }
    }
}
