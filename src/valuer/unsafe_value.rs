use std::any::TypeId;
use std::sync::Arc;

use super::Valuer;
use super::resolve_columns;
use crate::entity::Entity;
use crate::error::Error;
use crate::error::Result;
use crate::model::Model;
use crate::value::Value;

/// Decodes columns directly into field storage at `base + offset`.
///
/// Offsets come from `offset_of!` on the entity the model was parsed from, so
/// the valuer refuses to touch any other type.
#[derive(Clone, Debug)]
pub struct UnsafeValuer {
    model: Arc<Model>,
}

impl UnsafeValuer {
    pub fn new(model: Arc<Model>) -> Self {
        Self { model }
    }

    fn check_layout<T: 'static>(&self) -> Result<()> {
        if self.model.type_id() == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(Error::Unknown(format!(
                "model for table {} was not derived from {}",
                self.model.table_name(),
                std::any::type_name::<T>()
            )))
        }
    }
}

impl<T: Entity> Valuer<T> for UnsafeValuer {
    fn field(&self, entity: &T, name: &str) -> Result<Value> {
        self.check_layout::<T>()?;
        let field = self.model.field(name).ok_or_else(|| Error::unknown_field(name))?;
        let base = (entity as *const T).cast::<u8>();
        // SAFETY: the model was parsed from `T`, so `offset` locates an
        // initialised field of the accessor's type inside `*entity`.
        Ok(unsafe { field.accessor.read(base.add(field.offset())) })
    }

    fn set_columns(&self, entity: &mut T, columns: &[String], values: Vec<Value>) -> Result<()> {
        self.check_layout::<T>()?;
        let fields = resolve_columns(&self.model, columns)?;
        let base = (entity as *mut T).cast::<u8>();
        for (field, value) in fields.into_iter().zip(values) {
            // SAFETY: as above; `entity` is exclusively borrowed for the call.
            unsafe { field.accessor.write(base.add(field.offset()), value)? };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Registry;
    use crate::testing::TestModel;
    use crate::testing::User;

    #[test]
    fn test_rejects_foreign_type() {
        let model = Registry::new().get::<TestModel>().unwrap();
        let valuer = UnsafeValuer::new(model);
        let mut user = User::default();
        let err = Valuer::<User>::set_columns(&valuer, &mut user, &["id".to_string()], vec![Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, Error::Unknown(_)));
    }
}
