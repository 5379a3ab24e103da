use std::sync::Arc;

use super::Valuer;
use super::resolve_columns;
use crate::entity::Entity;
use crate::error::Error;
use crate::error::Result;
use crate::model::Model;
use crate::value::Value;

/// Reads and writes fields through the entity's generated accessors.
#[derive(Clone, Debug)]
pub struct ReflectValuer {
    model: Arc<Model>,
}

impl ReflectValuer {
    pub fn new(model: Arc<Model>) -> Self {
        Self { model }
    }
}

impl<T: Entity> Valuer<T> for ReflectValuer {
    fn field(&self, entity: &T, name: &str) -> Result<Value> {
        let field = self.model.field(name).ok_or_else(|| Error::unknown_field(name))?;
        entity.field_value(field.name()).ok_or_else(|| Error::unknown_field(name))
    }

    fn set_columns(&self, entity: &mut T, columns: &[String], values: Vec<Value>) -> Result<()> {
        let fields = resolve_columns(&self.model, columns)?;
        for (field, value) in fields.into_iter().zip(values) {
            entity.set_field(field.name(), value)?;
        }
        Ok(())
    }
}
