//! Table metadata derived from entity types

pub(crate) mod registry;
pub(crate) mod tag;

use std::any::TypeId;
use std::collections::HashMap;

pub use registry::Registry;

use crate::entity::RawAccessor;
use crate::error::Error;
use crate::error::Result;
use crate::value::ColumnType;

/// Resolves an entity's model from a registry, e.g. `Registry::get::<T>`.
pub(crate) type ModelResolver = fn(&Registry) -> Result<std::sync::Arc<Model>>;

/// Adjusts a freshly parsed model before it is cached.
pub type ModelOpt = Box<dyn FnOnce(&mut Model) -> Result<()> + Send>;

/// How one entity type maps to a table. Immutable once cached.
#[derive(Clone, Debug)]
pub struct Model {
    pub(crate) table_name: String,
    pub(crate) fields:     Vec<Field>,
    field_map:             HashMap<&'static str, usize>,
    column_map:            HashMap<String, usize>,
    type_id:               TypeId,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub(crate) name:        &'static str,
    pub(crate) column:      String,
    pub(crate) offset:      usize,
    pub(crate) type_name:   &'static str,
    pub(crate) column_type: ColumnType,
    pub(crate) index:       usize,
    pub(crate) accessor:    RawAccessor,
}

impl Field {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Model {
    pub(crate) fn new(table_name: String, fields: Vec<Field>, type_id: TypeId) -> Self {
        let field_map = fields.iter().enumerate().map(|(i, f)| (f.name, i)).collect();
        let column_map = fields.iter().enumerate().map(|(i, f)| (f.column.clone(), i)).collect();
        Self { table_name, fields, field_map, column_map, type_id }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks a field up by its declared name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|&i| &self.fields[i])
    }

    /// Looks a field up by the column it is stored in.
    pub fn field_by_column(&self, column: &str) -> Option<&Field> {
        self.column_map.get(column).map(|&i| &self.fields[i])
    }

    pub(crate) fn column_of(&self, name: &str) -> Result<&str> {
        self.field(name).map(|f| f.column.as_str()).ok_or_else(|| Error::unknown_field(name))
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    fn rename_column(&mut self, field: &str, column: String) -> Result<()> {
        let index = *self.field_map.get(field).ok_or_else(|| Error::unknown_field(field))?;
        let previous = std::mem::replace(&mut self.fields[index].column, column.clone());
        self.column_map.remove(&previous);
        self.column_map.insert(column, index);
        Ok(())
    }
}

pub fn with_table_name(name: impl Into<String>) -> ModelOpt {
    let name = name.into();
    Box::new(move |model: &mut Model| {
        model.table_name = name;
        Ok(())
    })
}

/// Fails with [`Error::UnknownField`] when the entity has no such field.
pub fn with_column_name(field: impl Into<String>, column: impl Into<String>) -> ModelOpt {
    let field = field.into();
    let column = column.into();
    Box::new(move |model: &mut Model| model.rename_column(&field, column))
}

/// `FirstName` -> `first_name`. Every uppercase letter starts a new word, so
/// `ID` becomes `i_d`.
pub fn underscore_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
