use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;

use super::Field;
use super::Model;
use super::ModelOpt;
use super::tag::TAG_KEY_COLUMN;
use super::tag::parse_tag;
use super::underscore_name;
use crate::entity::Entity;
use crate::entity::EntityShape;
use crate::error::Error;
use crate::error::Result;

/// Caches one [`Model`] per entity type.
///
/// Lookups are lock-free for readers; a model is parsed completely before it
/// is published, so readers never observe a partially built one.
#[derive(Debug, Default)]
pub struct Registry {
    models: DashMap<TypeId, Arc<Model>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached model for `T`, registering it with default naming on
    /// first use. Concurrent first calls converge on a single model.
    pub fn get<T: Entity>(&self) -> Result<Arc<Model>> {
        let key = TypeId::of::<T>();
        if let Some(model) = self.models.get(&key) {
            return Ok(Arc::clone(model.value()));
        }

        let model = Arc::new(parse_model::<T>()?);
        Ok(Arc::clone(self.models.entry(key).or_insert(model).value()))
    }

    /// Parses `T`, applies `opts` in order and caches the result, replacing
    /// any model registered before.
    pub fn register<T: Entity>(&self, opts: impl IntoIterator<Item = ModelOpt>) -> Result<Arc<Model>> {
        let mut model = parse_model::<T>()?;
        for opt in opts {
            opt(&mut model)?;
        }

        let model = Arc::new(model);
        self.models.insert(TypeId::of::<T>(), Arc::clone(&model));
        tracing::debug!(table = %model.table_name, "registered model");
        Ok(model)
    }
}

fn parse_model<T: Entity>() -> Result<Model> {
    let descriptor = T::descriptor();
    if descriptor.shape != EntityShape::NamedStruct {
        return Err(Error::PointerOnly { value: descriptor.type_name.to_string() });
    }

    let mut fields = Vec::with_capacity(descriptor.fields.len());
    for (index, fd) in descriptor.fields.into_iter().enumerate() {
        let mut tags = parse_tag(fd.tag)?;
        let column = tags
            .remove(TAG_KEY_COLUMN)
            .filter(|column| !column.is_empty())
            .unwrap_or_else(|| underscore_name(fd.name));

        fields.push(Field {
            name: fd.name,
            column,
            offset: fd.offset,
            type_name: fd.type_name,
            column_type: fd.column_type,
            index,
            accessor: fd.accessor,
        });
    }

    let table_name = T::custom_table_name().unwrap_or_else(|| underscore_name(descriptor.type_name));
    tracing::trace!(table = %table_name, fields = fields.len(), "parsed model");

    Ok(Model::new(table_name, fields, TypeId::of::<T>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnType;
    use crate::TableName;
    use crate::model::with_column_name;
    use crate::model::with_table_name;
    use crate::testing::TestModel;

    #[derive(Debug, Default, crate::Entity)]
    struct TaggedModel {
        #[morm = "column=first_name_t"]
        first_name: String,
        #[morm = "column="]
        last_name:  String,
        #[morm = "column=nick,size=11"]
        nick_name:  String,
    }

    #[derive(Debug, Default, crate::Entity)]
    struct BadTagModel {
        #[morm = "column"]
        first_name: String,
    }

    #[derive(Debug, Default, crate::Entity)]
    #[morm(custom_table_name)]
    struct CustomTableModel {
        id: i64,
    }

    impl TableName for CustomTableModel {
        fn table_name(&self) -> String {
            "custom_table_name_t".to_string()
        }
    }

    #[derive(Debug, Default, crate::Entity)]
    #[morm(custom_table_name)]
    struct EmptyTableModel {
        id: i64,
    }

    impl TableName for EmptyTableModel {
        fn table_name(&self) -> String {
            String::new()
        }
    }

    #[derive(Debug, Default, crate::Entity)]
    struct Wrapper(i64);

    #[test]
    fn test_get_default_naming() {
        let registry = Registry::new();
        let model = registry.get::<TestModel>().unwrap();

        assert_eq!(model.table_name(), "test_model");
        let columns: Vec<&str> = model.fields().iter().map(Field::column).collect();
        assert_eq!(columns, vec!["id", "first_name", "age", "last_name"]);

        let age = model.field("age").unwrap();
        assert_eq!(age.index(), 2);
        assert_eq!(age.type_name(), "i8");
        assert_eq!(age.column_type(), ColumnType::Integer);
        assert_eq!(model.field_by_column("last_name").unwrap().name(), "last_name");
        assert!(model.field("missing").is_none());
    }

    #[test]
    fn test_get_is_idempotent() {
        let registry = Registry::new();
        let first = registry.get::<TestModel>().unwrap();
        let second = registry.get::<TestModel>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_get_converges() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get::<TestModel>().unwrap())
            })
            .collect();

        let models: Vec<Arc<Model>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = registry.get::<TestModel>().unwrap();
        assert!(models.iter().all(|m| Arc::ptr_eq(m, &cached)));
    }

    #[test]
    fn test_tag_overrides_column() {
        let registry = Registry::new();
        let model = registry.get::<TaggedModel>().unwrap();
        assert_eq!(model.field("first_name").unwrap().column(), "first_name_t");
        assert_eq!(model.field("last_name").unwrap().column(), "last_name");
        assert_eq!(model.field("nick_name").unwrap().column(), "nick");
    }

    #[test]
    fn test_invalid_tag() {
        let registry = Registry::new();
        let err = registry.get::<BadTagModel>().unwrap_err();
        assert!(matches!(err, Error::InvalidTagContent { ref pair } if pair == "column"));
    }

    #[test]
    fn test_custom_table_name() {
        let registry = Registry::new();
        assert_eq!(registry.get::<CustomTableModel>().unwrap().table_name(), "custom_table_name_t");
        assert_eq!(registry.get::<EmptyTableModel>().unwrap().table_name(), "");
    }

    #[test]
    fn test_non_named_struct_is_rejected() {
        let registry = Registry::new();
        let err = registry.get::<Wrapper>().unwrap_err();
        assert!(matches!(err, Error::PointerOnly { .. }));
    }

    #[test]
    fn test_register_with_options() {
        let registry = Registry::new();
        let model = registry
            .register::<TestModel>([with_table_name("users"), with_column_name("first_name", "first_name_ccc")])
            .unwrap();

        assert_eq!(model.table_name(), "users");
        assert_eq!(model.field("first_name").unwrap().column(), "first_name_ccc");
        assert_eq!(model.field_by_column("first_name_ccc").unwrap().name(), "first_name");
        assert!(model.field_by_column("first_name").is_none());

        let cached = registry.get::<TestModel>().unwrap();
        assert!(Arc::ptr_eq(&model, &cached));
    }

    #[test]
    fn test_register_unknown_column_option() {
        let registry = Registry::new();
        let err = registry.register::<TestModel>([with_column_name("FirstNameXXX", "first_name_ccc")]).unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref name } if name == "FirstNameXXX"));
    }
}
