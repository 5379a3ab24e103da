//! Entity traits for morm
//!
//! - [`Entity`] - Describes a struct's fields and reads/writes them by name
//! - [`TableName`] - Optional capability overriding the derived table name
//! - [`EntityDescriptor`] - Compile-time facts about a struct the registry
//!   turns into a [`Model`](crate::Model)
//!
//! These are implemented by the `#[derive(Entity)]` macro.

use crate::error::Result;
use crate::value::ColumnType;
use crate::value::Value;

/// A struct that can be mapped to a table.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Debug, Default, Entity)]
/// pub struct User {
///     pub id: i64,
///     #[morm = "column=first_name"]
///     pub name: String,
///     pub age: Option<i64>,
/// }
/// ```
pub trait Entity: Default + Send + Sync + 'static {
    /// Static description of the type's fields, in declaration order.
    fn descriptor() -> EntityDescriptor;

    /// Table name supplied through [`TableName`], if the type opted in with
    /// `#[morm(custom_table_name)]`.
    fn custom_table_name() -> Option<String> {
        None
    }

    /// Reads a field by its declared name.
    fn field_value(&self, field: &str) -> Option<Value>;

    /// Decodes `value` into the field's own type and assigns it.
    fn set_field(&mut self, field: &str, value: Value) -> Result<()>;
}

/// Overrides the table an entity maps to. The returned name is used as is,
/// even when empty.
pub trait TableName {
    fn table_name(&self) -> String;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityShape {
    NamedStruct,
    TupleStruct,
    UnitStruct,
}

#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    pub type_name: &'static str,
    pub shape:     EntityShape,
    pub fields:    Vec<FieldDescriptor>,
}

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name:        &'static str,
    /// Raw `#[morm = "..."]` content.
    pub tag:         Option<&'static str>,
    /// Byte offset of the field inside its struct.
    pub offset:      usize,
    pub type_name:   &'static str,
    pub column_type: ColumnType,
    pub accessor:    RawAccessor,
}

/// Reads and writes a field through a pointer to its storage.
#[derive(Clone, Copy)]
pub struct RawAccessor {
    read:  unsafe fn(*const u8) -> Value,
    write: unsafe fn(*mut u8, Value) -> Result<()>,
}

impl RawAccessor {
    /// # Safety
    ///
    /// `read` and `write` must treat their pointer as a valid, aligned pointer
    /// to the field type the accessor is registered for, and nothing else.
    #[doc(hidden)]
    pub const unsafe fn new(read: unsafe fn(*const u8) -> Value, write: unsafe fn(*mut u8, Value) -> Result<()>) -> Self {
        Self { read, write }
    }

    /// # Safety
    ///
    /// `field` must point at an initialised value of the accessor's field type.
    #[cfg_attr(not(feature = "unsafe-value"), allow(dead_code))]
    pub(crate) unsafe fn read(&self, field: *const u8) -> Value {
        unsafe { (self.read)(field) }
    }

    /// # Safety
    ///
    /// `field` must point at an initialised value of the accessor's field type
    /// that is not borrowed elsewhere.
    #[cfg_attr(not(feature = "unsafe-value"), allow(dead_code))]
    pub(crate) unsafe fn write(&self, field: *mut u8, value: Value) -> Result<()> {
        unsafe { (self.write)(field, value) }
    }
}

impl std::fmt::Debug for RawAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RawAccessor")
    }
}
