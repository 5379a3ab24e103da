use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("morm: unknown error: {0}")]
    Unknown(String),

    #[error("morm: only pointers to named structs are supported, got {value}")]
    PointerOnly { value: String },

    #[error("morm: unknown field {name}")]
    UnknownField { name: String },

    #[error("morm: unsupported expression type {node}")]
    UnsupportedExpressionType { node: String },

    #[error("morm: invalid tag content {pair}")]
    InvalidTagContent { pair: String },

    #[error("morm: too many returned columns {columns:?}")]
    TooManyReturnedColumns { columns: Vec<String> },

    #[error("morm: insert statement needs at least one row")]
    InsertZeroRow,

    #[error("morm: unsupported assignable type {node}")]
    UnsupportedAssignableType { node: String },

    #[error("morm: update statement has no assigned columns")]
    NoUpdatedColumns,

    #[error("morm: transaction callback failed: {source}")]
    TxFuncFailed {
        #[source]
        source: Box<Error>,
    },

    #[error("morm: rollback failed: {source}, after: {cause}")]
    TxRollbackFailed {
        #[source]
        source: Box<Error>,
        cause:  Box<Error>,
    },

    #[error("morm: commit failed: {source}")]
    TxCommitFailed {
        #[source]
        source: Box<Error>,
    },

    #[error("morm: transaction already committed or rolled back")]
    TxFinished,

    #[error("morm: no rows in result set")]
    NoRows,

    #[error("Database error: {0}")]
    Database(#[from] turso::Error),

    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion { expected: &'static str, actual: String },

    #[error("Unexpected null value for non-nullable field")]
    UnexpectedNull,

    #[error("morm: query cancelled")]
    Cancelled,

    #[cfg(feature = "with-json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable numeric code. Codes in the 1000xx range are raised by the
    /// builder, registry and transaction layers; 2000xx come from the driver
    /// and value conversions.
    pub fn code(&self) -> u32 {
        match self {
            Error::Unknown(_) => 100001,
            Error::PointerOnly { .. } => 100002,
            Error::UnknownField { .. } => 100003,
            Error::UnsupportedExpressionType { .. } => 100004,
            Error::InvalidTagContent { .. } => 100005,
            Error::TooManyReturnedColumns { .. } => 100006,
            Error::InsertZeroRow => 100007,
            Error::UnsupportedAssignableType { .. } => 100008,
            Error::NoUpdatedColumns => 100009,
            Error::TxFuncFailed { .. } => 100010,
            Error::TxRollbackFailed { .. } => 100011,
            Error::TxCommitFailed { .. } => 100012,
            Error::TxFinished => 100013,
            Error::NoRows => 100014,
            Error::Database(_) => 200001,
            Error::TypeConversion { .. } => 200002,
            Error::UnexpectedNull => 200003,
            Error::Cancelled => 200004,
            #[cfg(feature = "with-json")]
            Error::Json(_) => 200005,
        }
    }

    pub(crate) fn unknown_field(name: impl Into<String>) -> Self {
        Error::UnknownField { name: name.into() }
    }

    pub(crate) fn unsupported_expression(node: impl std::fmt::Debug) -> Self {
        Error::UnsupportedExpressionType { node: format!("{:?}", node) }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_error_display_unknown_field() {
        let err = Error::unknown_field("user_id");
        let display = format!("{}", err);
        assert!(display.contains("unknown field"));
        assert!(display.contains("user_id"));
    }

    #[test]
    fn test_error_display_type_conversion() {
        let err = Error::TypeConversion { expected: "Integer", actual: "Text(hello)".to_string() };
        let display = format!("{}", err);
        assert!(display.contains("Type conversion error"));
        assert!(display.contains("Integer"));
        assert!(display.contains("Text(hello)"));
    }

    #[test]
    fn test_error_display_too_many_columns() {
        let err = Error::TooManyReturnedColumns { columns: vec!["a".to_string(), "b".to_string()] };
        assert!(format!("{}", err).contains("\"a\""));
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(Error::Unknown(String::new()).code(), 100001);
        assert_eq!(Error::PointerOnly { value: "i64".to_string() }.code(), 100002);
        assert_eq!(Error::unknown_field("x").code(), 100003);
        assert_eq!(Error::InsertZeroRow.code(), 100007);
        assert_eq!(Error::NoUpdatedColumns.code(), 100009);
        assert_eq!(Error::NoRows.code(), 100014);
        assert_eq!(Error::Cancelled.code(), 200004);
    }

    #[test]
    fn test_error_codes_are_unique() {
        let errors = vec![
            Error::Unknown(String::new()),
            Error::PointerOnly { value: String::new() },
            Error::unknown_field(""),
            Error::UnsupportedExpressionType { node: String::new() },
            Error::InvalidTagContent { pair: String::new() },
            Error::TooManyReturnedColumns { columns: vec![] },
            Error::InsertZeroRow,
            Error::UnsupportedAssignableType { node: String::new() },
            Error::NoUpdatedColumns,
            Error::TxFuncFailed { source: Box::new(Error::NoRows) },
            Error::TxRollbackFailed { source: Box::new(Error::NoRows), cause: Box::new(Error::NoRows) },
            Error::TxCommitFailed { source: Box::new(Error::NoRows) },
            Error::TxFinished,
            Error::NoRows,
            Error::TypeConversion { expected: "", actual: String::new() },
            Error::UnexpectedNull,
            Error::Cancelled,
        ];
        let codes: HashSet<u32> = errors.iter().map(Error::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_tx_errors_wrap_cause() {
        use std::error::Error as _;

        let err = Error::TxCommitFailed { source: Box::new(Error::Unknown("disk full".to_string())) };
        let source = err.source().unwrap();
        assert!(source.to_string().contains("disk full"));

        let err = Error::TxRollbackFailed {
            source: Box::new(Error::Unknown("connection lost".to_string())),
            cause:  Box::new(Error::NoRows),
        };
        let display = err.to_string();
        assert!(display.contains("connection lost"));
        assert!(display.contains("no rows"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(Error::UnexpectedNull)
        }

        assert_eq!(returns_ok().unwrap(), 42);
        assert!(returns_err().is_err());
    }
}
