use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::Query;
use super::QueryBuilder;
use super::QueryType;
use crate::builder::Builder;
use crate::dialect::Upsert;
use crate::entity::Entity;
use crate::error::Error;
use crate::error::Result;
use crate::expr::Assignable;
use crate::session::ExecResult;
use crate::session::Session;

/// Builds and runs `INSERT` statements for entity `T`.
///
/// ```ignore
/// Inserter::new(&conn)
///     .values([User { id: 1, name: "x".into() }])
///     .on_duplicate_key()
///     .conflict_columns(["id"])
///     .update([c("name")])
///     .exec()
///     .await?;
/// ```
pub struct Inserter<T: Entity> {
    session: Arc<dyn Session>,
    values:  Vec<T>,
    columns: Vec<String>,
    upsert:  Option<Upsert>,
    cancel:  CancellationToken,
}

impl<T: Entity> Inserter<T> {
    pub fn new<S: Session + Clone>(session: &S) -> Self {
        Self {
            session: Arc::new(session.clone()),
            values:  Vec::new(),
            columns: Vec::new(),
            upsert:  None,
            cancel:  CancellationToken::new(),
        }
    }

    /// Rows to insert, one VALUES tuple each.
    pub fn values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.values.extend(values);
        self
    }

    /// Restricts the inserted columns to these fields. By default every field
    /// of the model is inserted.
    pub fn columns<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_duplicate_key(self) -> OnDuplicateKeyBuilder<T> {
        OnDuplicateKeyBuilder { inserter: self, conflict_columns: Vec::new() }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[tracing::instrument(skip_all)]
    pub async fn exec(self) -> Result<ExecResult> {
        let session = Arc::clone(&self.session);
        let cancel = self.cancel.clone();
        let ctx = super::context::<T, _>(&session, QueryType::Insert, self, cancel)?;
        super::exec(session, ctx).await
    }
}

/// Collects the conflict clause of an upsert.
pub struct OnDuplicateKeyBuilder<T: Entity> {
    inserter:         Inserter<T>,
    conflict_columns: Vec<String>,
}

impl<T: Entity> OnDuplicateKeyBuilder<T> {
    /// Conflict target; used by dialects that name it (SQLite).
    pub fn conflict_columns<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflict_columns = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Columns to overwrite on conflict. A bare column takes the value that
    /// was being inserted; an assignment sets an explicit value.
    pub fn update<I, A>(self, assigns: I) -> Inserter<T>
    where
        I: IntoIterator<Item = A>,
        A: Into<Assignable>,
    {
        let mut inserter = self.inserter;
        inserter.upsert = Some(Upsert {
            conflict_columns: self.conflict_columns,
            assigns:          assigns.into_iter().map(Into::into).collect(),
        });
        inserter
    }
}

impl<T: Entity> QueryBuilder for Inserter<T> {
    fn build(&self) -> Result<Query> {
        if self.values.is_empty() {
            return Err(Error::InsertZeroRow);
        }

        let core = self.session.core();
        let model = core.registry().get::<T>()?;
        let valuer = core.value_strategy().valuer::<T>(Arc::clone(&model));

        let fields: Vec<String> = if self.columns.is_empty() {
            model.fields().iter().map(|field| field.name().to_string()).collect()
        } else {
            self.columns.clone()
        };

        let mut builder = Builder::new(core, model);
        builder.write_str("INSERT INTO ");
        builder.build_table(None)?;
        builder.write_char('(');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                builder.write_char(',');
            }
            let column = builder.column_name(field)?;
            builder.quote(&column);
        }
        builder.write_str(") VALUES");

        for (row, entity) in self.values.iter().enumerate() {
            if row > 0 {
                builder.write_char(',');
            }
            builder.write_char('(');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    builder.write_char(',');
                }
                builder.write_char('?');
                builder.add_arg(valuer.field(entity, field)?);
            }
            builder.write_char(')');
        }

        if let Some(upsert) = &self.upsert {
            core.dialect().build_upsert(&mut builder, upsert)?;
        }

        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySql;
    use crate::dialect::Sqlite;
    use crate::expr::assign;
    use crate::expr::c;
    use crate::expr::raw;
    use crate::session::Core;
    use crate::testing::MockSession;
    use crate::testing::TestModel;
    use crate::testing::User;
    use crate::value::Value;

    fn user(id: i64, name: &str) -> User {
        User { id, name: name.to_string() }
    }

    #[test]
    fn test_insert_single_row() {
        let session = MockSession::new();
        let query = Inserter::new(&session).values([user(1, "x")]).build().unwrap();
        assert_eq!(query.sql, "INSERT INTO `user`(`id`,`name`) VALUES(?,?);");
        assert_eq!(query.args, vec![Value::Integer(1), Value::Text("x".to_string())]);
    }

    #[test]
    fn test_insert_multiple_rows() {
        let session = MockSession::new();
        let query = Inserter::new(&session).values([user(1, "a"), user(2, "b")]).build().unwrap();
        assert_eq!(query.sql, "INSERT INTO `user`(`id`,`name`) VALUES(?,?),(?,?);");
        assert_eq!(query.args, vec![
            Value::Integer(1),
            Value::Text("a".to_string()),
            Value::Integer(2),
            Value::Text("b".to_string())
        ]);
    }

    #[test]
    fn test_insert_selected_columns() {
        let session = MockSession::new();
        let model = TestModel { id: 3, first_name: "Tom".to_string(), age: 18, last_name: None };
        let query = Inserter::new(&session).values([model]).columns(["first_name", "age"]).build().unwrap();
        assert_eq!(query.sql, "INSERT INTO `test_model`(`first_name`,`age`) VALUES(?,?);");
        assert_eq!(query.args, vec![Value::Text("Tom".to_string()), Value::Integer(18)]);
    }

    #[test]
    fn test_insert_null_field() {
        let session = MockSession::new();
        let model = TestModel { id: 3, first_name: "Tom".to_string(), age: 18, last_name: None };
        let query = Inserter::new(&session).values([model]).build().unwrap();
        assert_eq!(query.sql, "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES(?,?,?,?);");
        assert_eq!(query.args[3], Value::Null);
    }

    #[test]
    fn test_insert_zero_rows() {
        let session = MockSession::new();
        let err = Inserter::<User>::new(&session).build().unwrap_err();
        assert!(matches!(err, Error::InsertZeroRow));
    }

    #[test]
    fn test_insert_unknown_column() {
        let session = MockSession::new();
        let err = Inserter::new(&session).values([user(1, "x")]).columns(["email"]).build().unwrap_err();
        assert!(matches!(err, Error::UnknownField { name } if name == "email"));
    }

    #[test]
    fn test_upsert_mysql() {
        let session = MockSession::with_core(Core::new().with_dialect(MySql));
        let query = Inserter::new(&session).values([user(1, "x")]).on_duplicate_key().update([c("name")]).build().unwrap();
        assert_eq!(query.sql, "INSERT INTO `user`(`id`,`name`) VALUES(?,?) ON DUPLICATE KEY UPDATE `name`=VALUES(`name`);");
        assert_eq!(query.args.len(), 2);
    }

    #[test]
    fn test_upsert_mysql_assignment() {
        let session = MockSession::with_core(Core::new().with_dialect(MySql));
        let query = Inserter::new(&session)
            .values([user(1, "x")])
            .on_duplicate_key()
            .update([Assignable::from(c("id")), Assignable::from(assign("name", "y"))])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `user`(`id`,`name`) VALUES(?,?) ON DUPLICATE KEY UPDATE `id`=VALUES(`id`),`name`=?;"
        );
        assert_eq!(query.args, vec![
            Value::Integer(1),
            Value::Text("x".to_string()),
            Value::Text("y".to_string())
        ]);
    }

    #[test]
    fn test_upsert_sqlite() {
        let session = MockSession::with_core(Core::new().with_dialect(Sqlite));
        let query = Inserter::new(&session)
            .values([user(1, "x")])
            .on_duplicate_key()
            .conflict_columns(["id"])
            .update([c("name")])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `user`(`id`,`name`) VALUES(?,?) ON CONFLICT(`id`) DO UPDATE SET `name`=excluded.`name`;"
        );
    }

    #[test]
    fn test_upsert_sqlite_assignment() {
        let session = MockSession::with_core(Core::new().with_dialect(Sqlite));
        let query = Inserter::new(&session)
            .values([user(1, "x")])
            .on_duplicate_key()
            .conflict_columns(["id"])
            .update([assign("name", "y")])
            .build()
            .unwrap();
        assert_eq!(query.sql, "INSERT INTO `user`(`id`,`name`) VALUES(?,?) ON CONFLICT(`id`) DO UPDATE SET `name`=?;");
        assert_eq!(query.args[2], Value::Text("y".to_string()));
    }

    #[test]
    fn test_upsert_without_assignments() {
        for session in [
            MockSession::with_core(Core::new().with_dialect(MySql)),
            MockSession::with_core(Core::new().with_dialect(Sqlite)),
        ] {
            let err = Inserter::new(&session)
                .values([user(1, "x")])
                .on_duplicate_key()
                .conflict_columns(["id"])
                .update(Vec::<Assignable>::new())
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::NoUpdatedColumns));
        }
    }

    #[test]
    fn test_upsert_rejects_raw_assignment() {
        for session in [
            MockSession::with_core(Core::new().with_dialect(MySql)),
            MockSession::with_core(Core::new().with_dialect(Sqlite)),
        ] {
            let err = Inserter::new(&session)
                .values([user(1, "x")])
                .on_duplicate_key()
                .update([raw("`name`=UPPER(`name`)")])
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::UnsupportedAssignableType { .. }));
        }
    }

    #[tokio::test]
    async fn test_insert_exec() {
        let session = MockSession::new();
        let result = Inserter::new(&session).values([user(1, "x")]).exec().await.unwrap();
        assert_eq!(result.rows_affected, 1);

        let statements = session.statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].sql, "INSERT INTO `user`(`id`,`name`) VALUES(?,?);");
    }

    #[tokio::test]
    async fn test_insert_build_error_skips_io() {
        let session = MockSession::new();
        let err = Inserter::<User>::new(&session).exec().await.unwrap_err();
        assert!(matches!(err, Error::InsertZeroRow));
        assert!(session.statements().is_empty());
    }
}
