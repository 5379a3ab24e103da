use std::sync::Arc;

use super::database::Database;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::middleware::Middleware;
use crate::model::Registry;
use crate::session::Core;
use crate::valuer::ValueStrategy;

/// What a connection remembers about how its database was opened.
#[derive(Clone, Debug)]
pub(super) struct ConnectionInfo {
    pub(super) path:       String,
    pub(super) mvcc:       bool,
    pub(super) encryption: bool,
}

/// Opens a turso database and configures the ORM layered on top of it.
///
/// ```ignore
/// let conn = Builder::new_local(":memory:")
///     .with_value_strategy(ValueStrategy::Unsafe)
///     .with_middleware(QueryLogBuilder::new().build())
///     .build()
///     .await?
///     .connect()?;
/// ```
pub struct Builder {
    pub(super) path:              String,
    pub(super) enable_mvcc:       bool,
    pub(super) enable_encryption: bool,
    pub(super) vfs:               Option<String>,
    pub(super) encryption_opts:   Option<turso::EncryptionOpts>,
    pub(super) core:              Core,
}

impl Builder {
    pub fn new_local(path: &str) -> Self {
        Self {
            path:              path.to_string(),
            enable_mvcc:       false,
            enable_encryption: false,
            vfs:               None,
            encryption_opts:   None,
            core:              Core::new(),
        }
    }

    pub fn with_mvcc(mut self, mvcc: bool) -> Self {
        self.enable_mvcc = mvcc;
        self
    }

    pub fn experimental_encryption(mut self, encryption_enabled: bool) -> Self {
        self.enable_encryption = encryption_enabled;
        self
    }

    pub fn with_encryption(mut self, opts: turso::EncryptionOpts) -> Self {
        self.encryption_opts = Some(opts);
        self
    }

    pub fn with_io(mut self, vfs: String) -> Self {
        self.vfs = Some(vfs);
        self
    }

    /// SQL dialect used to quote identifiers and render upserts. Defaults to
    /// [`Sqlite`](crate::dialect::Sqlite).
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.core = self.core.with_dialect(dialect);
        self
    }

    pub fn with_value_strategy(mut self, strategy: ValueStrategy) -> Self {
        self.core = self.core.with_value_strategy(strategy);
        self
    }

    /// Appends a middleware; the first one added runs outermost.
    pub fn with_middleware(mut self, middleware: Middleware) -> Self {
        self.core = self.core.with_middleware(middleware);
        self
    }

    /// Shares a model registry, e.g. one with models registered up front.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.core = self.core.with_registry(registry);
        self
    }

    pub async fn build(self) -> Result<Database> {
        let info = ConnectionInfo {
            path:       self.path.clone(),
            mvcc:       self.enable_mvcc,
            encryption: self.enable_encryption,
        };

        let mut turso_builder = turso::Builder::new_local(&self.path);
        turso_builder = turso_builder.with_mvcc(self.enable_mvcc);
        turso_builder = turso_builder.experimental_encryption(self.enable_encryption);

        turso_builder = match self.encryption_opts {
            Some(opts) => turso_builder.with_encryption(opts),
            None => turso_builder,
        };
        turso_builder = match self.vfs {
            Some(vfs) => turso_builder.with_io(vfs),
            None => turso_builder,
        };

        let db = turso_builder.build().await?;

        Ok(Database::new(db, info, self.core))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySql;

    #[tokio::test]
    async fn test_build_carries_connection_info() {
        let db = Builder::new_local(":memory:").with_dialect(MySql).build().await.unwrap();
        assert_eq!(db.core().dialect().name(), "mysql");

        let conn = db.connect().unwrap();
        assert_eq!(conn.path(), ":memory:");
        assert!(!conn.is_mvcc_enabled());
        assert!(!conn.is_encryption_enabled());
    }
}
