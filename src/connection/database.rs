use std::sync::Arc;

use super::Connection;
use super::builder::ConnectionInfo;
use crate::error::Result;
use crate::session::Core;

/// An opened database. Every connection made from it shares the same ORM
/// [`Core`], so models are parsed once per database.
#[derive(Clone)]
pub struct Database {
    db:   turso::Database,
    info: ConnectionInfo,
    core: Arc<Core>,
}

impl Database {
    pub(super) fn new(db: turso::Database, info: ConnectionInfo, core: Core) -> Self {
        Self { db, info, core: Arc::new(core) }
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn connect(self) -> Result<Connection> {
        let conn = self.db.connect()?;
        tracing::debug!(path = %self.info.path, dialect = self.core.dialect().name(), "connected");
        Ok(Connection::new(conn, self.info, self.core))
    }
}
