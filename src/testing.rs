//! Shared test entities and an in-memory [`Session`] that records statements

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Error;
use crate::error::Result;
use crate::query::Query;
use crate::session::Core;
use crate::session::ExecResult;
use crate::session::RowCursor;
use crate::session::Session;
use crate::value::Value;

#[derive(Clone, Debug, Default, PartialEq, crate::Entity)]
pub struct TestModel {
    pub id:         i64,
    pub first_name: String,
    pub age:        i8,
    pub last_name:  Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, crate::Entity)]
pub struct User {
    pub id:   i64,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, crate::Entity)]
pub struct Order {
    pub id:         i64,
    pub using_col1: String,
    pub using_col2: String,
}

#[derive(Clone, Debug, Default, PartialEq, crate::Entity)]
pub struct OrderDetail {
    pub order_id:   i64,
    pub item_id:    i64,
    pub using_col1: String,
    pub using_col2: String,
}

struct MockRows {
    columns: Vec<String>,
    rows:    VecDeque<Vec<Value>>,
}

#[async_trait]
impl RowCursor for MockRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}

#[derive(Default)]
struct MockState {
    results:       VecDeque<std::result::Result<MockRows, String>>,
    exec_failures: HashMap<String, String>,
    statements:    Vec<Query>,
}

/// A session that answers queries from a script.
///
/// Every statement is recorded. Queries pop the next scripted row set (or an
/// empty one); execs report one affected row unless a failure was registered
/// for that exact SQL.
#[derive(Clone)]
pub struct MockSession {
    core:  Arc<Core>,
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::with_core(Core::new())
    }

    pub fn with_core(core: Core) -> Self {
        Self { core: Arc::new(core), state: Arc::new(Mutex::new(MockState::default())) }
    }

    pub fn core_ref(&self) -> &Core {
        &self.core
    }

    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<Value>>) {
        let rows = MockRows { columns: columns.iter().map(|c| c.to_string()).collect(), rows: rows.into() };
        self.state.lock().unwrap().results.push_back(Ok(rows));
    }

    pub fn push_error(&self, message: &str) {
        self.state.lock().unwrap().results.push_back(Err(message.to_string()));
    }

    pub fn fail_exec(&self, sql: &str, message: &str) {
        self.state.lock().unwrap().exec_failures.insert(sql.to_string(), message.to_string());
    }

    pub fn statements(&self) -> Vec<Query> {
        self.state.lock().unwrap().statements.clone()
    }
}

#[async_trait]
impl Session for MockSession {
    fn core(&self) -> &Arc<Core> {
        &self.core
    }

    async fn query_context(&self, sql: &str, args: Vec<Value>) -> Result<Box<dyn RowCursor>> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(Query { sql: sql.to_string(), args });
        match state.results.pop_front() {
            Some(Ok(rows)) => Ok(Box::new(rows)),
            Some(Err(message)) => Err(Error::Unknown(message)),
            None => Ok(Box::new(MockRows { columns: Vec::new(), rows: VecDeque::new() })),
        }
    }

    async fn exec_context(&self, sql: &str, args: Vec<Value>) -> Result<ExecResult> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(Query { sql: sql.to_string(), args });
        match state.exec_failures.get(sql) {
            Some(message) => Err(Error::Unknown(message.clone())),
            None => Ok(ExecResult { rows_affected: 1, last_insert_id: 0 }),
        }
    }
}
