use std::sync::Arc;

use super::Handler;
use super::Middleware;
use super::handler;
use super::middleware;
use crate::value::Value;

type LogFn = Arc<dyn Fn(&str, &[Value]) + Send + Sync>;

/// Logs every statement's SQL and arguments before it runs.
///
/// By default statements go to `tracing` at debug level. A statement that
/// fails to build is not executed; the build error is returned instead.
#[derive(Clone)]
pub struct QueryLogBuilder {
    log_fn: LogFn,
}

impl Default for QueryLogBuilder {
    fn default() -> Self {
        Self {
            log_fn: Arc::new(|sql: &str, args: &[Value]| {
                tracing::debug!(sql = %sql, args = ?args, "query");
            }),
        }
    }
}

impl QueryLogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_fn<F>(mut self, log_fn: F) -> Self
    where F: Fn(&str, &[Value]) + Send + Sync + 'static {
        self.log_fn = Arc::new(log_fn);
        self
    }

    pub fn build(self) -> Middleware {
        let log_fn = self.log_fn;
        middleware(move |next: Handler| {
            let log_fn = Arc::clone(&log_fn);
            handler(move |ctx| {
                let next = next.clone();
                let built = ctx.builder.build();
                if let Ok(query) = &built {
                    log_fn(&query.sql, &query.args);
                }
                async move {
                    built?;
                    next(ctx).await
                }
            })
        })
    }
}
