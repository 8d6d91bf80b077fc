//! Per-invocation logging context.
//!
//! Tool handlers receive a [`Context`] and forward it to the transport layer.
//! When the server is running, log messages become `notifications/message`
//! notifications sent to the client. A detached context drops them, so tools
//! never need to special-case "no logger attached".

use tokio::sync::mpsc;

use crate::protocol::LogLevel;

/// A log message queued for delivery to the client.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Cloneable logging handle threaded through tool invocations.
///
/// Logging is best-effort: if the client is gone the message is dropped.
/// `info`/`error` never fail and never block.
#[derive(Debug, Clone, Default)]
pub struct Context {
    tx: Option<mpsc::UnboundedSender<LogEntry>>,
}

impl Context {
    pub(crate) fn new(tx: mpsc::UnboundedSender<LogEntry>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A context with no attached client. All log calls are no-ops.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    /// Emit an informational log message.
    pub fn info(&self, message: impl Into<String>) {
        self.send(LogLevel::Info, message.into());
    }

    /// Emit an error log message.
    pub fn error(&self, message: impl Into<String>) {
        self.send(LogLevel::Error, message.into());
    }

    fn send(&self, level: LogLevel, message: String) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(LogEntry { level, message });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_context_drops_messages() {
        let ctx = Context::detached();
        ctx.info("nothing listens");
        ctx.error("still fine");
    }

    #[test]
    fn attached_context_queues_messages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ctx = Context::new(tx);
        ctx.info("hello");
        ctx.error("boom");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, LogLevel::Info);
        assert_eq!(first.message, "hello");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, LogLevel::Error);
    }
}
