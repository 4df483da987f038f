//! Logging seam for the engine.
//!
//! The engine never installs a global subscriber; callers pick a logger
//! through [`PatcherOptions`](crate::PatcherOptions).

pub trait PatchLogger: Send + Sync {
    fn error(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Discards everything. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl PatchLogger for NoopLogger {
    fn error(&self, _message: &str) {}
    fn debug(&self, _message: &str) {}
}

/// Forwards to the `tracing` macros under the `scim_patch` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PatchLogger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "scim_patch", "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "scim_patch", "{message}");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::PatchLogger;

    /// Records messages as `"<level>: <message>"`.
    #[derive(Debug, Default)]
    pub struct RecordingLogger {
        pub lines: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().map(|l| l.clone()).unwrap_or_default()
        }
    }

    impl PatchLogger for RecordingLogger {
        fn error(&self, message: &str) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(format!("error: {message}"));
            }
        }

        fn debug(&self, message: &str) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(format!("debug: {message}"));
            }
        }
    }
}
