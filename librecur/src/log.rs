use tracing::Level;

/// Diagnostic sink handed to the components that report progress.
///
/// `component` names the reporting part (e.g. `Schedule`) and is used as the
/// message prefix; `None` is shown as `?`.
pub trait Logger {
    fn log(&self, level: Level, component: Option<&str>, message: &str);
}

/// Forwards diagnostics to the `tracing` subscriber installed by the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, component: Option<&str>, message: &str) {
        let component = component.unwrap_or("?");
        match level {
            Level::ERROR => tracing::error!(component, "{}: {}", component, message),
            Level::WARN => tracing::warn!(component, "{}: {}", component, message),
            Level::INFO => tracing::info!(component, "{}: {}", component, message),
            Level::DEBUG => tracing::debug!(component, "{}: {}", component, message),
            _ => tracing::trace!(component, "{}: {}", component, message),
        }
    }
}
