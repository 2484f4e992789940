use std::fmt;

/// Append-only list of messages produced during a run.
///
/// Every stage receives it by `&mut`; each append is also printed through
/// the `log` facade so progress shows up while the run is going.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    messages: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.messages.push(message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.messages.push(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.messages.push(message);
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// All messages joined by newlines, the persisted log format.
    pub fn to_text(&self) -> String {
        self.messages.join("\n")
    }
}

impl fmt::Display for RunLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
