//! User-facing notifications ("toasts").
//!
//! Pages and effect handlers report outcomes through a [`Notifier`]; the CLI
//! prints them, tests record them.

use parking_lot::Mutex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastKind::Success => write!(f, "success"),
            ToastKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub timestamp: String,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Marker used when printing to a terminal
    pub fn icon(&self) -> &'static str {
        match self.kind {
            ToastKind::Success => "[OK]",
            ToastKind::Error => "[!!]",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.notify(Toast::new(ToastKind::Success, message));
    }

    fn error(&self, message: &str) {
        self.notify(Toast::new(ToastKind::Error, message));
    }
}

/// Prints each toast to stderr as it arrives
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        tracing::debug!(kind = %toast.kind, message = %toast.message, "Toast");
        eprintln!("{} {}", toast.icon(), toast.message);
    }
}

/// Keeps every toast in memory
#[derive(Debug, Default)]
pub struct ToastLog {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    fn messages_of(&self, kind: ToastKind) -> Vec<String> {
        self.toasts
            .lock()
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.message.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages_of(ToastKind::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.messages_of(ToastKind::Success)
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock())
    }
}

impl Notifier for ToastLog {
    fn notify(&self, toast: Toast) {
        tracing::debug!(kind = %toast.kind, message = %toast.message, "Toast");
        self.toasts.lock().push(toast);
    }
}
