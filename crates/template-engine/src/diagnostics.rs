//! The four-channel structured logging surface (§4.7), modeled as a trait so
//! alternate sinks can be swapped in — the same shape as a VM tracer being
//! swapped for a profiling or recording variant in an interpreter.

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    SyntaxWarning,
    RuntimeWarning,
    InternalError,
    RegistrationWarning,
    RegistrationError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub channel: Channel,
    /// The invocation or definition name this event concerns, empty if n/a.
    pub subject: String,
    pub message: String,
}

/// Four named channels. Unknown-macro is deliberately absent: §7 specifies
/// it is never logged.
pub trait Diagnostics: Send + Sync {
    fn syntax_warning(&self, phase: &str, issues: &[SyntaxIssue], input: &str);
    fn runtime_warning(&self, subject: &str, message: &str);
    fn internal_error(&self, subject: &str, message: &str);
    fn registration_warning(&self, subject: &str, message: &str);
    fn registration_error(&self, subject: &str, message: &str);
}

/// Discards everything. Useful for benchmarks and fuzz targets where
/// formatting diagnostics would dominate the measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn syntax_warning(&self, _phase: &str, _issues: &[SyntaxIssue], _input: &str) {}
    fn runtime_warning(&self, _subject: &str, _message: &str) {}
    fn internal_error(&self, _subject: &str, _message: &str) {}
    fn registration_warning(&self, _subject: &str, _message: &str) {}
    fn registration_error(&self, _subject: &str, _message: &str) {}
}

/// Human-readable sink to stderr; the default for the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
    fn syntax_warning(&self, phase: &str, issues: &[SyntaxIssue], _input: &str) {
        for issue in issues {
            eprintln!(
                "templex: syntax warning ({phase}) at {}:{}: {}",
                issue.line, issue.column, issue.message
            );
        }
    }

    fn runtime_warning(&self, subject: &str, message: &str) {
        eprintln!("templex: runtime warning [{subject}]: {message}");
    }

    fn internal_error(&self, subject: &str, message: &str) {
        eprintln!("templex: internal error [{subject}]: {message}");
    }

    fn registration_warning(&self, subject: &str, message: &str) {
        eprintln!("templex: registration warning [{subject}]: {message}");
    }

    fn registration_error(&self, subject: &str, message: &str) {
        eprintln!("templex: registration error [{subject}]: {message}");
    }
}

/// In-memory sink for tests: every event is appended, nothing is printed.
#[derive(Default)]
pub struct CollectingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CollectingDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().expect("diagnostics mutex poisoned").clone()
    }

    fn push(&self, channel: Channel, subject: &str, message: &str) {
        self.events
            .lock()
            .expect("diagnostics mutex poisoned")
            .push(DiagnosticEvent { channel, subject: subject.to_string(), message: message.to_string() });
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn syntax_warning(&self, phase: &str, issues: &[SyntaxIssue], _input: &str) {
        for issue in issues {
            self.push(Channel::SyntaxWarning, phase, &issue.message);
        }
    }

    fn runtime_warning(&self, subject: &str, message: &str) {
        self.push(Channel::RuntimeWarning, subject, message);
    }

    fn internal_error(&self, subject: &str, message: &str) {
        self.push(Channel::InternalError, subject, message);
    }

    fn registration_warning(&self, subject: &str, message: &str) {
        self.push(Channel::RegistrationWarning, subject, message);
    }

    fn registration_error(&self, subject: &str, message: &str) {
        self.push(Channel::RegistrationError, subject, message);
    }
}
