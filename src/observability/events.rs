//! Observable events
//!
//! Every log line carries one of these names. Names are stable and
//! upper snake case.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    StartupBegin,
    ConfigLoaded,
    StoreOpened,
    Serving,
    ShutdownStart,
    StoreClosed,
    ShutdownComplete,
    /// Startup could not complete
    StartupFailed,

    // Student records
    StudentCreated,
    StudentUpdated,
    StudentDeleted,
    StudentsListed,
    StudentFetched,
    SummaryComputed,
    /// Validation, duplicate key or missing record
    StudentRequestRejected,
    /// Persistence failed
    StoreFault,

    // Auth
    UserRegistered,
    LoginSucceeded,
    LoginFailed,
    TokenRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StartupBegin => "ROSTER_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::Serving => "ROSTER_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::StoreClosed => "STORE_CLOSED",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::StartupFailed => "STARTUP_FAILED",

            Event::StudentCreated => "STUDENT_CREATED",
            Event::StudentUpdated => "STUDENT_UPDATED",
            Event::StudentDeleted => "STUDENT_DELETED",
            Event::StudentsListed => "STUDENTS_LISTED",
            Event::StudentFetched => "STUDENT_FETCHED",
            Event::SummaryComputed => "SUMMARY_COMPUTED",
            Event::StudentRequestRejected => "STUDENT_REQUEST_REJECTED",
            Event::StoreFault => "STORE_FAULT",

            Event::UserRegistered => "USER_REGISTERED",
            Event::LoginSucceeded => "LOGIN_SUCCEEDED",
            Event::LoginFailed => "LOGIN_FAILED",
            Event::TokenRejected => "TOKEN_REJECTED",
        }
    }

    /// Default severity when logged through `Logger::event`
    pub fn severity(&self) -> Severity {
        match self {
            Event::StartupFailed => Severity::Fatal,
            Event::StoreFault => Severity::Error,
            Event::StudentRequestRejected | Event::LoginFailed | Event::TokenRejected => {
                Severity::Warn
            }
            _ => Severity::Info,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
