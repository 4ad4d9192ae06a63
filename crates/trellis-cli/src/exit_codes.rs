//! Exit codes for the trellis CLI.
//!
//! Codes are a stable contract for scripts and automation:
//! - 0: clean run
//! - 2: the input could not be accepted (bad model file, bad evidence,
//!   failed precondition)
//! - 1: internal or I/O failure

/// Exit codes for trellis invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Clean run.
    Clean = 0,

    /// Internal or I/O failure.
    InternalError = 1,

    /// The user's input could not be accepted.
    InputError = 2,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Stable code name for machine-readable output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::InputError => "ERR_INPUT",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
