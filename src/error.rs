//! Application error type.
//!
//! Every fallible path in the crate returns `AppError`. The binary maps it to a
//! process exit code, so each error carries the code it should exit with.

/// Failure category. Determines the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid configuration or CLI values.
    Config,
    /// A required input file does not exist.
    MissingInput,
    /// Read/write/serialization failure.
    Io,
    /// Too few valid points to fit a parabola.
    InsufficientData,
    /// Leading coefficient is ~0, so the vertex is undefined.
    DegenerateFit,
    /// Malformed trajectory or duplicate result rows.
    DataIntegrity,
    /// The trajectory integrator gave up.
    Integrator,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::MissingInput | ErrorKind::Io => 2,
            ErrorKind::InsufficientData => 3,
            ErrorKind::DegenerateFit | ErrorKind::DataIntegrity => 4,
            ErrorKind::Integrator => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataIntegrity, message)
    }

    pub fn integrator(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Integrator, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::config("x").exit_code(), 2);
        assert_eq!(AppError::new(ErrorKind::InsufficientData, "x").exit_code(), 3);
        assert_eq!(AppError::new(ErrorKind::DegenerateFit, "x").exit_code(), 4);
        assert_eq!(AppError::integrator("x").exit_code(), 5);
    }
}
