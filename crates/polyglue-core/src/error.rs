//! Error types shared by the reflection layer and the client runtime

use thiserror::Error;

/// Result type alias for polyglue operations
pub type GlueResult<T> = Result<T, GlueError>;

/// Error type for reflection and connection operations
///
/// Reflection variants are returned synchronously to the caller of the
/// reflective operation. `Transport` and `Authentication` are only ever
/// delivered asynchronously through a protocol handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlueError {
    /// A class with this qualified name is already registered
    #[error("duplicate class: {0}")]
    DuplicateClass(String),

    /// No class with this qualified name is registered
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// The field is not declared by the class or its ancestors
    #[error("unknown field {field} on {class}")]
    UnknownField { class: String, field: String },

    /// No method with this name is declared by the class
    #[error("unknown method {method} on {class}")]
    UnknownMethod { class: String, method: String },

    /// Constructor argument count does not match the declared parameters
    #[error("{class} expects {expected} constructor arguments, got {actual}")]
    ArityMismatch {
        class: String,
        expected: usize,
        actual: usize,
    },

    /// The instance does not belong to the adapter's class hierarchy
    #[error("instance of {instance} cannot be used through adapter for {adapter}")]
    InstanceMismatch { adapter: String, instance: String },

    /// A host value did not have the type the native code expected
    #[error("type mismatch for {target}: expected {expected}, got {actual}")]
    TypeMismatch {
        target: String,
        expected: String,
        actual: String,
    },

    /// The class declares no constructor
    #[error("class {0} is not constructible")]
    NotConstructible(String),

    /// The descriptor is malformed
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Connection is not in a valid state for the requested operation
    #[error("invalid connection state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Network or protocol failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The service rejected the session token or returned an unusable payload
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Async runtime error
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl GlueError {
    /// Returns a stable error code for hosts in other languages
    pub fn error_code(&self) -> u32 {
        match self {
            GlueError::DuplicateClass(_) => 1,
            GlueError::UnknownClass(_) => 2,
            GlueError::UnknownField { .. } => 3,
            GlueError::UnknownMethod { .. } => 4,
            GlueError::ArityMismatch { .. } => 5,
            GlueError::InstanceMismatch { .. } => 6,
            GlueError::TypeMismatch { .. } => 7,
            GlueError::NotConstructible(_) => 8,
            GlueError::InvalidDescriptor(_) => 9,
            GlueError::InvalidState { .. } => 10,
            GlueError::Transport(_) => 11,
            GlueError::Authentication(_) => 12,
            GlueError::Serialization(_) => 13,
            GlueError::Config(_) => 14,
            GlueError::Runtime(_) => 15,
            GlueError::Internal(_) => 16,
        }
    }

    /// Create an error from an error code and message
    ///
    /// Structured variants lose their detail fields; the message is kept in
    /// the first string slot.
    pub fn from_code(code: u32, message: String) -> Self {
        match code {
            1 => GlueError::DuplicateClass(message),
            2 => GlueError::UnknownClass(message),
            3 => GlueError::UnknownField {
                class: String::new(),
                field: message,
            },
            4 => GlueError::UnknownMethod {
                class: String::new(),
                method: message,
            },
            5 => GlueError::ArityMismatch {
                class: message,
                expected: 0,
                actual: 0,
            },
            6 => GlueError::InstanceMismatch {
                adapter: String::new(),
                instance: message,
            },
            7 => GlueError::TypeMismatch {
                target: message,
                expected: String::new(),
                actual: String::new(),
            },
            8 => GlueError::NotConstructible(message),
            9 => GlueError::InvalidDescriptor(message),
            10 => GlueError::InvalidState {
                expected: String::new(),
                actual: message,
            },
            11 => GlueError::Transport(message),
            12 => GlueError::Authentication(message),
            13 => GlueError::Serialization(message),
            14 => GlueError::Config(message),
            15 => GlueError::Runtime(message),
            _ => GlueError::Internal(message),
        }
    }

    /// Whether this error is a synchronous reflection failure
    pub fn is_reflection_error(&self) -> bool {
        self.error_code() <= 9
    }
}

impl From<serde_json::Error> for GlueError {
    fn from(err: serde_json::Error) -> Self {
        GlueError::Serialization(err.to_string())
    }
}
