use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Operation canceled")]
    Canceled,

    #[error("Missing required dependency: {0}")]
    InvalidDependency(&'static str),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<UserError>,
    },
}

pub type UserResult<T> = Result<T, UserError>;

/// Classification callers branch on. Diagnostic wrapping never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Canceled,
    InvalidDependency,
    Internal,
}

impl UserError {
    /// Wrap this error with the name of the call site.
    pub fn context(self, context: &'static str) -> Self {
        UserError::Context {
            context,
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UserError::NotFound(_) => ErrorKind::NotFound,
            UserError::Canceled => ErrorKind::Canceled,
            UserError::InvalidDependency(_) => ErrorKind::InvalidDependency,
            UserError::Transport(_) | UserError::UnexpectedStatus { .. } => ErrorKind::Internal,
            UserError::Context { source, .. } => source.kind(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_canceled(&self) -> bool {
        self.kind() == ErrorKind::Canceled
    }

    /// The innermost error, with every context layer stripped.
    pub fn root(&self) -> &UserError {
        match self {
            UserError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Adds call-site context to a `UserResult`.
pub trait ResultExt<T> {
    fn context(self, context: &'static str) -> UserResult<T>;
}

impl<T> ResultExt<T> for UserResult<T> {
    fn context(self, context: &'static str) -> UserResult<T> {
        self.map_err(|e| e.context(context))
    }
}

/// Convert UserError to AppError for standardized error responses.
///
/// Only `NotFound` gets a dedicated status; everything else is a generic failure.
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err.root() {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            _ => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
