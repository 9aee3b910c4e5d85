use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use garments_engine::{
    errors::ErrorKind,
    guard::DenyReason,
    AccountApiError,
    CatalogApiError,
    InventoryError,
    ReportError,
};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("Could not read request query: {0}")]
    InvalidRequestQuery(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Access denied. {0}")]
    AccessDenied(#[from] DenyReason),
    /// A failure reported by one of the engine APIs. The kind is carried along so that it survives into the response.
    #[error("{message}")]
    EngineError { kind: ErrorKind, message: String },
}

impl ServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InitializeError(_) | Self::IOError(_) | Self::ConfigurationError(_) | Self::Unspecified(_) => {
                ErrorKind::Internal
            },
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) | Self::InvalidRequestQuery(_) => {
                ErrorKind::InvalidInput
            },
            Self::NoRecordFound(_) => ErrorKind::NotFound,
            Self::AuthenticationError(e) => e.kind(),
            Self::AccessDenied(DenyReason::NotAuthenticated) => ErrorKind::Unauthorized,
            Self::AccessDenied(_) => ErrorKind::Forbidden,
            Self::EngineError { kind, .. } => *kind,
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput
            | ErrorKind::InvalidQuantity
            | ErrorKind::InsufficientStock
            | ErrorKind::InvalidTransition => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ Request failed with {status}. {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string(), "kind": self.kind() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No account is registered for {0}.")]
    AccountNotFound(String),
    #[error("Could not issue an access token. {0}")]
    CouldNotIssueToken(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound(_) => ErrorKind::Unauthorized,
            AuthError::CouldNotIssueToken(_) => ErrorKind::Internal,
        }
    }
}

macro_rules! engine_error {
    ($err:ty) => {
        impl From<$err> for ServerError {
            fn from(e: $err) -> Self {
                Self::EngineError { kind: e.kind(), message: e.to_string() }
            }
        }
    };
}

engine_error!(AccountApiError);
engine_error!(CatalogApiError);
engine_error!(InventoryError);
engine_error!(ReportError);
