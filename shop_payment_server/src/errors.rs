use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shop_payment_engine::traits::StorefrontError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Cannot place an order from an empty cart.")]
    EmptyCart,
    #[error("Could not place the order. {0}")]
    PlacementFailed(String),
    #[error("Payment gateway error. {0}")]
    GatewayError(String),
    #[error("Invalid webhook data. {0}")]
    WebhookDataError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyCart => StatusCode::BAD_REQUEST,
            Self::PlacementFailed(_) => StatusCode::BAD_REQUEST,
            Self::GatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::WebhookDataError(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Auth token not provided.")]
    MissingToken,
    #[error("Auth token is invalid. {0}")]
    ValidationError(String),
    #[error("Auth token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<StorefrontError> for ServerError {
    fn from(e: StorefrontError) -> Self {
        match e {
            StorefrontError::ProductNotFound(_)
            | StorefrontError::CartNotFound(_)
            | StorefrontError::CartItemNotFound { .. }
            | StorefrontError::OrderNotFound(_)
            | StorefrontError::OrderIdNotFound(_) => Self::NoRecordFound(e.to_string()),
            StorefrontError::InvalidQuantity(_) => Self::InvalidRequestBody(e.to_string()),
            StorefrontError::EmptyCart => Self::EmptyCart,
            StorefrontError::PlacementFailed(cause) => Self::PlacementFailed(cause),
            StorefrontError::PaymentGateway(e) => Self::GatewayError(e.to_string()),
            StorefrontError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
