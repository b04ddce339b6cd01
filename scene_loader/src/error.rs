use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use manifest::ManifestError;
use serde::Serialize;
use wavefront::WavefrontError;

#[derive(Debug, thiserror::Error)]
pub enum SceneLoaderError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid asset location: {0}")]
    InvalidLocation(String),

    #[error("I/O error reading {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error fetching {location}: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} fetching {location}")]
    HttpStatus { location: String, status: u16 },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Error loading MTL '{location}': {source}")]
    MtlParse {
        location: String,
        #[source]
        source: WavefrontError,
    },

    #[error("Error loading MTL '{location}': Invalid materials")]
    InvalidMaterials { location: String },

    #[error("Error loading OBJ '{location}': {source}")]
    ObjParse {
        location: String,
        #[source]
        source: WavefrontError,
    },

    #[error("Invalid time value: {0}")]
    InvalidTime(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ResponseError for SceneLoaderError {
    fn status_code(&self) -> StatusCode {
        match self {
            SceneLoaderError::NotFound(_) => StatusCode::NOT_FOUND,
            SceneLoaderError::InvalidLocation(_) => StatusCode::BAD_REQUEST,
            SceneLoaderError::InvalidTime(_) => StatusCode::BAD_REQUEST,
            SceneLoaderError::Manifest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SceneLoaderError::MtlParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SceneLoaderError::InvalidMaterials { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SceneLoaderError::ObjParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SceneLoaderError::Http { .. } => StatusCode::BAD_GATEWAY,
            SceneLoaderError::HttpStatus { .. } => StatusCode::BAD_GATEWAY,
            SceneLoaderError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SceneLoaderError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SceneLoaderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_response = ErrorResponse {
            success: false,
            error: self.to_string(),
        };

        HttpResponse::build(status).json(error_response)
    }
}

pub type Result<T> = std::result::Result<T, SceneLoaderError>;
