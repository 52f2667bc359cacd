use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug)]
pub struct ServiceError {
    pub code: u16,
    err: anyhow::Error,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ServiceError {
    pub fn new(code: u16, err: impl Into<anyhow::Error>) -> Self {
        Self {
            code,
            err: err.into(),
        }
    }

    /// Outermost message of the error chain, the only part sent to callers.
    pub fn message(&self) -> String {
        self.err.to_string()
    }

    pub fn inner(&self) -> &anyhow::Error {
        &self.err
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ServiceError({}): {}", self.code, self.err)
    }
}

impl actix_web::error::ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{:?}", self.err);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.message(),
        })
    }
}

impl<E: Into<anyhow::Error>> From<E> for ServiceError {
    fn from(err: E) -> ServiceError {
        ServiceError {
            code: 500,
            err: err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

pub trait AddCode {
    type Output;
    fn code(self, code: u16) -> Self::Output;
}

impl AddCode for anyhow::Error {
    type Output = ServiceError;

    fn code(self, code: u16) -> ServiceError {
        ServiceError { code, err: self }
    }
}

impl<T, E: Into<anyhow::Error>> AddCode for std::result::Result<T, E> {
    type Output = Result<T>;

    fn code(self, code: u16) -> Result<T> {
        self.map_err(|err| ServiceError {
            code,
            err: err.into(),
        })
    }
}
