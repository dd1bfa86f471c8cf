//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting Actix
//! handlers turn domain failures into the `{status: "FAILED", message}`
//! envelope (or the bare `{message}` body for unmatched routes).

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};
use crate::inbound::http::envelope::{FailureEnvelope, NotFoundEnvelope};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message returned in place of internal error details.
pub const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure_envelope(error: &Error) -> FailureEnvelope {
    if matches!(error.code(), ErrorCode::InvalidRequest | ErrorCode::ServiceUnavailable) {
        FailureEnvelope::new(error.message())
            .with_details(error.details().cloned())
            .with_trace_id(error.trace_id().map(str::to_owned))
    } else {
        FailureEnvelope::new(REDACTED_MESSAGE).with_trace_id(error.trace_id().map(str::to_owned))
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        match self.code() {
            ErrorCode::NotFound => builder.json(NotFoundEnvelope {
                message: self.message().to_owned(),
            }),
            ErrorCode::InternalError => {
                error!(message = self.message(), trace_id = ?self.trace_id(), "request failed");
                builder.json(failure_envelope(self))
            }
            _ => builder.json(failure_envelope(self)),
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
