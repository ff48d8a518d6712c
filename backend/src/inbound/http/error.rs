//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting handlers
//! turn failures into either the JSON error envelope or the HTML error page,
//! with matching status codes. Server-side failures are redacted before they
//! reach the client; the full message stays in the logs.

use std::fmt;

use actix_web::http::header::{self, ContentType};
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use tracing::error;

use super::templates::{self, ErrorPage};
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for JSON handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Result alias for HTML handlers.
pub type PageResult<T> = Result<T, HtmlError>;

pub(crate) const NO_STORE: &str = "no-store, no-cache, must-revalidate, private, max-age=0";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_server_side(error: &Error) -> Error {
    let message = match error.code() {
        ErrorCode::InternalError => "Internal server error",
        ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        _ => return error.clone(),
    };
    let redacted = Error::new(error.code(), message);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
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

        builder.json(redact_if_server_side(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

/// A domain error rendered as the HTML error page.
#[derive(Debug)]
pub struct HtmlError {
    error: Error,
    method: Method,
    path: String,
}

impl HtmlError {
    /// Attach the request line shown on the error page.
    #[must_use]
    pub fn new(req: &HttpRequest, error: Error) -> Self {
        Self {
            error,
            method: req.method().clone(),
            path: req.path().to_owned(),
        }
    }

    /// The underlying domain error.
    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.error
    }
}

impl fmt::Display for HtmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl ResponseError for HtmlError {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let shown = redact_if_server_side(&self.error);
        let page = ErrorPage {
            title: "Ошибка",
            message: shown.message(),
            status_code: status.as_u16(),
            method: self.method.as_str(),
            path: &self.path,
            trace_id: shown.trace_id(),
        };

        let mut builder = HttpResponse::build(status);
        builder.insert_header((header::CACHE_CONTROL, NO_STORE));
        if let Some(id) = shown.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        match templates::render("error.html", &page) {
            Ok(body) => builder.content_type(ContentType::html()).body(body),
            Err(_) => builder
                .content_type(ContentType::plaintext())
                .body(format!("{} {}", status.as_u16(), shown.message())),
        }
    }
}

/// Convert handler results into HTML errors for the current request.
pub trait HtmlResultExt<T> {
    /// Map the error side into an [`HtmlError`].
    ///
    /// # Errors
    /// Returns the original error wrapped for HTML rendering.
    fn or_page(self, req: &HttpRequest) -> PageResult<T>;
}

impl<T> HtmlResultExt<T> for Result<T, Error> {
    fn or_page(self, req: &HttpRequest) -> PageResult<T> {
        self.map_err(|error| HtmlError::new(req, error))
    }
}

/// JSON body extractor configuration producing the error envelope.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed JSON body: {err}")).into()
    })
}

/// Query string extractor configuration producing the error envelope.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed query string: {err}")).into()
    })
}

/// Form extractor configuration. Forms are only posted by HTML pages, so
/// failures render the error page.
#[must_use]
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, req| {
        HtmlError::new(req, Error::invalid_request(format!("malformed form: {err}"))).into()
    })
}

/// Default service for JSON resources hit with an unsupported method.
///
/// # Errors
/// Always returns `method_not_allowed`.
pub async fn method_not_allowed(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Error::method_not_allowed(format!(
        "{} is not allowed on {}",
        req.method(),
        req.path()
    )))
}

/// Default service for HTML resources hit with an unsupported method.
///
/// # Errors
/// Always returns `method_not_allowed` rendered as a page.
pub async fn page_method_not_allowed(req: HttpRequest) -> PageResult<HttpResponse> {
    let error = Error::method_not_allowed(format!(
        "{} is not allowed on {}",
        req.method(),
        req.path()
    ));
    Err(HtmlError::new(&req, error))
}

/// Application default service: JSON 404 under `/api/`, an error page
/// elsewhere.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    let error = Error::not_found(format!("no route for {}", req.path()));
    if req.path().starts_with("/api/") {
        error.error_response()
    } else {
        HtmlError::new(&req, error).error_response()
    }
}
