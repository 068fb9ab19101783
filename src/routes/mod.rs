use std::fmt::Display;

use actix_multipart::form::MultipartFormConfig;
use actix_web::error::InternalError;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::dto::{ErrorResponse, MessageResponse};
use crate::error_log::ErrorLog;
use crate::services::ServiceError;

pub mod questions;
pub mod users;

pub const UPLOAD_FAILED: &str = "Failed to upload profile picture";

/// Registers both API scopes and JSON error handlers for extractors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(
            MultipartFormConfig::default()
                .total_limit(12 * 1024 * 1024)
                .error_handler(|err, _| bad_request(err)),
        )
        .service(web::scope("/api/v1/user").configure(users::configure))
        .service(web::scope("/api/v1/question").configure(questions::configure));
}

fn bad_request<E: Display>(err: E) -> actix_web::Error {
    let message = err.to_string();
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(MessageResponse::new(message)),
    )
    .into()
}

/// Records an unexpected failure and answers with the generic 500 body.
pub fn internal_error(req: &HttpRequest, error_log: &ErrorLog, error: &dyn Display) -> HttpResponse {
    let route = format!("{} {}", req.method(), req.path());
    log::error!("Request to {route} failed: {error}");
    if let Err(e) = error_log.record(&route, error) {
        log::error!("Failed to write error record to {}: {e}", error_log.dir().display());
    }
    HttpResponse::InternalServerError().json(ErrorResponse::internal())
}

/// Maps a service error to its HTTP response.
///
/// Handlers match the cases whose message depends on the route and pass the
/// rest through here.
pub fn error_response(req: &HttpRequest, error_log: &ErrorLog, err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Form(message)
        | ServiceError::TypeConstraint(message)
        | ServiceError::Conflict(message) => {
            HttpResponse::BadRequest().json(MessageResponse::new(message))
        }
        ServiceError::Unauthorized => HttpResponse::Unauthorized().json(MessageResponse::new(
            "Unauthorized: invalid or missing token",
        )),
        ServiceError::NotFound => {
            HttpResponse::NotFound().json(MessageResponse::new("Not found"))
        }
        ServiceError::Upload(ref message) => {
            let route = format!("{} {}", req.method(), req.path());
            if let Err(e) = error_log.record(&route, message) {
                log::error!("Failed to write error record: {e}");
            }
            HttpResponse::InternalServerError().json(MessageResponse::new(UPLOAD_FAILED))
        }
        ServiceError::Internal(ref message) => internal_error(req, error_log, message),
    }
}
