use actix_multipart::form::MultipartForm;
use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpRequest, HttpResponse, Responder, get, patch, post, web};

use crate::auth::{AuthenticatedUser, TOKEN_COOKIE, TokenIssuer};
use crate::dto::MessageResponse;
use crate::dto::users::{LoginResponse, UserDetailsResponse, UserDto, UserUpdatedResponse};
use crate::error_log::ErrorLog;
use crate::forms::users::{
    EditUserForm, EditUserPayload, LoginForm, LoginPayload, RegisterForm, RegisterPayload,
};
use crate::image_host::ImageHost;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::{ServiceError, users};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(probe)
        .service(register)
        .service(login)
        .service(user_details)
        .service(edit_user);
}

#[get("/")]
pub async fn probe() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse::new("OPEN ROUTE: user routes tested"))
}

#[post("/register")]
pub async fn register(
    req: HttpRequest,
    MultipartForm(form): MultipartForm<RegisterForm>,
    repo: web::Data<DieselRepository>,
    host: web::Data<dyn ImageHost>,
    error_log: web::Data<ErrorLog>,
) -> impl Responder {
    let payload = match RegisterPayload::try_from(form) {
        Ok(payload) => payload,
        Err(e) => return error_response(&req, &error_log, e.into()),
    };

    match users::register(payload, repo.get_ref(), host.get_ref()).await {
        Ok(user) => {
            log::info!("Registered user {}", user.id);
            HttpResponse::Created().json(MessageResponse::new("User registered successfully"))
        }
        Err(e) => error_response(&req, &error_log, e),
    }
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    form: web::Json<LoginForm>,
    repo: web::Data<DieselRepository>,
    issuer: web::Data<TokenIssuer>,
    server_config: web::Data<ServerConfig>,
    error_log: web::Data<ErrorLog>,
) -> impl Responder {
    let payload = match LoginPayload::try_from(form.into_inner()) {
        Ok(payload) => payload,
        Err(e) => return error_response(&req, &error_log, e.into()),
    };

    match users::login(payload, repo.get_ref(), &issuer) {
        Ok((token, user)) => {
            let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Strict)
                .secure(server_config.production)
                .max_age(Duration::seconds(issuer.ttl().num_seconds()))
                .finish();

            HttpResponse::Ok().cookie(cookie).json(LoginResponse {
                message: "Login successful".to_string(),
                token,
                user: UserDto::from(user),
            })
        }
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized()
            .json(MessageResponse::new("Invalid email or password")),
        Err(e) => error_response(&req, &error_log, e),
    }
}

#[get("/user-details")]
pub async fn user_details(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    error_log: web::Data<ErrorLog>,
) -> impl Responder {
    match users::get_user_details(user.id, repo.get_ref()) {
        Ok(user) => HttpResponse::Ok().json(UserDetailsResponse {
            message: "User get sucessfully.".to_string(),
            data: UserDto::from(user),
        }),
        Err(ServiceError::NotFound) => {
            HttpResponse::NotFound().json(MessageResponse::new("User not found"))
        }
        Err(e) => error_response(&req, &error_log, e),
    }
}

#[patch("/user-edit")]
pub async fn edit_user(
    req: HttpRequest,
    user: AuthenticatedUser,
    MultipartForm(form): MultipartForm<EditUserForm>,
    repo: web::Data<DieselRepository>,
    host: web::Data<dyn ImageHost>,
    error_log: web::Data<ErrorLog>,
) -> impl Responder {
    let payload = match EditUserPayload::try_from(form) {
        Ok(payload) => payload,
        Err(e) => return error_response(&req, &error_log, e.into()),
    };

    match users::edit_user(user.id, payload, repo.get_ref(), host.get_ref()).await {
        Ok(user) => HttpResponse::Ok().json(UserUpdatedResponse {
            message: "User profile updated successfully".to_string(),
            user: UserDto::from(user),
        }),
        Err(ServiceError::NotFound) => {
            HttpResponse::NotFound().json(MessageResponse::new("User not found"))
        }
        Err(e) => error_response(&req, &error_log, e),
    }
}
