use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::dto::MessageResponse;
use crate::dto::questions::{
    BulkUploadResponse, CategoryGroupDto, CategoryWiseResponse, QuestionCreatedResponse,
    QuestionDto,
};
use crate::error_log::ErrorLog;
use crate::forms::import_export::BulkUploadForm;
use crate::forms::questions::{AddQuestionForm, AddQuestionPayload, CategoryWiseQuery};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::{import_export, questions};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(probe)
        .service(add_single_question)
        .service(category_wise_question)
        .service(bulk_add_question);
}

#[get("/")]
pub async fn probe() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse::new("OPEN ROUTE: Question routes tested"))
}

#[post("/add-single-question")]
pub async fn add_single_question(
    req: HttpRequest,
    user: AuthenticatedUser,
    form: web::Json<AddQuestionForm>,
    repo: web::Data<DieselRepository>,
    error_log: web::Data<ErrorLog>,
) -> impl Responder {
    let payload = match AddQuestionPayload::try_from(form.into_inner()) {
        Ok(payload) => payload,
        Err(e) => return error_response(&req, &error_log, e.into()),
    };

    match questions::add_question(user.id, payload, repo.get_ref()) {
        Ok(question) => HttpResponse::Created().json(QuestionCreatedResponse {
            message: "Question added successfully".to_string(),
            question: QuestionDto::from(question),
        }),
        Err(e) => error_response(&req, &error_log, e),
    }
}

#[get("/category-wise-question")]
pub async fn category_wise_question(
    req: HttpRequest,
    user: AuthenticatedUser,
    params: web::Query<CategoryWiseQuery>,
    repo: web::Data<DieselRepository>,
    error_log: web::Data<ErrorLog>,
) -> impl Responder {
    match questions::category_wise_questions(user.id, params.category(), repo.get_ref()) {
        Ok(items) => HttpResponse::Ok().json(CategoryWiseResponse {
            message: "Category-wise questions retrieved successfully".to_string(),
            data: CategoryGroupDto::group(items),
        }),
        Err(e) => error_response(&req, &error_log, e),
    }
}

#[post("/bulk-add-question")]
pub async fn bulk_add_question(
    req: HttpRequest,
    user: AuthenticatedUser,
    MultipartForm(mut form): MultipartForm<BulkUploadForm>,
    repo: web::Data<DieselRepository>,
    error_log: web::Data<ErrorLog>,
) -> impl Responder {
    match import_export::upload_questions(user.id, &mut form, repo.get_ref()) {
        Ok(report) => {
            log::info!(
                "User {} uploaded {} rows: {} stored, {} skipped",
                user.id,
                report.total_rows,
                report.created,
                report.skipped
            );
            HttpResponse::Ok().json(BulkUploadResponse::from(report))
        }
        Err(e) => error_response(&req, &error_log, e),
    }
}
