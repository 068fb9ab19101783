use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test, web};
use async_trait::async_trait;
use diesel::RunQueryDsl;
use serde_json::{Value, json};
use tempfile::TempDir;

use quiz_bank::auth::TokenIssuer;
use quiz_bank::domain::types::ImageUrl;
use quiz_bank::error_log::ErrorLog;
use quiz_bank::image_host::{ImageHost, ImageHostError};
use quiz_bank::models::config::{CloudinaryConfig, ServerConfig};
use quiz_bank::repository::DieselRepository;
use quiz_bank::routes;

mod common;

const BOUNDARY: &str = "----quizbankboundary";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Default)]
struct FakeImageHost {
    uploads: Mutex<usize>,
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, _bytes: Vec<u8>) -> Result<ImageUrl, ImageHostError> {
        let mut uploads = self.uploads.lock().unwrap();
        *uploads += 1;
        Ok(ImageUrl::new(format!("https://images.test/user_profiles/p{uploads}.png")).unwrap())
    }

    async fn delete(&self, _url: &ImageUrl) -> Result<(), ImageHostError> {
        Ok(())
    }
}

struct TestContext {
    db: common::TestDb,
    log_dir: TempDir,
    issuer: web::Data<TokenIssuer>,
    host: web::Data<dyn ImageHost>,
    config: web::Data<ServerConfig>,
}

impl TestContext {
    fn new() -> Self {
        let log_dir = tempfile::tempdir().expect("temp dir");
        let config = ServerConfig {
            address: "127.0.0.1".into(),
            port: 0,
            database_url: String::new(),
            jwt_secret: "test-secret".into(),
            token_ttl_secs: 3600,
            production: false,
            cors_origin: "http://localhost:3000".into(),
            error_log_dir: log_dir.path().display().to_string(),
            cloudinary: CloudinaryConfig {
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
                folder: "user_profiles".into(),
            },
        };
        Self {
            db: common::TestDb::new(),
            issuer: web::Data::new(TokenIssuer::new(b"test-secret", 3600)),
            host: web::Data::from(Arc::new(FakeImageHost::default()) as Arc<dyn ImageHost>),
            config: web::Data::new(config),
            log_dir,
        }
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(DieselRepository::new($ctx.db.pool())))
                .app_data($ctx.issuer.clone())
                .app_data($ctx.host.clone())
                .app_data(web::Data::new(ErrorLog::new($ctx.log_dir.path())))
                .app_data($ctx.config.clone())
                .configure(routes::configure),
        )
        .await
    };
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

fn multipart(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(method: &str, uri: &str, parts: &[Part]) -> test::TestRequest {
    let request = match method {
        "PATCH" => test::TestRequest::patch(),
        _ => test::TestRequest::post(),
    };
    request
        .uri(uri)
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart(parts))
}

fn register_request(username: &str, email: &str) -> test::TestRequest {
    multipart_request(
        "POST",
        "/api/v1/user/register",
        &[
            Part::Text("username", username),
            Part::Text("password", "s3cret"),
            Part::Text("email", email),
        ],
    )
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

macro_rules! register_and_login {
    ($app:expr, $username:expr, $email:expr) => {{
        let resp = test::call_service(&$app, register_request($username, $email).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let resp = test::call_service(
            &$app,
            test::TestRequest::post()
                .uri("/api/v1/user/login")
                .set_json(json!({ "email": $email, "password": "s3cret" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["token"].as_str().expect("token").to_string()
    }};
}

#[actix_web::test]
async fn probes_answer_without_authentication() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/user/").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "OPEN ROUTE: user routes tested");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/question/").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "OPEN ROUTE: Question routes tested");
}

#[actix_web::test]
async fn second_registration_with_same_email_fails() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(&app, register_request("alice", "alice@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User registered successfully");

    let resp = test::call_service(&app, register_request("alice2", "alice@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User already exists");

    let resp = test::call_service(&app, register_request("alice", "other@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Username already taken");
}

#[actix_web::test]
async fn registration_requires_username_first() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = multipart_request(
        "POST",
        "/api/v1/user/register",
        &[Part::Text("email", "alice@example.com")],
    );
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Username is required");
}

#[actix_web::test]
async fn login_returns_token_and_sets_cookie() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    test::call_service(&app, register_request("alice", "alice@example.com").to_request()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/login")
            .set_json(json!({ "email": "alice@example.com", "password": "s3cret" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "token")
        .expect("token cookie")
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["token"].as_str(), Some(cookie.value()));
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[actix_web::test]
async fn bad_credentials_are_rejected_without_token() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    test::call_service(&app, register_request("alice", "alice@example.com").to_request()).await;

    for (email, password) in [
        ("alice@example.com", "wrong"),
        ("nobody@example.com", "s3cret"),
    ] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/user/login")
                .set_json(json!({ "email": email, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.response().cookies().next().is_none());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid email or password");
        assert!(body.get("token").is_none());
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user/login")
            .set_json(json!({ "email": "alice@example.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Email and password are required");
}

#[actix_web::test]
async fn user_details_accepts_header_or_cookie() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/user/user-details")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Unauthorized: invalid or missing token");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/user/user-details")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User get sucessfully.");
    assert_eq!(body["data"]["email"], "alice@example.com");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/user/user-details")
            .cookie(actix_web::cookie::Cookie::new("token", token.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn edit_user_uploads_new_picture() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    let req = multipart_request(
        "PATCH",
        "/api/v1/user/user-edit",
        &[
            Part::Text("username", "alice2"),
            Part::Text("email", "alice2@example.com"),
            Part::File {
                name: "profilePicture",
                file_name: "me.png",
                content_type: "image/png",
                bytes: &[0x89, b'P', b'N', b'G'],
            },
        ],
    )
    .insert_header(bearer(&token));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User profile updated successfully");
    assert_eq!(body["user"]["username"], "alice2");
    assert_eq!(
        body["user"]["profilePicture"],
        "https://images.test/user_profiles/p1.png"
    );

    let req = multipart_request(
        "PATCH",
        "/api/v1/user/user-edit",
        &[Part::Text("username", "alice3")],
    )
    .insert_header(bearer(&token));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Username and email are required");
}

#[actix_web::test]
async fn bulk_upload_reports_raw_row_count() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    let csv = b"questionText,categories\n2+2=?,\"MATH, BASIC\"\n,MATH\n";
    let req = multipart_request(
        "POST",
        "/api/v1/question/bulk-add-question",
        &[Part::File {
            name: "file",
            file_name: "questions.csv",
            content_type: "text/csv",
            bytes: csv,
        }],
    )
    .insert_header(bearer(&token));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Questions added successfully");
    assert_eq!(body["totalQuestions"], 2);
    assert_eq!(body["insertedQuestions"], 1);
    assert_eq!(body["skippedRows"], 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/question/category-wise-question")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|group| group["categoryName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["BASIC", "MATH"]);
}

#[actix_web::test]
async fn bulk_upload_accepts_xlsx() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "questionText").unwrap();
    sheet.write_string(0, 1, "categories").unwrap();
    sheet.write_string(1, 0, "Capital of France?").unwrap();
    sheet.write_string(1, 1, "geography").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let req = multipart_request(
        "POST",
        "/api/v1/question/bulk-add-question",
        &[Part::File {
            name: "file",
            file_name: "questions.xlsx",
            content_type: XLSX_MIME,
            bytes: &bytes,
        }],
    )
    .insert_header(bearer(&token));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalQuestions"], 1);
    assert_eq!(body["insertedQuestions"], 1);
}

#[actix_web::test]
async fn bulk_upload_rejects_missing_and_unsupported_files() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    let req = multipart_request(
        "POST",
        "/api/v1/question/bulk-add-question",
        &[Part::Text("note", "nothing attached")],
    )
    .insert_header(bearer(&token));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No file uploaded");

    let req = multipart_request(
        "POST",
        "/api/v1/question/bulk-add-question",
        &[Part::File {
            name: "file",
            file_name: "questions.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF-1.4",
        }],
    )
    .insert_header(bearer(&token));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Unsupported file format");
}

#[actix_web::test]
async fn questions_are_grouped_by_category() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    for (text, categories) in [
        ("2+2=?", json!(["math"])),
        ("H2O is?", json!(["Science"])),
        ("3*3=?", json!([" MATH "])),
    ] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/question/add-single-question")
                .insert_header(bearer(&token))
                .set_json(json!({ "questionText": text, "categories": categories }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Question added successfully");
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/question/category-wise-question")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Category-wise questions retrieved successfully");
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["categoryName"], "MATH");
    assert_eq!(data[0]["questions"].as_array().unwrap().len(), 2);
    assert_eq!(data[0]["questions"][0]["text"], "2+2=?");
    assert_eq!(data[1]["categoryName"], "SCIENCE");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/question/category-wise-question?categoryName=science")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["categoryName"], "SCIENCE");
}

#[actix_web::test]
async fn single_question_requires_text_and_categories() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/question/add-single-question")
            .insert_header(bearer(&token))
            .set_json(json!({ "questionText": "2+2=?", "categories": "MATH" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Question text and categories are required");
}

#[actix_web::test]
async fn storage_failure_returns_generic_error_and_writes_record() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let token = register_and_login!(app, "alice", "alice@example.com");

    let mut conn = ctx.db.pool().get().expect("connection");
    diesel::sql_query("DROP TABLE question_categories")
        .execute(&mut conn)
        .expect("drop table");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/question/category-wise-question")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "status": false, "message": "Internal server error" })
    );

    let day_dirs: Vec<_> = std::fs::read_dir(ctx.log_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(day_dirs.len(), 1);
    let records: Vec<_> = std::fs::read_dir(&day_dirs[0]).unwrap().collect();
    assert_eq!(records.len(), 1);
    let record = std::fs::read_to_string(records[0].as_ref().unwrap().path()).unwrap();
    assert!(record.contains("Route: GET /api/v1/question/category-wise-question"));
}
