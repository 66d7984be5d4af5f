use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{http::header, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::allocation::AllotmentRecord;
use crate::config::Config;
use crate::parser::{is_supported_sheet, load_students};
use crate::service::AllotmentService;

pub const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

pub struct AppState {
    pub service: AllotmentService,
    pub admin_password: String,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(admin_password: impl Into<String>, upload_dir: impl Into<PathBuf>) -> Self {
        AppState {
            service: AllotmentService::new(),
            admin_password: admin_password.into(),
            upload_dir: upload_dir.into(),
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    filename: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    success: bool,
    message: String,
    filename: String,
    total_students: usize,
    total_groups: usize,
    allotment_data: Vec<AllotmentRecord>,
}

#[derive(Serialize)]
pub struct UploadedFile {
    filename: String,
    size: u64,
    created: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadListing {
    upload_directory: String,
    total_files: usize,
    files: Vec<UploadedFile>,
}

fn is_admin(req: &HttpRequest, state: &AppState) -> bool {
    req.headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|password| password == state.admin_password)
        .unwrap_or(false)
}

fn unauthorized(req: &HttpRequest) -> HttpResponse {
    warn!(path = %req.path(), "rejected admin request");
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid admin credentials"}))
}

fn bad_request(error: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": error.into()}))
}

/// Keeps only the final path component of a client-supplied name
fn stored_file_name(raw: &str) -> Option<String> {
    Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn save_upload(dir: &Path, filename: &str, body: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, body)?;
    Ok(path)
}

/// Staging name for a sheet that has not loaded yet. Keeps the extension.
fn staged_file_name(filename: &str) -> String {
    format!(".pending-{}", filename)
}

fn list_uploaded_files(dir: &Path) -> io::Result<Vec<UploadedFile>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let created = metadata.created().or_else(|_| metadata.modified())?;
        files.push(UploadedFile {
            filename: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            created: DateTime::<Local>::from(created)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(files)
}

async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Hostel Room Allotment System API",
        "status": "running",
        "version": crate::VERSION,
        "adminHeader": ADMIN_PASSWORD_HEADER,
        "endpoints": {
            "admin": "/admin/*",
            "public": "/global/*"
        }
    })))
}

async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "hostel-room-allotment",
        "version": crate::VERSION
    })))
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Sheet upload: store the file, then run a fresh allocation over it
async fn upload_sheet(
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized(&req));
    }

    let filename = match stored_file_name(&query.filename) {
        Some(name) if is_supported_sheet(&name) => name,
        _ => return Ok(bad_request("File must be an Excel or CSV file (.xlsx, .xls or .csv)")),
    };

    // Kept under a staging name until it loads, so a rejected sheet never replaces an accepted one
    let staged = save_upload(&state.upload_dir, &staged_file_name(&filename), &body)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to save file: {}", e)))?;

    match load_students(&staged) {
        Ok(students) => {
            fs::rename(&staged, state.upload_dir.join(&filename))
                .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to save file: {}", e)))?;

            let allotment_data = state.service.allocate(&students);
            info!(filename = %filename, students = students.len(), "processed uploaded sheet");

            Ok(HttpResponse::Ok().json(UploadResponse {
                success: true,
                message: "Sheet uploaded and processed successfully".to_string(),
                filename,
                total_students: students.len(),
                total_groups: allotment_data.len(),
                allotment_data,
            }))
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&staged) {
                warn!(path = %staged.display(), error = %remove_err, "could not remove staged upload");
            }
            warn!(filename = %filename, error = %e, "rejected uploaded sheet");
            Ok(bad_request(format!("Failed to process sheet: {}", e)))
        }
    }
}

async fn upload_fee_photo(
    req: HttpRequest,
    filename: web::Path<String>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized(&req));
    }

    let is_image = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|content_type| content_type.starts_with("image/"))
        .unwrap_or(false);
    if !is_image {
        return Ok(bad_request("Fee receipts must be uploaded as images"));
    }

    let filename = match stored_file_name(&filename) {
        Some(name) => name,
        None => return Ok(bad_request("Invalid file name")),
    };

    save_upload(&state.upload_dir, &filename, &body)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to save file: {}", e)))?;
    info!(filename = %filename, size = body.len(), "stored fee receipt");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "filename": filename,
        "size": body.len()
    })))
}

async fn list_uploads(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized(&req));
    }

    let files = list_uploaded_files(&state.upload_dir)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to list uploads: {}", e)))?;

    Ok(HttpResponse::Ok().json(UploadListing {
        upload_directory: state.upload_dir.display().to_string(),
        total_files: files.len(),
        files,
    }))
}

async fn admin_allotment_data(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized(&req));
    }
    Ok(HttpResponse::Ok().json(state.service.allotment_data()))
}

async fn admin_room_status(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized(&req));
    }
    Ok(HttpResponse::Ok().json(state.service.room_status()))
}

async fn reset_allotment(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(unauthorized(&req));
    }
    Ok(HttpResponse::Ok().json(state.service.reset()))
}

async fn global_index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Public read-only room allotment views",
        "availableEndpoints": ["/global/allotment-data", "/global/room-status"]
    })))
}

async fn public_allotment_data(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.service.allotment_data()))
}

async fn public_room_status(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.service.room_status()))
}

/// The browser client may be served from any origin
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

/// Registers every API route. The caller supplies `web::Data<AppState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/admin")
                .route("/login", web::post().to(admin_login))
                .route("/upload-excel", web::post().to(upload_sheet))
                .service(web::resource("/fee-photos/{filename}").route(web::put().to(upload_fee_photo)))
                .route("/allotment-data", web::get().to(admin_allotment_data))
                .route("/room-status", web::get().to(admin_room_status))
                .route("/reset-allotment", web::post().to(reset_allotment))
                .route("/uploads", web::get().to(list_uploads)),
        )
        .service(
            web::scope("/global")
                .route("/", web::get().to(global_index))
                .route("/allotment-data", web::get().to(public_allotment_data))
                .route("/room-status", web::get().to(public_room_status)),
        );
}

pub async fn start_server(config: Config) -> io::Result<()> {
    fs::create_dir_all(&config.upload_dir)?;

    let upload_dir = config.upload_dir.clone();
    let max_upload_bytes = config.max_upload_bytes;
    let app_state = web::Data::new(AppState::new(config.admin_password.clone(), upload_dir.clone()));

    info!(
        address = %config.bind_address,
        port = config.port,
        upload_dir = %upload_dir.display(),
        "starting web server"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .wrap(cors())
            .wrap(middleware::Logger::default())
            .service(Files::new("/uploads", upload_dir.clone()).show_files_listing())
            .configure(configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{json, Value};

    const SHEET: &str = "Student Name,Preference 1,Preference 2,Preference 3,Fee Paid Date\n\
                         Asha,5,7,9,2024-01-03\n\
                         Ben,5,7,9,2024-01-01\n\
                         Chitra,5,7,9,2024-01-02\n\
                         Dev,5,8,,2023-12-31\n";

    fn app_state(dir: &Path) -> web::Data<AppState> {
        web::Data::new(AppState::new("secret", dir))
    }

    fn upload(filename: &str, sheet: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri(&format!("/admin/upload-excel?filename={}", filename))
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .set_payload(sheet.to_string())
    }

    #[actix_web::test]
    async fn upload_allocates_and_publishes_rooms() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(App::new().app_data(app_state(dir.path())).configure(configure)).await;

        let body: Value = actix_test::call_and_read_body_json(&app, upload("students.csv", SHEET).to_request()).await;
        assert_eq!(body["totalStudents"], 4);
        assert_eq!(body["totalGroups"], 2);
        assert_eq!(body["allotmentData"][0]["groupId"], "Group2");
        assert_eq!(body["allotmentData"][0]["assignedRoom"], 5);
        assert_eq!(body["allotmentData"][1]["assignedRoom"], 7);
        assert!(dir.path().join("students.csv").exists());

        let req = actix_test::TestRequest::get().uri("/global/room-status").to_request();
        let status: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(status["allocatedRooms"], json!([5, 7]));
        assert_eq!(status["allocationSummary"]["available"], 58);
    }

    #[actix_web::test]
    async fn admin_routes_require_password() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(App::new().app_data(app_state(dir.path())).configure(configure)).await;

        let req = actix_test::TestRequest::post()
            .uri("/admin/upload-excel?filename=students.csv")
            .insert_header((ADMIN_PASSWORD_HEADER, "wrong"))
            .set_payload(SHEET)
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::get().uri("/admin/room-status").to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = actix_test::TestRequest::post()
            .uri("/admin/login")
            .set_json(json!({"password": "secret"}))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn rejected_sheet_keeps_previous_allotment() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(App::new().app_data(app_state(dir.path())).configure(configure)).await;
        actix_test::call_service(&app, upload("students.csv", SHEET).to_request()).await;

        let resp = actix_test::call_service(&app, upload("broken.csv", "Student Name,Preference 1\nEli,3\n").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = actix_test::call_service(&app, upload("notes.txt", SHEET).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = actix_test::TestRequest::get().uri("/global/allotment-data").to_request();
        let data: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(data["totalGroups"], 2);
        assert_eq!(data["allocatedRoomsCount"], 2);
    }

    #[actix_web::test]
    async fn reset_clears_allotment() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(App::new().app_data(app_state(dir.path())).configure(configure)).await;
        actix_test::call_service(&app, upload("students.csv", SHEET).to_request()).await;

        let req = actix_test::TestRequest::post()
            .uri("/admin/reset-allotment")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .to_request();
        let reset: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(reset["message"], "Room allotment data has been reset");

        let req = actix_test::TestRequest::get()
            .uri("/admin/allotment-data")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .to_request();
        let data: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(data["totalGroups"], 0);
        assert_eq!(data["allocatedRoomsCount"], 0);
        assert_eq!(data["allotmentData"], json!([]));
    }

    #[actix_web::test]
    async fn fee_photos_are_stored_and_listed() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(App::new().app_data(app_state(dir.path())).configure(configure)).await;

        let req = actix_test::TestRequest::put()
            .uri("/admin/fee-photos/asha_receipt.jpg")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .insert_header((header::CONTENT_TYPE, "image/jpeg"))
            .set_payload(vec![0xFF, 0xD8, 0xFF])
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = actix_test::TestRequest::put()
            .uri("/admin/fee-photos/notes.txt")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("hello")
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = actix_test::TestRequest::get()
            .uri("/admin/uploads")
            .insert_header((ADMIN_PASSWORD_HEADER, "secret"))
            .to_request();
        let listing: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(listing["totalFiles"], 1);
        assert_eq!(listing["files"][0]["filename"], "asha_receipt.jpg");
        assert_eq!(listing["files"][0]["size"], 3);
    }

    #[actix_web::test]
    async fn rejected_sheet_does_not_replace_accepted_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(App::new().app_data(app_state(dir.path())).configure(configure)).await;
        actix_test::call_service(&app, upload("students.csv", SHEET).to_request()).await;

        let resp = actix_test::call_service(&app, upload("students.csv", "Student Name\nEli\n").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert_eq!(fs::read_to_string(dir.path().join("students.csv")).unwrap(), SHEET);
        let stored: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(stored, vec!["students.csv"]);
    }

    #[actix_web::test]
    async fn cross_origin_requests_are_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let app = actix_test::init_service(
            App::new().wrap(cors()).app_data(app_state(dir.path())).configure(configure),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/global/room-status")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[test]
    fn stored_names_drop_directories() {
        assert_eq!(stored_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(stored_file_name("sheet.xlsx").as_deref(), Some("sheet.xlsx"));
        assert_eq!(stored_file_name(".."), None);
        assert_eq!(staged_file_name("students.xlsx"), ".pending-students.xlsx");
        assert!(is_supported_sheet(&staged_file_name("students.xlsx")));
    }
}
