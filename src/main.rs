use actix_files as fs;
use actix_multipart::Multipart;
use actix_web::{
    get, middleware::Logger, post, web, App, HttpRequest, HttpResponse, HttpServer,
    Result as ActixResult,
};
use clap::Parser;
use futures_util::TryStreamExt as _;
use std::collections::{HashMap, HashSet};
use std::fs::create_dir_all;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use stashr::{validate, FileMetadata, LoginRequest, RegisterRequest};

const MAX_FILE_SIZE: usize = 512 * 1024 * 1024; // 512 MB

// Seeded account for local development - register your own for anything else
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Directory uploaded files are stored in
    #[arg(long, default_value = "./uploads")]
    upload_dir: PathBuf,
}

struct UserRecord {
    #[allow(dead_code)]
    email: String,
    password: String,
}

struct AppState {
    upload_dir: PathBuf,
    users: Mutex<HashMap<String, UserRecord>>,
    tokens: Mutex<HashSet<String>>,
}

impl AppState {
    fn new(upload_dir: PathBuf) -> Self {
        let mut users = HashMap::new();
        users.insert(
            DEFAULT_USERNAME.to_string(),
            UserRecord {
                email: "admin@localhost".to_string(),
                password: DEFAULT_PASSWORD.to_string(),
            },
        );
        AppState {
            upload_dir,
            users: Mutex::new(users),
            tokens: Mutex::new(HashSet::new()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> ActixResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("state lock poisoned"))
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("authorization")?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(str::to_string)
}

fn require_auth(state: &AppState, req: &HttpRequest) -> ActixResult<()> {
    let token =
        bearer_token(req).ok_or_else(|| actix_web::error::ErrorUnauthorized("Authentication required"))?;
    if lock(&state.tokens)?.contains(&token) {
        Ok(())
    } else {
        Err(actix_web::error::ErrorUnauthorized("Invalid or expired token"))
    }
}

/// Credential exchange. The token goes back out-of-band in the
/// `authorization` response header, urlencoded behind a `Bearer ` prefix.
#[post("/user/login")]
async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    let users = lock(&state.users)?;
    let valid = users
        .get(&request.username)
        .is_some_and(|user| user.password == request.password);
    drop(users);

    if !valid {
        return Ok(HttpResponse::Unauthorized().body("Invalid credentials"));
    }

    let token = Uuid::new_v4().to_string();
    lock(&state.tokens)?.insert(token.clone());

    Ok(HttpResponse::Ok()
        .insert_header((
            "authorization",
            format!("Bearer {}", urlencoding::encode(&token)),
        ))
        .body("Login successful"))
}

#[post("/user/register")]
async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> ActixResult<HttpResponse> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.trim().is_empty()
    {
        return Ok(HttpResponse::BadRequest().body(validate::MSG_FILL_ALL_FIELDS));
    }
    if !validate::is_valid_email(&request.email) {
        return Ok(HttpResponse::BadRequest().body(validate::MSG_INVALID_EMAIL));
    }

    let mut users = lock(&state.users)?;
    if users.contains_key(&request.username) {
        return Ok(HttpResponse::Conflict().body("Username already taken"));
    }
    users.insert(
        request.username.clone(),
        UserRecord {
            email: request.email.clone(),
            password: request.password.clone(),
        },
    );

    Ok(HttpResponse::Ok().body("User registered successfully"))
}

#[get("/files/")]
async fn list_files(state: web::Data<AppState>, req: HttpRequest) -> ActixResult<HttpResponse> {
    require_auth(&state, &req)?;

    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(&state.upload_dir) {
        for entry in entries.flatten() {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    let name = entry.file_name().to_string_lossy().to_string();
                    let created_at = metadata
                        .modified()
                        .map(|time| {
                            chrono::DateTime::<chrono::Local>::from(time)
                                .format("%Y-%m-%d %H:%M:%S")
                                .to_string()
                        })
                        .unwrap_or_default();
                    files.push(FileMetadata {
                        file_type: file_type(&name),
                        file_size: metadata.len(),
                        name,
                        created_at,
                    });
                }
            }
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(HttpResponse::Ok().json(files))
}

/// Single-shot multipart upload, stored under the name in the path. Uploading
/// the same name again overwrites; collision handling is the caller's
/// problem.
#[post("/files/{filename}")]
async fn upload_file(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    require_auth(&state, &req)?;

    create_dir_all(&state.upload_dir).map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("Failed to create upload directory: {e}"))
    })?;

    let filename = sanitize_filename(&path.into_inner());
    if filename.is_empty() {
        return Ok(HttpResponse::BadRequest().body("Invalid filename"));
    }
    let filepath = state.upload_dir.join(&filename);
    let filepath_cleanup = filepath.clone();

    let Some(mut field) = payload.try_next().await? else {
        return Ok(HttpResponse::BadRequest().body("No file in request body"));
    };

    let mut f = web::block(move || std::fs::File::create(filepath))
        .await?
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to create file: {e}")))?;

    let mut file_size = 0;
    while let Some(chunk) = field.try_next().await? {
        file_size += chunk.len();
        if file_size > MAX_FILE_SIZE {
            let _ = std::fs::remove_file(&filepath_cleanup);
            return Ok(HttpResponse::BadRequest().body(format!(
                "File too large. Maximum size is {} MB",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        f = web::block(move || f.write_all(&chunk).map(|_| f))
            .await?
            .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to write file: {e}")))?;
    }

    Ok(HttpResponse::Ok().body("File uploaded successfully"))
}

#[get("/files/{filename}")]
async fn download_file(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    require_auth(&state, &req)?;

    let filename = sanitize_filename(&path.into_inner());
    let filepath = state.upload_dir.join(&filename);
    let file = fs::NamedFile::open(filepath)
        .map_err(|_| actix_web::error::ErrorNotFound("File not found"))?;
    Ok(file.into_response(&req))
}

// Serve the main HTML page that boots the WASM frontend
#[get("/")]
async fn index() -> ActixResult<HttpResponse> {
    let html = include_str!("../static/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

fn file_type(filename: &str) -> String {
    let extension = filename
        .rfind('.')
        .map(|i| filename[i + 1..].to_lowercase())
        .unwrap_or_default();

    let kind = match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" | "ico" => "image",
        "mp4" | "webm" | "mov" | "avi" | "mkv" | "m4v" => "video",
        "mp3" | "wav" | "m4a" | "aac" | "flac" | "ogg" => "audio",
        "txt" | "md" | "json" | "xml" | "csv" | "log" | "yml" | "yaml" | "toml" | "ini" => "text",
        "js" | "ts" | "html" | "css" | "rs" | "py" | "java" | "c" | "cpp" | "go" | "sh" => "code",
        "pdf" => "pdf",
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" => "archive",
        "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" => "document",
        _ => "unknown",
    };
    kind.to_string()
}

fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(login)
            .service(register)
            .service(list_files)
            .service(upload_file)
            .service(download_file),
    );
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    env_logger::init();

    create_dir_all(&args.upload_dir)?;

    println!("Starting stashr server at http://{}", args.bind);
    println!("Upload directory: {}", args.upload_dir.display());

    let state = web::Data::new(AppState::new(args.upload_dir.clone()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure_api)
            .service(index)
            // Serve the compiled frontend (wasm, js glue, assets)
            .service(fs::Files::new("/static", "./static"))
    })
    .bind(&args.bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use stashr::auth::parse_bearer;

    fn test_state() -> web::Data<AppState> {
        let dir = std::env::temp_dir().join(format!("stashr-test-{}", Uuid::new_v4()));
        create_dir_all(&dir).expect("create temp upload dir");
        web::Data::new(AppState::new(dir))
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .configure(configure_api),
            )
            .await
        };
    }

    macro_rules! login_header {
        ($app:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/v1/user/login")
                .set_json(LoginRequest {
                    username: DEFAULT_USERNAME.to_string(),
                    password: DEFAULT_PASSWORD.to_string(),
                })
                .to_request();
            let resp = test::call_service($app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            resp.headers()
                .get("authorization")
                .expect("authorization header on login response")
                .to_str()
                .expect("header is ascii")
                .to_string()
        }};
    }

    #[actix_web::test]
    async fn login_issues_decodable_bearer_header() {
        let state = test_state();
        let app = test_app!(state);

        let header = login_header!(&app);
        assert!(header.starts_with("Bearer "));

        let token = parse_bearer(&header).expect("header parses");
        assert!(!token.is_empty());
    }

    #[actix_web::test]
    async fn login_rejects_bad_credentials_with_error_payload() {
        let state = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/user/login")
            .set_json(LoginRequest {
                username: "admin".to_string(),
                password: "wrong".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get("authorization").is_none());

        let body = test::read_body(resp).await;
        assert_eq!(body, "Invalid credentials");
    }

    #[actix_web::test]
    async fn register_then_login_with_new_account() {
        let state = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/user/register")
            .set_json(RegisterRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "hunter2".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // registration issues no token
        assert!(resp.headers().get("authorization").is_none());

        let req = test::TestRequest::post()
            .uri("/api/v1/user/login")
            .set_json(LoginRequest {
                username: "alice".to_string(),
                password: "hunter2".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("authorization").is_some());
    }

    #[actix_web::test]
    async fn register_rejects_malformed_email_and_duplicates() {
        let state = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/user/register")
            .set_json(RegisterRequest {
                username: "bob".to_string(),
                email: "not-an-email".to_string(),
                password: "pw".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/user/register")
                .set_json(RegisterRequest {
                    username: "admin".to_string(),
                    email: "admin@example.com".to_string(),
                    password: "pw".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn protected_calls_require_a_known_token() {
        let state = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/api/v1/files/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/v1/files/")
            .insert_header(("authorization", "Bearer made-up-token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn upload_then_list_shows_the_file() {
        let state = test_state();
        let app = test_app!(state);

        let header = login_header!(&app);
        let token = parse_bearer(&header).expect("header parses");
        let bearer = format!("Bearer {token}");

        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"hello.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello world\r\n\
             --{boundary}--\r\n"
        );
        let req = test::TestRequest::post()
            .uri("/api/v1/files/hello.txt")
            .insert_header(("authorization", bearer.as_str()))
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/v1/files/")
            .insert_header(("authorization", bearer.as_str()))
            .to_request();
        let files: Vec<FileMetadata> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "hello.txt");
        assert_eq!(files[0].file_type, "text");
        assert_eq!(files[0].file_size, "hello world".len() as u64);
    }

    #[actix_web::test]
    async fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("report v2.pdf"), "reportv2.pdf");
    }
}
