#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use film_katalog::state::AppState;
use film_katalog::storage::CoverStorage;

pub const BOUNDARY: &str = "----filmkatalogboundary7MA4YWxkTrZu0gW";

/// Router plus the scratch directories its covers land in.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub covers: CoverStorage,
    _dirs: TempDir,
}

pub fn build_test_app(pool: PgPool) -> TestApp {
    let dirs = TempDir::new().unwrap();
    let covers = CoverStorage::new(dirs.path().join("storage"), dirs.path().join("public"));
    let state = AppState::new(pool.clone(), covers.clone());

    TestApp {
        router: film_katalog::app(state, 10 * 1024 * 1024),
        pool,
        covers,
        _dirs: dirs,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// GET carrying a `Cookie` header, used to follow a redirect that set a
    /// flash cookie.
    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response<Body> {
        let request = Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn submit(&self, method: Method, uri: &str, form: MultipartForm) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty(&self, method: Method, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

/// `name=value` of the flash cookie set by a response.
pub fn flash_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("flash="))
        .and_then(|value| value.split(';').next())
        .expect("response should set a flash cookie")
        .to_string()
}

pub fn assert_redirect(response: &Response<Body>, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}

/// Hand-rolled multipart/form-data body.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00fake-jpeg-body";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-png-body";

/// Every required field filled in.
pub fn movie_form(judul: &str, category_id: i64) -> MultipartForm {
    MultipartForm::new()
        .text("judul", judul)
        .text("category_id", &category_id.to_string())
        .text("sinopsis", "Seorang bangsawan muda dikirim ke planet gurun.")
        .text("tahun", "2021")
        .text("pemain", "Timothée Chalamet, Zendaya")
}

pub async fn seed_category(pool: &PgPool, nama: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO categories (nama) VALUES ($1) RETURNING id")
        .bind(nama)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn insert_movie(
    pool: &PgPool,
    judul: &str,
    category_id: i64,
    foto_sampul: Option<&str>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO movies (judul, category_id, sinopsis, tahun, pemain, foto_sampul) \
         VALUES ($1, $2, 'Sinopsis', 2020, 'Pemain', $3) RETURNING id",
    )
    .bind(judul)
    .bind(category_id)
    .bind(foto_sampul)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn movie_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM movies")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn dir_is_empty(path: &std::path::Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}
