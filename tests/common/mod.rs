#![allow(dead_code)]

use std::sync::Arc;

use alumni_portal::{
    api,
    auth::AuthService,
    config::{Settings, UploadConfig},
    domain::{NewUser, ProfileData, Role, User},
    repository::{self, ProfileRepository, UserRepository},
    service::ServiceContext,
};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub ctx: Arc<ServiceContext>,
    pub settings: Settings,
    // Holds the database file and upload directory.
    _dir: TempDir,
}

pub async fn spawn_app() -> anyhow::Result<TestApp> {
    let dir = tempfile::tempdir()?;
    let db_url = format!("sqlite://{}", dir.path().join("test.db").display());

    let mut settings = Settings::default();
    settings.database.url = db_url.clone();
    settings.auth.jwt_secret = "test-secret".to_string();
    settings.uploads = UploadConfig {
        dir: dir.path().join("uploads").to_string_lossy().into_owned(),
        max_file_bytes: 1024 * 1024,
    };

    let pool = repository::connect(&db_url, 5).await?;
    let ctx = Arc::new(ServiceContext::new(pool, &settings));
    let router = api::create_app(ctx.clone(), Arc::new(settings.clone()));

    Ok(TestApp {
        router,
        ctx,
        settings,
        _dir: dir,
    })
}

impl TestApp {
    /// Inserts a user directly and returns it with a valid bearer token.
    pub async fn user(&self, role: Role, is_approved: bool, email: &str) -> anyhow::Result<(User, String)> {
        let user = self
            .ctx
            .user_repo
            .create(NewUser {
                name: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                password_hash: AuthService::hash_password("password123").await?,
                role,
                is_approved,
            })
            .await?;
        let token = self.ctx.auth_service.issue_token(&user)?;
        Ok((user, token))
    }

    /// Approved alumni with a profile.
    pub async fn alumni(&self, email: &str, year: i32, department: &str) -> anyhow::Result<(User, String)> {
        let (user, token) = self.user(Role::Alumni, true, email).await?;
        self.ctx
            .profile_repo
            .create(user.id, &ProfileData::initial(year, department.to_string()))
            .await?;
        Ok((user, token))
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// GET returning the raw body, for non-JSON responses.
    pub async fn download(&self, uri: &str, token: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        let request = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes.to_vec())
    }

    /// POSTs a single-file multipart form.
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        mime: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "test-boundary-7MA4YWxkTrZu0gW";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                boundary, field, filename, mime
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }
}
