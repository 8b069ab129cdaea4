#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use stash::auth::TokenGenerator;
use stash::server::{AppState, create_router};
use stash::store::{SqliteStore, Store};
use stash::types::{File, NewUser, User};

/// In-process server: a fresh database in a temp dir and the full router.
pub struct TestApp {
    pub temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
    pub admin_token: String,
    router: Router,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(SqliteStore::new(temp_dir.path().join("stash.db")).expect("open db"));
        store.initialize().expect("initialize db");

        let issued = TokenGenerator::new()
            .issue(None, None)
            .expect("issue admin token");
        store.create_token(&issued.token).expect("store admin token");

        let dyn_store: Arc<dyn Store> = store.clone();
        let router = create_router(Arc::new(AppState::new(dyn_store)));

        Self {
            temp_dir,
            store,
            admin_token: issued.raw,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Posts `body` verbatim, for bodies that are not valid JSON.
    pub async fn post_raw(&self, uri: &str, token: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request");

        self.send(request).await
    }

    pub async fn share(&self, token: &str, file_id: &str, body: Value) -> Response {
        self.post(&format!("/share-file/{file_id}"), Some(token), body)
            .await
    }

    pub fn create_user(&self, name: &str, email: &str) -> User {
        self.store
            .create_user(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
            })
            .expect("create user")
    }

    pub fn user_token(&self, user_id: i64) -> String {
        let issued = TokenGenerator::new()
            .issue(Some(user_id), None)
            .expect("issue user token");
        self.store.create_token(&issued.token).expect("store token");
        issued.raw
    }

    /// Creates a user and returns it together with a bearer token.
    pub fn user_with_token(&self, name: &str, email: &str) -> (User, String) {
        let user = self.create_user(name, email);
        let token = self.user_token(user.id);
        (user, token)
    }

    pub fn create_file(&self, owner_id: i64, name: &str) -> File {
        let now = Utc::now();
        let file = File {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_by: owner_id,
            size_bytes: 2048,
            created_at: now,
            updated_at: now,
        };
        self.store.create_file(&file).expect("create file");
        file
    }

    pub fn share_count(&self, file_id: &str) -> i64 {
        self.store.count_file_shares(file_id).expect("count shares")
    }
}
