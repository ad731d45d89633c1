//! Pure REST API client for the member portal backend.
//!
//! One method per backend operation, no domain logic. Every method attaches
//! the bearer token when one is stored, normalizes transport failures into
//! the backend's response envelope, and routes HTTP 401 through a single
//! unauthorized handler regardless of which call triggered it.
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_client::{LoginRequest, PortalClient};
//!
//! let client = PortalClient::new("https://api.example.com", tokens);
//!
//! let response = client.login(&LoginRequest {
//!     email: "a@b.co".into(),
//!     password: "secret".into(),
//! }).await;
//! ```
//!
//! No operation returns `Err` past its own boundary: failures resolve to an
//! `ApiResponse::Error` value carrying the server message when available, a
//! per-operation fallback when the response is unusable, and a generic
//! message when no response arrived at all.

pub mod error;
pub mod types;

pub use error::PortalError;
pub use types::{
    Account, ApiResponse, CurrentUserData, ErrorFlags, Gender, LoginData, LoginRequest, Member,
    NewMember, ProfileUpdate, RegisterRequest, User, UserRole,
};

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use types::MemberWire;

/// Error message for failures where no server response arrived at all
/// (connection refused, DNS, timeout). When a response did arrive but its
/// envelope is unusable, the per-operation fallback applies instead.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Read/clear access to the persisted bearer token.
///
/// The session layer owns writes; the client only needs to attach the token
/// to outgoing requests and drop it when the backend rejects it.
pub trait TokenStore: Send + Sync {
    fn bearer(&self) -> Option<String>;
    fn clear(&self);
}

/// Fired on any HTTP 401, after the stored token has been cleared. The
/// application hangs its navigate-to-login behavior here.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// Member portal API client.
#[derive(Clone)]
pub struct PortalClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    on_unauthorized: Option<UnauthorizedHandler>,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let mut base_url = base_url.into();
        // Paths are joined verbatim, so a trailing slash here would produce
        // `host//path` URLs.
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
            tokens,
            on_unauthorized: None,
        }
    }

    /// Install the handler invoked whenever any call comes back 401.
    pub fn with_unauthorized_handler(mut self, handler: UnauthorizedHandler) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth/register`. Creates the account only; registration does not
    /// yield a token, so callers follow up with [`login`](Self::login).
    pub async fn register(&self, request: &RegisterRequest) -> ApiResponse<Account> {
        self.execute(
            Method::POST,
            "/auth/register",
            Some(request),
            "Registration failed. Please try again.",
        )
        .await
    }

    /// `POST /auth/login`.
    pub async fn login(&self, request: &LoginRequest) -> ApiResponse<LoginData> {
        self.execute(
            Method::POST,
            "/auth/login",
            Some(request),
            "Login failed. Please try again.",
        )
        .await
    }

    /// `GET /user/me`.
    pub async fn current_user(&self) -> ApiResponse<CurrentUserData> {
        self.execute(
            Method::GET,
            "/user/me",
            None::<&()>,
            "Failed to fetch user profile.",
        )
        .await
    }

    /// `PUT /user/me`.
    pub async fn update_profile(&self, request: &ProfileUpdate) -> ApiResponse<CurrentUserData> {
        self.execute(
            Method::PUT,
            "/user/me",
            Some(request),
            "Failed to update profile.",
        )
        .await
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// `GET /members`.
    pub async fn list_members(&self) -> ApiResponse<Vec<Member>> {
        self.execute::<Vec<MemberWire>, ()>(
            Method::GET,
            "/members",
            None,
            "Failed to fetch members.",
        )
        .await
        .map(|members| members.into_iter().map(Member::from).collect())
    }

    /// `POST /members`.
    pub async fn add_member(&self, request: &NewMember) -> ApiResponse<Member> {
        self.execute::<MemberWire, _>(
            Method::POST,
            "/members",
            Some(request),
            "Failed to add member.",
        )
        .await
        .map(Member::from)
    }

    /// `DELETE /members/{id}`.
    pub async fn delete_member(&self, id: &str) -> ApiResponse<()> {
        self.execute::<(), ()>(
            Method::DELETE,
            &format!("/members/{id}"),
            None,
            "Failed to delete member.",
        )
        .await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match self.request_envelope(method, path, body).await {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(path, error = %err, "portal API request failed");
                let message = match err {
                    // No response reached us; the caller gets the generic
                    // message rather than an operation-specific one.
                    PortalError::Network(_) => GENERIC_FAILURE,
                    PortalError::Status(_) | PortalError::Parse(_) => fallback,
                };
                ApiResponse::error(message)
            }
        }
    }

    async fn request_envelope<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, PortalError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http.request(method, &url);
        if let Some(token) = self.tokens.bearer() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(PortalError::Network)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // Expired or rejected session: drop the token and bounce to the
            // login entry point, no matter which operation hit the 401.
            self.tokens.clear();
            if let Some(handler) = &self.on_unauthorized {
                handler();
            }
        }

        if status.is_success() {
            return response
                .json::<ApiResponse<T>>()
                .await
                .map_err(PortalError::Parse);
        }

        // Prefer the server's own error envelope; anything else becomes the
        // per-operation fallback message upstream.
        match response.json::<ApiResponse<T>>().await {
            Ok(envelope @ ApiResponse::Error { .. }) => Ok(envelope),
            _ => Err(PortalError::Status(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestTokens(Mutex<Option<String>>);

    impl TestTokens {
        fn empty() -> Arc<Self> {
            Arc::new(Self(Mutex::new(None)))
        }

        fn with(token: &str) -> Arc<Self> {
            Arc::new(Self(Mutex::new(Some(token.to_string()))))
        }
    }

    impl TokenStore for TestTokens {
        fn bearer(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.0.lock().unwrap().take();
        }
    }

    fn success_body(data: serde_json::Value) -> serde_json::Value {
        serde_json::json!({ "status": "success", "data": data })
    }

    #[tokio::test]
    async fn login_returns_envelope_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "a@b.co",
                "password": "secret1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body(
                serde_json::json!({
                    "account": {
                        "id": 42,
                        "uuid": "u-42",
                        "email": "a@b.co",
                        "is_email_verified": true,
                        "is_detail_completed": false
                    },
                    "token": "tok-123"
                }),
            )))
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri(), TestTokens::empty());
        let response = client
            .login(&LoginRequest {
                email: "a@b.co".into(),
                password: "secret1".into(),
            })
            .await;

        match response {
            ApiResponse::Success { data, .. } => {
                assert_eq!(data.token, "tok-123");
                assert_eq!(data.account.id, 42);
            }
            ApiResponse::Error { message, .. } => panic!("login failed: {message:?}"),
        }
    }

    #[tokio::test]
    async fn bearer_token_attached_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members"))
            .and(header("Authorization", "Bearer tok-abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!([]))),
            )
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri(), TestTokens::with("tok-abc"));
        assert!(client.list_members().await.is_success());
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_fires_handler() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/me"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "status": "error",
                "message": "Unauthorized",
                "errors": { "unauthorized": true }
            })))
            .mount(&server)
            .await;

        let tokens = TestTokens::with("stale");
        let redirected = Arc::new(AtomicBool::new(false));
        let flag = redirected.clone();
        let client = PortalClient::new(server.uri(), tokens.clone())
            .with_unauthorized_handler(Arc::new(move || flag.store(true, Ordering::SeqCst)));

        let response = client.current_user().await;

        assert!(!response.is_success());
        assert_eq!(response.message(), Some("Unauthorized"));
        assert_eq!(tokens.bearer(), None);
        assert!(redirected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn no_response_resolves_to_generic_message() {
        // Nothing listens here; the connection is refused.
        let client = PortalClient::new("http://127.0.0.1:9", TestTokens::empty());
        let response = client.list_members().await;

        assert!(!response.is_success());
        assert_eq!(response.message(), Some(GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "error",
                "message": "Email sudah terdaftar",
                "errors": { "data_duplicate": true }
            })))
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri(), TestTokens::empty());
        let response = client
            .register(&RegisterRequest {
                email: "a@b.co".into(),
                password: "secret1".into(),
            })
            .await;

        assert_eq!(response.message(), Some("Email sudah terdaftar"));
    }

    #[tokio::test]
    async fn unparseable_error_body_falls_back_per_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri(), TestTokens::empty());
        let response = client.list_members().await;

        assert_eq!(response.message(), Some("Failed to fetch members."));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/members"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(success_body(serde_json::json!([]))),
            )
            .mount(&server)
            .await;

        let client = PortalClient::new(format!("{}/", server.uri()), TestTokens::empty());
        assert_eq!(client.base_url(), server.uri());
        assert!(client.list_members().await.is_success());
    }

    #[tokio::test]
    async fn delete_member_hits_the_member_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/members/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "success", "data": null })),
            )
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri(), TestTokens::with("tok"));
        assert!(client.delete_member("7").await.is_success());
    }
}
