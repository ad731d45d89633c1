//! Auth session manager.
//!
//! Single source of truth for "who is logged in". Constructed once at the
//! application root and handed to consumers; there are no writers besides
//! its own actions. State is rehydrated from the [`SessionStore`] alone on
//! startup and never blocks on the network to initialize.

use std::sync::Arc;

use chrono::Utc;
use portal_client::{
    Account, ApiResponse, CurrentUserData, Gender, LoginRequest, PortalClient, RegisterRequest,
    UnauthorizedHandler, User, UserRole,
};
use tracing::{debug, warn};

use crate::storage::SessionStore;
use crate::validation::{LoginForm, ProfileForm, RegisterForm};

const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

/// Observable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    fn logged_out() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            loading: false,
            error: None,
        }
    }

    fn authenticated(user: User) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
            loading: false,
            error: None,
        }
    }
}

pub struct AuthSession<S> {
    client: PortalClient,
    store: Arc<S>,
    state: AuthState,
    login_redirect: Option<UnauthorizedHandler>,
}

impl<S: SessionStore> AuthSession<S> {
    /// Rehydrate the session from storage. Token and user snapshot must both
    /// be present; exactly one of the pair is a corrupt session and forces a
    /// logout (both keys cleared).
    pub fn new(client: PortalClient, store: Arc<S>) -> Self {
        let state = match (store.token(), store.user()) {
            (Some(_), Some(user)) => AuthState::authenticated(user),
            (None, None) => AuthState::logged_out(),
            _ => {
                warn!("session storage holds a token without a user (or vice versa), forcing logout");
                store.remove_token();
                store.remove_user();
                AuthState::logged_out()
            }
        };

        Self {
            client,
            store,
            state,
            login_redirect: None,
        }
    }

    /// Navigation hook fired on [`logout`](Self::logout).
    pub fn with_login_redirect(mut self, redirect: UnauthorizedHandler) -> Self {
        self.login_redirect = Some(redirect);
        self
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn role(&self) -> Option<UserRole> {
        self.state.user.as_ref().map(|user| user.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role().map(UserRole::is_admin).unwrap_or(false)
    }

    /// Log in and persist the session. Returns whether it succeeded; on
    /// failure the error message lands in [`AuthState::error`].
    pub async fn login(&mut self, form: &LoginForm) -> bool {
        self.state.loading = true;
        self.state.error = None;

        let response = self
            .client
            .login(&LoginRequest {
                email: form.email.clone(),
                password: form.password.clone(),
            })
            .await;

        match response {
            ApiResponse::Success { data, .. } => {
                let user = synthesize_user(&data.account);
                // Persist before the authenticated state becomes observable,
                // so a rehydrating reader never sees auth without storage.
                self.store.set_token(&data.token);
                self.store.set_user(&user);
                debug!(user_id = %user.id, "login succeeded");
                self.state = AuthState::authenticated(user);
                true
            }
            ApiResponse::Error { message, .. } => {
                self.state = AuthState {
                    is_authenticated: false,
                    user: None,
                    loading: false,
                    error: Some(message.unwrap_or_else(|| LOGIN_FALLBACK.into())),
                };
                false
            }
        }
    }

    /// Register a new account. Registration alone yields no token, so a
    /// successful registration chains straight into [`login`](Self::login)
    /// with the same credentials and propagates that result.
    pub async fn register(&mut self, form: &RegisterForm) -> bool {
        self.state.loading = true;
        self.state.error = None;

        let response = self
            .client
            .register(&RegisterRequest {
                email: form.email.clone(),
                password: form.password.clone(),
            })
            .await;

        match response {
            ApiResponse::Success { .. } => {
                self.login(&LoginForm {
                    email: form.email.clone(),
                    password: form.password.clone(),
                })
                .await
            }
            ApiResponse::Error { message, .. } => {
                self.state.loading = false;
                self.state.error = Some(message.unwrap_or_else(|| REGISTER_FALLBACK.into()));
                false
            }
        }
    }

    /// Clear the persisted session and navigate back to login.
    pub fn logout(&mut self) {
        self.store.remove_token();
        self.store.remove_user();
        self.state = AuthState::logged_out();
        if let Some(redirect) = &self.login_redirect {
            redirect();
        }
    }

    /// Re-fetch the current user and overwrite the cached snapshot,
    /// preserving fields the refresh payload does not carry. Failures are
    /// swallowed (loading reset, no error surfaced): a transient refresh
    /// error must not disrupt an already-authenticated session.
    pub async fn refresh_user(&mut self) {
        if !self.state.is_authenticated {
            return;
        }
        self.state.loading = true;

        match self.client.current_user().await {
            ApiResponse::Success { data, .. } => self.adopt_user(&data),
            ApiResponse::Error { message, .. } => {
                debug!(message = message.as_deref(), "user refresh failed, keeping cached user");
                self.state.loading = false;
            }
        }
    }

    /// Update the profile on the server and merge the response into the
    /// session. Returns whether it succeeded; failures set
    /// [`AuthState::error`].
    pub async fn update_profile(&mut self, form: &ProfileForm) -> bool {
        if !self.state.is_authenticated {
            return false;
        }
        self.state.loading = true;
        self.state.error = None;

        match self.client.update_profile(&form.to_update()).await {
            ApiResponse::Success { data, .. } => {
                self.adopt_user(&data);
                true
            }
            ApiResponse::Error { message, .. } => {
                self.state.loading = false;
                self.state.error =
                    Some(message.unwrap_or_else(|| "Failed to update profile.".into()));
                false
            }
        }
    }

    fn adopt_user(&mut self, data: &CurrentUserData) {
        let merged = merge_user(self.state.user.take(), data);
        self.store.set_user(&merged);
        self.state.user = Some(merged);
        self.state.loading = false;
    }
}

/// Build a `User` from the login payload. The login endpoint only returns
/// account fields; everything else starts as a documented placeholder
/// (gender `male`, role `USER`, empty strings, registration date = now) and
/// gets filled in by the next refresh.
fn synthesize_user(account: &Account) -> User {
    User {
        id: account.id.to_string(),
        uuid: account.uuid.clone(),
        email: account.email.clone(),
        is_email_verified: account.is_email_verified,
        is_detail_completed: account.is_detail_completed,
        full_name: String::new(),
        phone_number: String::new(),
        gender: Gender::Male,
        birth_date: String::new(),
        university: String::new(),
        address: String::new(),
        birth_place: String::new(),
        initial_name: String::new(),
        role: UserRole::User,
        registration_date: Utc::now(),
    }
}

/// Overlay a `/user/me` payload on the cached user. Fields the payload does
/// not carry (gender, birth date, address, birth place, role, registration
/// date) keep their cached values.
fn merge_user(current: Option<User>, data: &CurrentUserData) -> User {
    let mut user = current.unwrap_or_else(|| synthesize_user(&data.account));

    user.id = data.account.id.to_string();
    user.uuid = data.account.uuid.clone();
    user.email = data.account.email.clone();
    user.is_email_verified = data.account.is_email_verified;
    user.is_detail_completed = data.account.is_detail_completed;

    if let Some(full_name) = &data.details.full_name {
        user.full_name = full_name.clone();
    }
    if let Some(phone_number) = &data.details.phone_number {
        user.phone_number = phone_number.clone();
    }
    if let Some(university) = &data.details.university {
        user.university = university.clone();
    }
    if let Some(initial_name) = &data.details.initial_name {
        user.initial_name = initial_name.clone();
    }

    user
}
