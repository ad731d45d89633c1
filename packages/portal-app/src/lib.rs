//! Application state for the member portal.
//!
//! Everything the UI layer needs short of rendering: durable session storage,
//! the auth session manager (the single source of truth for "who is logged
//! in"), the member directory with its admin-gated, confirmation-gated
//! destructive actions, and pure form validation.

pub mod auth;
pub mod config;
pub mod members;
pub mod storage;
pub mod validation;

pub use auth::{AuthSession, AuthState};
pub use config::Config;
pub use members::{ConfirmedDelete, DeletePrompt, MemberDirectory};
pub use storage::{FileStore, MemoryStore, SessionStore};
pub use validation::{
    is_form_valid, FormErrors, FormField, LoginForm, MemberForm, ProfileForm, RegisterForm,
    Touched,
};
