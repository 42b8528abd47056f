//! Client SDK for the ZBooks accounting backend.
//!
//! The core of this crate is the session manager: [`ApiClient`] owns the
//! access/refresh token pair through an injected [`SessionStore`], attaches
//! the bearer token to every outbound request, and transparently refreshes
//! the session when the server reports it invalid, retrying the original
//! request exactly once. Concurrent refreshes are coalesced so at most one
//! refresh call hits the backend per expiry event.
//!
//! On top of the session manager sit the authentication operations (login,
//! register, OTP, logout) and the organization operations (list, create,
//! switch).
//!
//! ```no_run
//! use std::sync::Arc;
//! use zbooks_client::{ApiClient, ClientConfig, MemorySessionStore};
//!
//! # async fn run() -> Result<(), zbooks_client::ApiError> {
//! let store = Arc::new(MemorySessionStore::new());
//! let client = ApiClient::new(ClientConfig::from_env(), store)?;
//!
//! let outcome = client.login("a@b.com", "secret").await?;
//! println!("logged in as {}", outcome.user.email);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod org;
pub mod session;

pub use auth::LoginOutcome;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorBody};
pub use models::{
    AuthenticatedUser, Membership, NewOrganization, Organization, RegisterForm, RegisterPayload,
    TokenPair,
};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
