#![doc = include_str!("../README.md")]

pub mod api;
pub mod authz;
pub mod error;
pub mod redirect;
pub mod session;
pub mod types;
pub mod user;

// Re-exports for convenient access
#[cfg(feature = "http")]
pub use api::HttpBackend;
pub use api::ApiConfig;
pub use authz::{Capabilities, HierarchyTable};
pub use error::Error;
pub use redirect::extract_session_id;
pub use session::{
    AuthStorage, Backend, CallbackGuard, CallbackOutcome, Host, LoginError, LoginErrorKind,
    MemoryStorage, PendingLogin, SessionController, SessionSettings, SessionState,
    handle_callback,
};
pub use types::{SessionCode, Tag, UserId};
pub use user::{SessionGrant, User};
