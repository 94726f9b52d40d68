//! Client-side session lifecycle against the hosted identity provider.
//!
//! ```text
//! Anonymous --login()--> PendingExternalRedirect --process_session() ok--> Authenticated
//!                              |  timeout / exchange failure
//!                              v
//!                        Anonymous (with error)
//! Authenticated --logout() / resume() = 401--> Anonymous
//! Anonymous --resume() ok--> Authenticated
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cxj_spotters_auth::session::{CallbackGuard, SessionController, SessionSettings, handle_callback};
//!
//! // 1. Implement AuthStorage and Host for your front-end (or use MemoryStorage)
//! let controller = SessionController::new(backend, storage, host, SessionSettings::from_env()?);
//!
//! // 2. On application start
//! controller.resume().await;
//!
//! // 3. Login button
//! controller.login()?;
//!
//! // 4. On the callback page, once per mount
//! let guard = CallbackGuard::new();
//! handle_callback(&controller, &guard, location_fragment).await;
//! ```

mod callback;
mod config;
mod controller;
mod error;
mod state;
mod storage;
mod traits;
mod watchdog;

#[cfg(test)]
pub(crate) mod testing;

pub use callback::{CallbackGuard, CallbackOutcome, handle_callback};
pub use config::SessionSettings;
pub use controller::SessionController;
pub use error::{LoginError, LoginErrorKind};
pub use state::{PendingLogin, SessionState};
pub use storage::{
    AUTH_TOKEN_KEY, MemoryStorage, PENDING_LOGIN_KEY, PENDING_LOGIN_TIMESTAMP_KEY, USER_KEY,
};
pub use traits::{AuthStorage, Backend, Host};
