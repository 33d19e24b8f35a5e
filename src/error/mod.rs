//! Unified error handling for parley.
//!
//! - [`BackendError`] for individual REST and streaming calls
//! - [`AppError`] for chat app operations, wrapping backend and credential failures
//! - [`ErrorCategory`] to decide on retries and recovery hints
//!
//! # Example
//!
//! ```ignore
//! use parley::error::ParleyResult;
//!
//! async fn run(app: &mut ChatApp<ReqwestHttpClient>) -> ParleyResult<()> {
//!     if let Err(err) = app.load_conversations().await {
//!         eprintln!("{} ({})", err.user_message(), err.category().recovery_hint());
//!     }
//!     Ok(())
//! }
//! ```

mod app;
mod backend;
mod category;

pub use app::AppError;
pub use backend::BackendError;
pub use category::ErrorCategory;
pub use crate::traits::{CredentialsError, HttpError};

/// Result alias for chat app operations.
pub type ParleyResult<T> = Result<T, AppError>;
