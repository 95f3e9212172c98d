//! Core infrastructure: wire contract, configuration, auth, dispatch and
//! transport.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod transport;

pub use auth::AuthResolver;
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
