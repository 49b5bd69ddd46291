mod app;
mod auth;
mod config;
mod transport;
mod validation;

pub use app::{AppError, AppResult};
pub use auth::AuthError;
pub use config::ConfigError;
pub use transport::{FormatError, TransportError};
pub use validation::ValidationError;
