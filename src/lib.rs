//! zkcdn: librería de la aplicación.
//!
//! - `config`: configuración desde entorno / `.env`.
//! - `errors`: `AppError`, el error de más alto nivel del binario.
//! - `progress`: `ConsoleReporter`, progreso legible en terminal.
//!
//! El motor y los pipelines viven en `zkcdn-core` y `zkcdn-adapters`.

pub mod config;
pub mod errors;
pub mod progress;

pub use config::{AppConfig, ConfigError};
pub use errors::AppError;
pub use progress::ConsoleReporter;
