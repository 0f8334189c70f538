//! Document intake service.
//!
//! `POST /analyze-file/` takes one multipart upload, extracts its text,
//! redacts it, annotates it and answers with a [`intake_core::Summary`].

pub mod config;
pub mod error;
pub mod nlp;
pub mod pipeline;
pub mod routes;

pub use config::AppConfig;
pub use error::ApiError;
pub use pipeline::Pipeline;
pub use routes::{router, AppState};
