//! Narrative weather analysis backed by the Gemini text API.

pub mod analyst;
pub mod client;
pub mod error;
pub mod prompt;

pub use analyst::WeatherAnalyst;
pub use client::{GeminiClient, GenerationSettings};
pub use error::AnalystError;
