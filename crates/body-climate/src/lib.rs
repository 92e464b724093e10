//! Heat/cold and dry/damp body climate quiz.
//!
//! The [`survey`] module holds the question bank, the scorer, and the HTTP
//! surface around it. [`throttle`] carries the per-client request limiter.

pub mod config;
pub mod error;
pub mod survey;
pub mod telemetry;
pub mod throttle;
