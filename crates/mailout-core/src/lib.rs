//! # mailout-core
//!
//! Domain models for the `mailout` bulk delivery pipeline.
//!
//! This crate provides:
//! - Outbound server settings with well-known provider presets
//! - The personalized message model submitted to a delivery batch
//! - Input validation for settings and messages

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod message;
pub mod settings;

pub use message::{EmailMessage, MessageId};
pub use settings::{
    ConnectionSettings, Security, ValidationError, ValidationResult, validate_message,
    validate_settings,
};
