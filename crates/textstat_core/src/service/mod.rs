//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod text_service;
