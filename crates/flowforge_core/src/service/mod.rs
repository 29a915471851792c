//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ordering engines, board state and repository calls into
//!   use-case level APIs.
//! - Keep UI layers decoupled from storage details.

pub mod reorder_service;
pub mod task_service;
