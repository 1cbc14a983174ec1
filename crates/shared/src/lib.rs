//! Shared utilities and common types for the camera management backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Credential sealing for stored camera passwords (AES-256-GCM)
//! - Common validation logic for camera configuration bounds

pub mod secret;
pub mod validation;
