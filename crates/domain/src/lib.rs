//! Domain layer for the camera management backend.
//!
//! This crate contains:
//! - Domain models (Camera, CameraConfiguration, health results)
//! - The storage boundary and in-memory implementations
//! - Lifecycle orchestration and the camera runtime boundary
//! - Domain error types

pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use error::CameraError;
