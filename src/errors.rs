//! Error Types
//!
//! This module defines the error types produced while loading shader programs
//! and effects.
//!
//! # Overview
//!
//! [`ShaderError`] covers every recoverable failure of the loaders:
//! - Descriptor files that are missing or unreadable
//! - Descriptors that are not well-formed markup or fail schema validation
//! - Effects without a usable (or non-empty) technique
//! - Backend link failures
//!
//! # Usage
//!
//! Internal loaders return [`Result<T>`]. The public cache entry points
//! ([`ShaderManager::load_program`], [`ShaderManager::load_effect`]) never
//! return these errors: they log them and cache an empty result instead.
//!
//! [`ShaderManager::load_program`]: crate::ShaderManager::load_program
//! [`ShaderManager::load_effect`]: crate::ShaderManager::load_effect

use std::path::PathBuf;

use thiserror::Error;

/// The error type for shader program and effect loading.
#[derive(Error, Debug)]
pub enum ShaderError {
    // ========================================================================
    // Descriptor Errors
    // ========================================================================
    /// The descriptor file could not be read from the file system.
    #[error("Failed to read descriptor '{}': {source}", path.display())]
    DescriptorNotFound {
        /// Path of the descriptor that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The descriptor is not well-formed markup.
    #[error("Malformed descriptor '{}': {message}", path.display())]
    Markup {
        /// Path of the offending descriptor
        path: PathBuf,
        /// Parser diagnostic
        message: String,
    },

    /// The descriptor failed schema validation.
    #[error("Descriptor '{}' failed validation: {message}", path.display())]
    SchemaInvalid {
        /// Path of the offending descriptor
        path: PathBuf,
        /// Validator diagnostic
        message: String,
    },

    // ========================================================================
    // Effect Errors
    // ========================================================================
    /// Every technique of the effect was disqualified.
    #[error("Can't find a usable technique for effect '{effect}'")]
    NoUsableTechnique {
        /// Effect name
        effect: String,
    },

    /// The selected technique declares no passes.
    #[error("Technique selected for effect '{effect}' has no passes")]
    EmptyTechnique {
        /// Effect name
        effect: String,
    },

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The backend failed to compile or link a program.
    #[error("Failed to link program '{program}': {message}")]
    Link {
        /// Program name
        program: String,
        /// Backend diagnostic
        message: String,
    },
}

/// Alias for `Result<T, ShaderError>`.
pub type Result<T> = std::result::Result<T, ShaderError>;
