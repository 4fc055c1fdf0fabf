//! Program input and loading.
//!
//! The [`program`] module defines the wire format an external assembler
//! produces; the [`loader`] turns one of those programs into populated memory
//! and seeded registers, ready for an execution engine.

/// Program loader and initial machine setup.
pub mod loader;

/// Assembled program input format.
pub mod program;

pub use loader::Loader;
pub use program::Program;
