//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks that are shared across all
//! components of the simulator. It includes:
//! 1. **Constants:** Register-file dimensions, conventional register indices, and naming.
//! 2. **Error Handling:** The closed error taxonomy for load-time and run-time failures.
//! 3. **Register Management:** A unified interface for general, floating-point, and flag state.

/// Architectural constants and register naming.
pub mod constants;

/// Error type definitions.
pub mod error;

/// Unified register file implementation.
pub mod reg;

pub use error::SimError;
pub use reg::RegisterFile;
