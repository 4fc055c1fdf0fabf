//! Configuration system for the simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline machine constants (segment bases, stack top, instruction ceiling).
//! 2. **Structures:** Hierarchical config for memory layout, execution, and debugging.
//! 3. **Enums:** The byte order applied by the data segment's typed accessors.
//!
//! Configuration is supplied as JSON from a host front-end, or use
//! `Config::default()` for the CLI. No TOML files.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline machine layout when not explicitly
/// overridden by a host-supplied configuration.
mod defaults {
    /// Base address of the text segment.
    ///
    /// Instruction slots are laid out word by word from this address.
    pub const TEXT_BASE: u32 = 0x0040_0000;

    /// Base address of the data segment.
    ///
    /// Data declarations are laid out from this address upward.
    pub const DATA_BASE: u32 = 0x1001_0000;

    /// One past the highest writable data address.
    ///
    /// Writes at or above this address fault; the stack lives just below it.
    pub const DATA_LIMIT: u32 = 0x8000_0000;

    /// Initial top of the process stack.
    ///
    /// Process arguments are laid out below this address and `$sp` is seeded
    /// beneath them.
    pub const STACK_BASE: u32 = 0x7FFF_EFFC;

    /// Maximum number of instructions one run may execute.
    ///
    /// The runaway-program guard: a run that reaches this ceiling fails with
    /// `InstrCountExceeded` instead of hanging.
    pub const MAX_INSTRUCTIONS: u64 = 10_000_000;
}

/// Byte order applied by the data segment's typed accessors.
///
/// Every multi-byte read and write honors this order; it has no effect on
/// register state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Endianness {
    /// Least-significant byte at the lowest address.
    #[default]
    Little,
    /// Most-significant byte at the lowest address.
    Big,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use mipsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.memory.text_base, 0x0040_0000);
/// assert_eq!(config.execution.max_instructions, 10_000_000);
/// ```
///
/// Deserializing from JSON (typical host usage):
///
/// ```
/// use mipsim_core::config::{Config, Endianness};
///
/// let json = r#"{
///     "memory": { "endianness": "Big" },
///     "execution": { "max_instructions": 500 },
///     "debug": { "enabled": true }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.memory.endianness, Endianness::Big);
/// assert_eq!(config.execution.max_instructions, 500);
/// assert!(config.debug.enabled);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Memory layout and byte-order settings.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Execution-loop settings.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Debugger settings.
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Memory layout configuration.
///
/// Defines the segment base addresses, the writable data limit, the initial
/// stack top, and the byte order of the data segment.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Text segment base address.
    #[serde(default = "MemoryConfig::default_text_base")]
    pub text_base: u32,

    /// Data segment base address.
    #[serde(default = "MemoryConfig::default_data_base")]
    pub data_base: u32,

    /// One past the highest writable data address.
    #[serde(default = "MemoryConfig::default_data_limit")]
    pub data_limit: u32,

    /// Initial top of the process stack.
    #[serde(default = "MemoryConfig::default_stack_base")]
    pub stack_base: u32,

    /// Byte order of the data segment's typed accessors.
    #[serde(default)]
    pub endianness: Endianness,
}

impl MemoryConfig {
    /// Returns the default text segment base address.
    fn default_text_base() -> u32 {
        defaults::TEXT_BASE
    }

    /// Returns the default data segment base address.
    fn default_data_base() -> u32 {
        defaults::DATA_BASE
    }

    /// Returns the default writable data limit.
    fn default_data_limit() -> u32 {
        defaults::DATA_LIMIT
    }

    /// Returns the default initial stack top.
    fn default_stack_base() -> u32 {
        defaults::STACK_BASE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            text_base: defaults::TEXT_BASE,
            data_base: defaults::DATA_BASE,
            data_limit: defaults::DATA_LIMIT,
            stack_base: defaults::STACK_BASE,
            endianness: Endianness::default(),
        }
    }
}

/// Execution-loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum number of instructions one run may execute.
    #[serde(default = "ExecutionConfig::default_max_instructions")]
    pub max_instructions: u64,

    /// Emit a trace event per executed instruction.
    #[serde(default)]
    pub trace_instructions: bool,
}

impl ExecutionConfig {
    /// Returns the default instruction ceiling.
    fn default_max_instructions() -> u64 {
        defaults::MAX_INSTRUCTIONS
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_instructions: defaults::MAX_INSTRUCTIONS,
            trace_instructions: false,
        }
    }
}

/// Debugger configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugConfig {
    /// Enable interactive debug mode (prompt before every instruction until
    /// the user continues).
    #[serde(default)]
    pub enabled: bool,
}
