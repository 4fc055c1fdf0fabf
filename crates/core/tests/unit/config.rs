//! # Configuration Tests
//!
//! Unit tests for configuration defaults and JSON deserialization.

use mipsim_core::config::{Config, Endianness};
use pretty_assertions::assert_eq;

#[test]
fn test_default_memory_layout() {
    let config = Config::default();
    assert_eq!(config.memory.text_base, 0x0040_0000);
    assert_eq!(config.memory.data_base, 0x1001_0000);
    assert_eq!(config.memory.stack_base, 0x7FFF_EFFC);
    assert_eq!(config.memory.data_limit, 0x8000_0000);
    assert_eq!(config.memory.endianness, Endianness::Little);
}

#[test]
fn test_default_execution_settings() {
    let config = Config::default();
    assert_eq!(config.execution.max_instructions, 10_000_000);
    assert!(!config.execution.trace_instructions);
    assert!(!config.debug.enabled);
}

#[test]
fn test_empty_json_yields_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.memory.text_base, 0x0040_0000);
    assert_eq!(config.execution.max_instructions, 10_000_000);
}

#[test]
fn test_partial_json_overrides() {
    let json = r#"{
        "memory": { "endianness": "Big" },
        "execution": { "max_instructions": 500 },
        "debug": { "enabled": true }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.memory.endianness, Endianness::Big);
    assert_eq!(config.execution.max_instructions, 500);
    assert!(config.debug.enabled);
    // Untouched sections keep their defaults.
    assert_eq!(config.memory.data_base, 0x1001_0000);
}
