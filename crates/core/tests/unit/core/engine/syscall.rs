//! # Syscall Tests
//!
//! Tests for the built-in syscall set, driven through a channel host so
//! console traffic is observable.

use mipsim_core::common::SimError;
use mipsim_core::core::EngineState;
use mipsim_core::host::{ChannelHost, HostEvent};
use mipsim_core::isa::instruction::DataDirective;

use crate::common::builder::*;
use crate::common::harness::TestContext;

fn output_of(events: &std::sync::mpsc::Receiver<HostEvent>) -> String {
    events
        .try_iter()
        .filter_map(|e| match e {
            HostEvent::Output(text) => Some(text),
            _ => None,
        })
        .collect()
}

#[test]
fn test_print_int_writes_a0() {
    let nodes = vec![
        label("main"),
        itype("addi", 4, 0, -42),
        itype("addi", 2, 0, 1),
        syscall(),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    let (host, events, _input) = ChannelHost::new();
    ctx.engine.set_host(Box::new(host));

    ctx.engine.run().unwrap();
    assert_eq!(output_of(&events), "-42");
}

#[test]
fn test_print_string_reads_asciiz_from_data() {
    let nodes = vec![
        decl("msg", DataDirective::Asciiz("hi there\n".to_string())),
        label("main"),
        la(4, "msg"),
        itype("addi", 2, 0, 4),
        syscall(),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    let (host, events, _input) = ChannelHost::new();
    ctx.engine.set_host(Box::new(host));

    ctx.engine.run().unwrap();
    assert_eq!(output_of(&events), "hi there\n");
}

#[test]
fn test_read_int_blocks_on_input_request() {
    let nodes = vec![label("main"), itype("addi", 2, 0, 5), syscall()];
    let mut ctx = TestContext::with_nodes(nodes);
    let (host, events, input) = ChannelHost::new();
    ctx.engine.set_host(Box::new(host));
    input.send("  1234 ".to_string()).unwrap();
    drop(input);

    ctx.engine.run().unwrap();
    assert_eq!(ctx.get_reg(2), 1234);
    let saw_request = events
        .try_iter()
        .any(|e| e == HostEvent::InputRequest);
    assert!(saw_request);
}

#[test]
fn test_read_int_rejects_garbage() {
    let nodes = vec![label("main"), itype("addi", 2, 0, 5), syscall()];
    let mut ctx = TestContext::with_nodes(nodes);
    let (host, _events, input) = ChannelHost::new();
    ctx.engine.set_host(Box::new(host));
    input.send("not-a-number".to_string()).unwrap();
    drop(input);

    let err = ctx.engine.run().unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}

#[test]
fn test_read_string_truncates_to_buffer() {
    let nodes = vec![
        decl("buf", DataDirective::Space(16)),
        label("main"),
        la(4, "buf"),
        itype("addi", 5, 0, 6),
        itype("addi", 2, 0, 8),
        syscall(),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    let (host, _events, input) = ChannelHost::new();
    ctx.engine.set_host(Box::new(host));
    input.send("hello world".to_string()).unwrap();
    drop(input);

    ctx.engine.run().unwrap();
    let addr = ctx.engine.mem().label("buf").unwrap();
    assert_eq!(ctx.engine.mem().read_asciiz(addr).unwrap(), "hello");
}

#[test]
fn test_exit_with_code_records_code_and_halts() {
    let nodes = vec![
        label("main"),
        itype("addi", 4, 0, 7),
        itype("addi", 2, 0, 17),
        syscall(),
        itype("addi", 9, 0, 1),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    let (host, events, _input) = ChannelHost::new();
    ctx.engine.set_host(Box::new(host));

    ctx.engine.run().unwrap();
    assert_eq!(ctx.engine.state(), EngineState::Halted);
    assert_eq!(ctx.engine.take_exit(), Some(7));
    // Nothing after the exit executed.
    assert_eq!(ctx.get_reg(9), 0);
    let finished = events.try_iter().any(|e| e == HostEvent::Finished);
    assert!(finished);
}

#[test]
fn test_unknown_syscall_code_faults() {
    let nodes = vec![label("main"), itype("addi", 2, 0, 99), syscall()];
    let mut ctx = TestContext::with_nodes(nodes);
    let err = ctx.engine.run().unwrap_err();
    assert_eq!(err, SimError::InvalidSyscall(99));
}

#[test]
fn test_disabled_syscall_code_faults() {
    let mut nodes = vec![label("main"), itype("addi", 4, 0, 1)];
    nodes.push(itype("addi", 2, 0, 1));
    nodes.push(syscall());
    let mut ctx = TestContext::with_nodes(nodes);
    ctx.engine.syscalls_mut().disable(1);

    let err = ctx.engine.run().unwrap_err();
    assert_eq!(err, SimError::InvalidSyscall(1));
}

#[test]
fn test_open_with_bad_flags_returns_minus_one() {
    let nodes = vec![
        decl("path", DataDirective::Asciiz("/nonexistent".to_string())),
        label("main"),
        la(4, "path"),
        itype("addi", 5, 0, 5),
        itype("addi", 2, 0, 13),
        syscall(),
    ];
    let mut ctx = TestContext::with_nodes(nodes);
    ctx.engine.run().unwrap();
    assert_eq!(ctx.get_reg(2), u32::MAX);
}
