//! # Debugger Tests
//!
//! Tests for breakpoint predicates, the REPL verbs, and register/memory
//! printing, driven through a channel host.

use mipsim_core::config::Config;
use mipsim_core::core::EngineState;
use mipsim_core::debug::debugger::format_word;
use mipsim_core::debug::Debugger;
use mipsim_core::host::{ChannelHost, HostEvent};
use mipsim_core::isa::instruction::{DataDirective, Instruction};
use rstest::rstest;

use crate::common::builder::*;
use crate::common::harness::TestContext;

fn debug_config() -> Config {
    let mut config = Config::default();
    config.debug.enabled = true;
    config
}

/// Builds a debugger over `nodes` with scripted REPL input; returns the
/// debugger and the event receiver.
fn scripted(
    nodes: Vec<Instruction>,
    config: &Config,
    commands: &[&str],
) -> (Debugger, std::sync::mpsc::Receiver<HostEvent>) {
    let mut ctx = TestContext::with_nodes(nodes);
    let (host, events, input) = ChannelHost::new();
    ctx.engine.set_host(Box::new(host));
    for command in commands {
        input.send((*command).to_string()).unwrap();
    }
    drop(input); // Closed input reads as quit, so a miscounted script can't hang.
    (ctx.into_debugger(config), events)
}

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
fn test_breakpoint_fires_exactly_once_at_its_line() {
    let nodes = vec![
        label("main"),
        itype_at("addi", 8, 0, 1, "demo.s", 1),
        itype_at("addi", 9, 0, 2, "demo.s", 2),
        itype_at("addi", 10, 0, 3, "demo.s", 3),
    ];
    let config = Config::default(); // debug mode off: only breakpoints fire
    let mut dbg = TestContext::with_nodes(nodes).into_debugger(&config);
    dbg.add_breakpoint("demo.s", 2);

    let mut hits = Vec::new();
    loop {
        let Some(instr) = dbg.engine().peek() else { break };
        if matches!(instr, Instruction::Terminate) {
            break;
        }
        hits.push(dbg.debug(instr));
        let _ = dbg.step().unwrap();
    }
    assert_eq!(hits, vec![false, true, false]);
}

#[test]
fn test_debug_mode_stops_at_every_instruction() {
    let nodes = vec![
        label("main"),
        itype_at("addi", 8, 0, 1, "demo.s", 1),
        itype_at("addi", 9, 0, 2, "demo.s", 2),
    ];
    let dbg = TestContext::with_nodes(nodes).into_debugger(&debug_config());
    let instr = dbg.engine().peek().unwrap();
    assert!(dbg.debug(instr));
}

#[test]
fn test_repl_step_then_continue_runs_to_halt() {
    let nodes = vec![
        label("main"),
        itype("addi", 8, 0, 5),
        itype("addi", 9, 0, 6),
        itype("addi", 10, 0, 7),
    ];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["n", "c"]);

    dbg.run().unwrap();

    assert_eq!(dbg.engine().state(), EngineState::Halted);
    assert_eq!(dbg.engine().regs().read(8), 5);
    assert_eq!(dbg.engine().regs().read(9), 6);
    assert_eq!(dbg.engine().regs().read(10), 7);

    let out = output_of(&events);
    // Two prompts: one before the first step, one before continuing.
    assert_eq!(out.matches("(dbg) ").count(), 2);
    assert!(out.contains("addi"));
}

#[test]
fn test_repl_quit_stops_without_executing() {
    let nodes = vec![label("main"), itype("addi", 8, 0, 5)];
    let (mut dbg, _events) = scripted(nodes, &debug_config(), &["q"]);

    dbg.run().unwrap();
    assert_eq!(dbg.engine().executed(), 0);
    assert_eq!(dbg.engine().regs().read(8), 0);
}

#[test]
fn test_repl_reverse_command_steps_back() {
    let nodes = vec![label("main"), itype("addi", 8, 0, 5)];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["n", "r", "c"]);

    dbg.run().unwrap();

    assert_eq!(dbg.engine().state(), EngineState::Halted);
    assert_eq!(dbg.engine().regs().read(8), 5);
    assert_eq!(dbg.engine().stats().reversed, 1);
    let out = output_of(&events);
    assert!(!out.contains("nothing to reverse"));
}

#[test]
fn test_repl_reverse_on_fresh_engine_reports_nothing() {
    let nodes = vec![label("main"), itype("addi", 8, 0, 5)];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["r", "c"]);

    dbg.run().unwrap();
    assert!(output_of(&events).contains("nothing to reverse"));
}

#[test]
fn test_repl_print_register_in_hex() {
    let nodes = vec![label("main"), itype("addi", 8, 0, 1)];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["p $t0 x", "c"]);
    dbg.engine_mut().regs_mut().write(8, 42);

    dbg.run().unwrap();
    assert!(output_of(&events).contains("$t0 = 0x0000002a"));
}

#[test]
fn test_repl_print_labeled_memory_words() {
    let nodes = vec![
        decl("vals", DataDirective::Word(vec![17, 18])),
        label("main"),
        itype("addi", 8, 0, 1),
    ];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["p vals word 2", "c"]);

    dbg.run().unwrap();
    let out = output_of(&events);
    assert!(out.contains("0x00000011"));
    assert!(out.contains("0x00000012"));
}

#[test]
fn test_repl_print_string_region() {
    let nodes = vec![
        decl("msg", DataDirective::Asciiz("salut".to_string())),
        label("main"),
        itype("addi", 8, 0, 1),
    ];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["p msg str", "c"]);

    dbg.run().unwrap();
    assert!(output_of(&events).contains("\"salut\""));
}

#[test]
fn test_repl_print_unknown_label_reports_error() {
    let nodes = vec![label("main"), itype("addi", 8, 0, 1)];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["p ghost word", "c"]);

    dbg.run().unwrap();
    assert!(output_of(&events).contains("undefined label `ghost`"));
}

#[test]
fn test_repl_breakpoint_management_verbs() {
    let nodes = vec![label("main"), itype_at("addi", 8, 0, 1, "demo.s", 4)];
    let commands = ["b demo.s 9", "i", "d", "i", "q"];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &commands);

    dbg.run().unwrap();
    let out = output_of(&events);
    assert!(out.contains("demo.s:9"));
    assert!(out.contains("no breakpoints"));
    assert!(out.contains("breakpoints cleared"));
}

#[test]
fn test_repl_unknown_command_prints_usage() {
    let nodes = vec![label("main"), itype("addi", 8, 0, 1)];
    let (mut dbg, events) = scripted(nodes, &debug_config(), &["zzz", "c"]);

    dbg.run().unwrap();
    assert!(output_of(&events).contains("commands:"));
}

#[test]
fn test_breakpoint_instruction_reprompts_once() {
    let nodes = vec![
        label("main"),
        itype("addi", 8, 0, 1),
        breakpoint_at("demo.s", 2),
        itype("addi", 9, 0, 2),
    ];
    // Debug mode off: the only prompt comes from the break instruction.
    let (mut dbg, events) = scripted(nodes, &Config::default(), &["c"]);

    dbg.run().unwrap();
    assert_eq!(dbg.engine().state(), EngineState::Halted);
    assert_eq!(dbg.engine().regs().read(9), 2);
    assert_eq!(output_of(&events).matches("(dbg) ").count(), 1);
}

#[rstest]
#[case(5, "i", "5")]
#[case(0xFFFF_FFFF, "i", "-1")]
#[case(0xFFFF_FFFF, "u", "4294967295")]
#[case(255, "x", "0x000000ff")]
#[case(5, "b", "0b00000000000000000000000000000101")]
fn test_format_word_bases(#[case] val: u32, #[case] base: &str, #[case] expected: &str) {
    assert_eq!(format_word(val, base).unwrap(), expected);
}

#[test]
fn test_format_word_rejects_unknown_base() {
    assert!(format_word(1, "z").is_err());
}
