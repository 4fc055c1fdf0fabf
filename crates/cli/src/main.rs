//! MIPS-like teaching simulator CLI.
//!
//! This binary provides the command-line entry point. It performs:
//! 1. **Batch run:** Load an assembled program (JSON node sequence) and run it to completion.
//! 2. **Debug run:** The same, but under the interactive time-travel debugger.
//!
//! Configuration comes from `Config::default()` or an optional JSON file;
//! `RUST_LOG` controls tracing output.

use clap::{Parser, Subcommand};
use std::{fs, process};
use tracing_subscriber::EnvFilter;

use mipsim_core::config::Config;
use mipsim_core::core::ExecutionEngine;
use mipsim_core::debug::Debugger;
use mipsim_core::sim::{Loader, Program};

#[derive(Parser, Debug)]
#[command(
    name = "mipsim",
    author,
    version,
    about = "MIPS-like teaching simulator with a reversible debugger",
    long_about = "Run an assembled program (the assembler's JSON node sequence), optionally \
under the interactive debugger.\n\nExamples:\n  mipsim run -f program.json\n  mipsim run -f program.json --debug\n  mipsim run -f program.json --config machine.json -- arg1 arg2"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an assembled program to completion (or under the debugger).
    Run {
        /// Assembled program to execute (JSON node sequence).
        #[arg(short, long)]
        file: String,

        /// Machine configuration file (JSON); defaults apply when omitted.
        #[arg(long)]
        config: Option<String>,

        /// Start under the interactive debugger.
        #[arg(long)]
        debug: bool,

        /// Override the instruction ceiling.
        #[arg(long)]
        max_instructions: Option<u64>,

        /// Arguments passed to the simulated program.
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            file,
            config,
            debug,
            max_instructions,
            args,
        } => cmd_run(&file, config.as_deref(), debug, max_instructions, args),
    }
}

/// Runs the simulator: loads the program, then either runs to completion or
/// hands control to the debugger. On a fault, dumps state and exits with 1.
fn cmd_run(
    file: &str,
    config_path: Option<&str>,
    debug: bool,
    max_instructions: Option<u64>,
    args: Vec<String>,
) {
    let mut config = config_path.map_or_else(Config::default, load_config);
    if let Some(ceiling) = max_instructions {
        config.execution.max_instructions = ceiling;
    }
    if debug {
        config.debug.enabled = true;
    }

    let text = fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: Could not read program '{file}': {e}");
        process::exit(1);
    });
    let program = Program::from_json(&text).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    });

    let loader = Loader::new(&config);
    let (mem, regs) = loader.load(&program, &args).unwrap_or_else(|e| {
        eprintln!("\n[!] LOAD FAILED: {e}");
        process::exit(1);
    });
    let engine = ExecutionEngine::new(mem, regs, &config);

    let mut engine = if debug {
        let mut debugger = Debugger::new(engine, &config);
        if let Err(e) = debugger.run() {
            report_fault(&e, debugger.engine());
        }
        debugger.into_engine()
    } else {
        let mut engine = engine;
        if let Err(e) = engine.run() {
            report_fault(&e, &engine);
        }
        engine
    };

    let code = engine.take_exit().unwrap_or(0);
    engine.stats().print();
    process::exit(code as i32);
}

fn load_config(path: &str) -> Config {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: Could not read config '{path}': {e}");
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: Bad config '{path}': {e}");
        process::exit(1);
    })
}

fn report_fault(e: &mipsim_core::common::SimError, engine: &ExecutionEngine) -> ! {
    eprintln!("\n[!] FATAL: {e}");
    engine.dump_state();
    engine.stats().print();
    process::exit(1);
}
