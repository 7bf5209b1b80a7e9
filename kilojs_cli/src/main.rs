// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A thin script runner over [`kilojs_core::api::Engine`]: run one or more
//! files in order, or an inline `--eval` snippet, in a single realm.

use std::process::ExitCode;

use clap::Parser;
use kilojs_core::api::{Engine, ParseOptions};
use kilojs_core::{EngineOptions, JsError, Value};

#[derive(Debug, Parser)]
#[command(name = "kilojs")]
#[command(about = "An embeddable ECMAScript engine", long_about = None)]
struct Cli {
    /// Evaluates `SOURCE` before running any file arguments.
    #[arg(short, long, value_name = "SOURCE")]
    eval: Option<String>,

    /// Disables garbage collection for the run.
    #[arg(long)]
    nogc: bool,

    /// Prints the result of the final evaluated source instead of
    /// discarding it.
    #[arg(short, long)]
    print: bool,

    /// Files to run, in order.
    files: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.eval.is_none() && cli.files.is_empty() {
        eprintln!("kilojs: nothing to run (pass --eval or one or more files)");
        return ExitCode::FAILURE;
    }

    let mut engine = Engine::new(EngineOptions {
        disable_gc: cli.nogc,
        ..EngineOptions::default()
    });

    let mut last = Value::Undefined;
    if let Some(source) = &cli.eval {
        match run_source(&mut engine, "<eval>", source) {
            Ok(value) => last = value,
            Err(code) => return code,
        }
    }
    for path in &cli.files {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("kilojs: couldn't read {path}: {error}");
                return ExitCode::FAILURE;
            }
        };
        match run_source(&mut engine, path, &source) {
            Ok(value) => last = value,
            Err(code) => return code,
        }
    }

    if let Err(code) = drain_microtasks(&mut engine) {
        return code;
    }

    if cli.print {
        match engine.to_string(last) {
            Ok(s) => {
                let mut scratch = String::new();
                println!("{}", s.as_str_buffered(&engine.agent, &mut scratch));
            }
            Err(error) => return report_uncaught(&mut engine, error),
        }
    }

    ExitCode::SUCCESS
}

fn run_source(engine: &mut Engine, name: &str, source: &str) -> Result<Value, ExitCode> {
    let script = engine
        .parse(name, source, &ParseOptions::default())
        .map_err(|error| report_uncaught(engine, error))?;
    engine.run(&script).map_err(|error| report_uncaught(engine, error))
}

fn drain_microtasks(engine: &mut Engine) -> Result<(), ExitCode> {
    engine.run_microtasks().map_err(|error| report_uncaught(engine, error))
}

fn report_uncaught(engine: &mut Engine, error: JsError) -> ExitCode {
    match engine.to_string(error.value) {
        Ok(message) => {
            let mut scratch = String::new();
            eprintln!("Uncaught {}", message.as_str_buffered(&engine.agent, &mut scratch));
        }
        Err(_) => eprintln!("Uncaught exception (could not stringify)"),
    }
    ExitCode::FAILURE
}
