mod args;
mod console;

use std::error::Error;
use std::fs::File;

use args::Args;
use clap::Parser;
use console::Console;
use engine::{EngineConfig, UciEngine};
use log::{info, LevelFilter};
use session::{MemoryStore, Orchestrator, PlayConfig, Registry, RegistryConfig};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let engine = UciEngine::new(EngineConfig {
        path: args.engine.clone(),
        args: args.engine_args.clone(),
        response_margin: args.response_margin(),
    });

    let registry = Registry::new(RegistryConfig {
        capacity: args.max_sessions,
        idle_timeout: args.idle_timeout(),
    });

    let config = PlayConfig {
        move_time: args.move_time(),
        solo_move_time: args.solo_move_time(),
        analysis_move_time: args.analysis_move_time(),
    };

    info!(
        "Playing against {} ({:?} per move)",
        args.engine.display(),
        config.move_time
    );

    let orchestrator = Orchestrator::new(registry, engine, MemoryStore::new(), config);
    Console::new(orchestrator, args.owner).run()?;

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    // stdout carries the JSON responses, so terminal logs go to stderr
    if let Some(log_file) = &args.log_file {
        WriteLogger::init(
            LevelFilter::Debug,
            Config::default(),
            File::create(log_file)?,
        )?;
    } else {
        TermLogger::init(
            args.log_level.into(),
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?;
    }

    Ok(args)
}
