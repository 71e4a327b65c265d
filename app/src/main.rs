// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

mod devices;
mod parse_log;
mod run;
mod sink;

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::LevelFilter;
use pcie_errors::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Monitor the errors reported by PCI Express devices.")]
struct Cli {
    /// Path to the JSON configuration file. If not specified, the default configuration is used.
    #[arg(short, long, value_name = "file")]
    config: Option<PathBuf>,

    /// Sets the verbosity of the logging messages
    /// -v: Warning, -vv: Info, -vvv: Debug, -vvvv: Trace
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, ValueEnum)]
enum DevicesFormat {
    #[default]
    Compact,
    Markdown,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the devices and the log file, printing the events as JSON lines
    Run {
        /// Seconds between two poll cycles
        #[arg(short, long, default_value_t = 10)]
        interval: u64,
        /// Run a single poll cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// List the PCI Express devices monitored on the platform
    Devices {
        #[arg(short, long, value_enum, default_value_t = DevicesFormat::default())]
        format: DevicesFormat,
    },
    /// Report the errors found in a whole log file
    ParseLog { input_file: PathBuf },
}

impl Command {
    fn run(&self, config: Config) -> Result<(), Error> {
        match self {
            Command::Run { interval, once } => run::run(config, *interval, *once),
            Command::Devices {
                format: DevicesFormat::Compact,
            } => devices::compact(&config),
            Command::Devices {
                format: DevicesFormat::Markdown,
            } => devices::markdown(&config),
            Command::ParseLog { input_file } => parse_log::parse_log(&config, input_file),
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::default()
    };
    cli.command.run(config)
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level.to_string())).init();

    if let Err(err) = run(cli) {
        log::error!("Fatal Error: {err}");
        std::process::exit(1);
    }
}
