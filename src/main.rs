//! sheetcalc - spreadsheet formula engine with a command shell

mod config;
mod error;
mod shell;
mod storage;

use anyhow::Context;
use sheetcalc_core::Spreadsheet;
use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use crate::shell::Shell;

fn print_usage() {
    eprintln!("Usage: sheetcalc [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --name <NAME>         Spreadsheet name");
    eprintln!("  -l, --load <FILE>         Load a dump file before running commands");
    eprintln!("  -o, --output <FILE>       Write a dump file after running commands");
    eprintln!("  -c, --command <LINE>      Run a shell command (can be repeated)");
    eprintln!("  --config <FILE>           Read settings from FILE");
    eprintln!("  --no-config               Do not read config.toml from config dir");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Without --command, commands are read from stdin. Type 'help' for a list.");
}

#[derive(Debug, Default)]
struct Options {
    name: Option<String>,
    load: Option<PathBuf>,
    output: Option<PathBuf>,
    commands: Vec<String>,
    config_file: Option<PathBuf>,
    no_config: bool,
}

fn require_value(args: &[String], i: usize, what: &str) -> String {
    match args.get(i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires {}", args[i - 1], what);
            std::process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-n" | "--name" => {
                i += 1;
                opts.name = Some(require_value(args, i, "a value"));
            }
            "-l" | "--load" => {
                i += 1;
                opts.load = Some(PathBuf::from(require_value(args, i, "a file path")));
            }
            "-o" | "--output" => {
                i += 1;
                opts.output = Some(PathBuf::from(require_value(args, i, "a file path")));
            }
            "-c" | "--command" => {
                i += 1;
                opts.commands.push(require_value(args, i, "a command"));
            }
            "--config" => {
                i += 1;
                opts.config_file = Some(PathBuf::from(require_value(args, i, "a file path")));
            }
            "--no-config" => {
                opts.no_config = true;
            }
            arg => {
                eprintln!("Error: Unknown argument: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }
    opts
}

/// Returns the process exit code.
fn run(opts: Options) -> anyhow::Result<i32> {
    let config = if opts.no_config {
        config::Config::default()
    } else {
        let (config, warnings) = config::load_config(opts.config_file.as_deref());
        for warning in warnings {
            eprintln!("Warning: {}", warning);
        }
        config
    };

    let name = opts
        .name
        .or(config.name)
        .unwrap_or_else(|| config::DEFAULT_NAME.to_string());
    let mut shell = Shell::new(Spreadsheet::new(name));

    if let Some(path) = &opts.load {
        shell
            .load_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    } else if let Some(path) = &config.autoload {
        if let Err(err) = shell.load_file(path) {
            eprintln!("Warning: autoload {}: {}", path.display(), err);
        }
    }

    let mut stdout = io::stdout().lock();
    if opts.commands.is_empty() && opts.output.is_none() {
        let stdin = io::stdin();
        let prompt = if stdin.is_terminal() {
            Some(config.prompt.as_deref().unwrap_or(config::DEFAULT_PROMPT))
        } else {
            None
        };
        shell.repl(stdin.lock(), &mut stdout, prompt)?;
        return Ok(0);
    }

    for line in &opts.commands {
        if let Err(err) = shell.run_line(line, &mut stdout) {
            eprintln!("{}", err);
            return Ok(1);
        }
    }

    if let Some(path) = &opts.output {
        shell
            .save_file(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} formula(s) to {}", shell.sheet().dump().len(), path.display());
    }
    Ok(0)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let opts = parse_args(&args);

    match run(opts) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

