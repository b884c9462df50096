//! Koine CLI entry point.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use koine_runtime::{Repl, RuntimeConfig, logging};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    grammar: Option<PathBuf>,
    store: Option<PathBuf>,
    seed: Option<u64>,
    timeout_ms: Option<u64>,
    batch_mode: bool,
    no_save: bool,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn number(args: &[String], i: &mut usize, flag: &str) -> Result<u64, String> {
    let raw = value(args, i, flag)?;
    raw.parse()
        .map_err(|_| format!("invalid {flag} value: {raw}"))
}

fn parse_args(args: &[String]) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--no-save" => config.no_save = true,
            "--grammar" => config.grammar = Some(PathBuf::from(value(args, &mut i, "--grammar")?)),
            "--store" => config.store = Some(PathBuf::from(value(args, &mut i, "--store")?)),
            "--seed" => config.seed = Some(number(args, &mut i, "--seed")?),
            "--timeout-ms" => config.timeout_ms = Some(number(args, &mut i, "--timeout-ms")?),
            arg => return Err(format!("unknown option: {arg}").into()),
        }
        i += 1;
    }

    Ok(config)
}

fn runtime_config(cli: &CliConfig) -> RuntimeConfig {
    let mut config = RuntimeConfig::new();
    if let Some(path) = &cli.grammar {
        config = config.with_grammar_file(path);
    }
    if let Some(path) = &cli.store {
        config = config.with_store_path(path);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_query_timeout(Duration::from_millis(ms));
    }
    config
}

fn run(args: Vec<String>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = parse_args(&args)?;

    if cli.show_help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if cli.show_version {
        println!("koine {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let config = runtime_config(&cli);
    logging::init(&config.log_filter)?;

    let mut repl = Repl::new(config)?;
    if let Err(e) = repl.load_grammar() {
        eprintln!("\x1b[33mWarning: {e}\x1b[0m");
    }
    repl.load_store()?;
    if !cli.no_save {
        repl = repl.with_autosave();
    }

    if cli.batch_mode {
        let failures = repl.run_batch(io::stdin().lock())?;
        return Ok(if failures == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    repl.run()?;
    Ok(ExitCode::SUCCESS)
}

fn print_help() {
    println!(
        "\x1b[1mKoine\x1b[0m - Greek sentence builder with grammar checking

\x1b[1mUSAGE:\x1b[0m
    koine [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -h, --help           Print help information
    -V, --version        Print version information
    -b, --batch          Read commands from stdin, no prompt
    --grammar PATH       Load grammar from PATH instead of the bundled one
    --store PATH         Store file (default: koine.store)
    --seed N             Seed for review shuffling
    --timeout-ms N       Validation timeout in milliseconds (default: 5000)
    --no-save            Do not write word changes to the store file

\x1b[1mENVIRONMENT:\x1b[0m
    KOINE_LOG            Log filter, e.g. debug or koine_engine=trace

\x1b[1mEXAMPLES:\x1b[0m
    koine                            Start interactive REPL
    koine --store greek.store        Use a different word store
    koine -b --no-save < lesson.txt  Run a command script

\x1b[1mREPL COMMANDS:\x1b[0m
    Type 'help' inside the REPL for the full list.
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input"
    );
}
