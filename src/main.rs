//! commerce-config: assemble and print the backend boot descriptor.
//!
//! Startup sequence:
//!   1. Parse CLI flags
//!   2. Resolve run mode from `APP_ENV` and load the env snapshot
//!   3. Init logger once (CLI `-v` flags > `LOG_LEVEL` > info)
//!   4. Derive constants, build modules, assemble and validate
//!   5. Optionally run provider preflight (`--check`)
//!   6. Print the descriptor as JSON on stdout

use std::path::PathBuf;

use tracing::{debug, warn};

use commerce_config::config;
use commerce_config::error::AppError;
use commerce_config::{logger, modules};

const USAGE: &str = "\
Usage: commerce-config [OPTIONS]

Options:
  -h, --help                 Print help
  -d, --env-dir <PATH>       Directory holding .env / .env.<mode> (default: .)
      --show-secrets         Print secrets instead of masking them
      --check                Report provider options their modules will reject
  -v, -vv, -vvv, -vvvv       Increase logging verbosity

Run mode is read from APP_ENV (development, staging, production, test).";

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return;
    }
    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let env = config::load_from_process(&args.env_dir)?;

    let level = logger::init(args.log_level, env.get("LOG_LEVEL"))?;

    debug!(
        mode = %env.mode(),
        env_dir = %args.env_dir.display(),
        vars = env.len(),
        effective_log_level = %level,
        "environment snapshot ready"
    );

    let boot = config::bootstrap(&env)?;

    if args.check {
        let failures = modules::preflight(&boot.config().modules);
        for failure in &failures {
            warn!(%failure, "provider will reject its options at startup");
            eprintln!("check: {failure}");
        }
        if failures.is_empty() {
            eprintln!("check: all provider contracts satisfied");
        }
    }

    println!("{}", boot.to_json(!args.show_secrets)?);
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    log_level: Option<&'static str>,
    env_dir: PathBuf,
    show_secrets: bool,
    check: bool,
    help: bool,
}

/// Parse flags, excluding the program name. Unknown arguments are ignored.
fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut verbosity = 0u8;
    let mut env_dir = PathBuf::from(".");
    let mut show_secrets = false;
    let mut check = false;
    let mut help = false;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => help = true,
            "-d" | "--env-dir" => {
                let path = iter
                    .next()
                    .ok_or_else(|| "-d/--env-dir requires a path argument".to_string())?;
                env_dir = PathBuf::from(path);
            }
            "--show-secrets" => show_secrets = true,
            "--check" => check = true,
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug
    //   -vvvv+  → trace
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    Ok(CliArgs {
        log_level,
        env_dir,
        show_secrets,
        check,
        help,
    })
}
