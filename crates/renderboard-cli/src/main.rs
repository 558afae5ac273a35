use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::args::{Cli, Command};
use cli::commands::{dispatch, exit_code_for, exit_codes, resolve_config};

fn init_logging(log_level: &str, json: bool) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();

    // Config comes first: it decides the log level. `init` creates it.
    let resolved = if matches!(cli.cmd, Command::Init(_)) {
        Ok(Default::default())
    } else {
        resolve_config(&cli.global)
    };
    let cfg = match resolved {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("config error: {e}");
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };
    init_logging(cfg.log_level.as_deref().unwrap_or("info"), cli.global.log_json);
    tracing::debug!(event = "config_resolved", config = ?cfg);

    let code = match dispatch(cli, cfg) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}
