use anyhow::{Context, Result};
use clap::Parser;
use librecur::{parse_date, today, FileStore, Schedule, TracingLogger};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "recur")]
#[command(about = "Append due recurring transactions to a ledger file")]
struct Cli {
    /// Ledger file the generated transactions are appended to.
    ledger: PathBuf,

    /// Generate everything due up to and including this date/time
    /// (`YYYY-MM-DD[ HH:MM[:SS]]`). Defaults to today.
    target: Option<String>,

    /// Recurring transaction config, defaults to `<LEDGER>.rec`.
    #[arg(env = "RECUR_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| {
            let mut path = self.ledger.clone().into_os_string();
            path.push(".rec");
            PathBuf::from(path)
        })
    }
}

fn run(cli: Cli) -> Result<usize> {
    let target = match &cli.target {
        Some(text) => parse_date(text)?,
        None => today()?,
    };
    let config = cli.config_path();
    let store = FileStore;

    let mut schedule = Schedule::load(&config, &store)
        .with_context(|| format!("loading {}", config.display()))?
        .with_logger(TracingLogger);
    tracing::debug!(
        "loaded {} template(s) from {}",
        schedule.templates().len(),
        config.display()
    );

    Ok(schedule.post(target, &config, &cli.ledger, &store)?)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recur=info,librecur=info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(Cli::parse()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("recur: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
