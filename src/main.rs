use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use loan_schedule_rs::{
    CalculationOutput, EngineConfig, ErrorResponse, LoanCalculator, SafeTimeProvider, ScheduleError, TimeSource,
};

#[derive(Parser, Debug)]
#[command(name = "loan-schedule", version, about = "Revolving loan schedules and settlement projections")]
struct Cli {
    /// engine config (json); defaults apply to absent keys
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// directory holding saved client schedules
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// treat this date (YYYY-MM-DD) as today
    #[arg(long = "as-of", global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// build a schedule from a calculation request
    Calculate {
        /// request file, or - for stdin
        #[arg(short, long, default_value = "-")]
        request: String,

        /// where to write the output (stdout by default)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// project settlement for a steady repayment
    Project {
        #[arg(short, long, default_value = "-")]
        request: String,

        /// emit every simulated month
        #[arg(long)]
        detailed: bool,
    },
    /// short twelve-month balance preview
    Preview {
        #[arg(short, long, default_value = "-")]
        request: String,
    },
    /// list saved clients
    History,
    /// print a client's saved calculation
    Show { client: String },
    /// rebuild a client's saved schedule as of today
    Recalculate { client: String },
}

fn read_json<T: DeserializeOwned>(source: &str) -> Result<T> {
    let mut raw = String::new();
    if source == "-" {
        io::stdin().read_to_string(&mut raw)?;
    } else {
        File::open(source)
            .with_context(|| format!("opening {source}"))?
            .read_to_string(&mut raw)?;
    }
    serde_json::from_str(&raw).with_context(|| format!("parsing {source}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn time_provider(as_of: Option<NaiveDate>) -> SafeTimeProvider {
    match as_of.and_then(|date| date.and_hms_opt(0, 0, 0)) {
        Some(midnight) => SafeTimeProvider::new(TimeSource::Test(Utc.from_utc_datetime(&midnight))),
        None => SafeTimeProvider::new(TimeSource::System),
    }
}

/// `{"error": ...}` body for a failed command
fn error_body(err: &anyhow::Error) -> ErrorResponse {
    match err.downcast_ref::<ScheduleError>() {
        Some(schedule_err) => ErrorResponse::from(schedule_err),
        None => ErrorResponse {
            error: format!("{err:#}"),
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = cli.store {
        config = config.with_store_directory(dir);
    }

    let calculator = LoanCalculator::with_store(config);
    let time = time_provider(cli.as_of);

    match cli.command {
        Command::Calculate { request, output } => {
            let request = read_json(&request)?;
            match calculator.calculate(&request, &time)? {
                CalculationOutput::Schedule(response) => match output {
                    Some(path) => {
                        serde_json::to_writer_pretty(File::create(&path)?, &response)?;
                        log::info!("wrote schedule to {}", path.display());
                    }
                    None => print_json(&response)?,
                },
                CalculationOutput::Download(export) => {
                    let path = output.unwrap_or_else(|| PathBuf::from(&export.filename));
                    std::fs::write(&path, &export.bytes)?;
                    println!("{}", path.display());
                }
            }
        }
        Command::Project { request, detailed } => {
            let request = read_json(&request)?;
            if detailed {
                print_json(&calculator.project_detailed(&request)?)?;
            } else {
                print_json(&calculator.project(&request)?)?;
            }
        }
        Command::Preview { request } => {
            let request = read_json(&request)?;
            print_json(&calculator.preview(&request)?)?;
        }
        Command::History => print_json(&calculator.history()?)?,
        Command::Show { client } => print_json(&calculator.client_details(&client)?)?,
        Command::Recalculate { client } => print_json(&calculator.recalculate(&client, &time)?)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match serde_json::to_string(&error_body(&err)) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_as_of_pins_today_to_midnight_utc() {
        let as_of = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        let time = time_provider(Some(as_of));

        assert_eq!(time.now(), Utc.with_ymd_and_hms(2024, 12, 5, 0, 0, 0).unwrap());
        assert_eq!(time.now().date_naive(), as_of);
    }

    #[test]
    fn test_as_of_parsed_from_command_line() {
        let cli = Cli::try_parse_from(["loan-schedule", "--as-of", "2024-06-01", "history"]).unwrap();
        assert_eq!(cli.as_of, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert!(matches!(cli.command, Command::History));

        assert!(Cli::try_parse_from(["loan-schedule", "--as-of", "01/06/2024", "history"]).is_err());
    }

    #[test]
    fn test_schedule_errors_keep_their_message() {
        let err = anyhow::Error::from(ScheduleError::ClientNotFound {
            client_name: "Nobody".to_string(),
        });
        let body = serde_json::to_value(error_body(&err)).unwrap();
        assert_eq!(body, json!({"error": "Client not found"}));
    }

    #[test]
    fn test_other_errors_carry_their_context() {
        let err = anyhow::anyhow!("unexpected end of input").context("parsing request.json");
        let body = serde_json::to_value(error_body(&err)).unwrap();
        assert_eq!(body, json!({"error": "parsing request.json: unexpected end of input"}));
    }

    #[test]
    fn test_show_of_unknown_client_fails() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["loan-schedule", "--store", store.as_str(), "show", "Nobody"]).unwrap();

        let err = run(cli).unwrap_err();
        assert_eq!(error_body(&err).error, "Client not found");
    }
}
