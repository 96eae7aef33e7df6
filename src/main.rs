use std::path::PathBuf;
use std::process::ExitCode;

use coil::soak::{self, SoakOptions, SoakScenario};
use coil::steering::{AvoidanceMode, PelletPerception};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("coil=info")),
        )
        .try_init();
}

struct Cli {
    options: SoakOptions,
    report: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut options = SoakOptions::default();
    let mut report = None;

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--scenario" => {
                let v = value()?;
                options.scenario =
                    SoakScenario::parse_cli(&v).ok_or_else(|| format!("unknown scenario {v}"))?;
            }
            "--ticks" => options.ticks = parse_num(&value()?)?,
            "--seed" => options.seed = parse_num(&value()?)?,
            "--bots" => options.num_bots = Some(parse_num(&value()?)?),
            "--pellets" => options.num_pellets = Some(parse_num(&value()?)?),
            "--avoid" => {
                options.avoidance = Some(match value()?.as_str() {
                    "head" => AvoidanceMode::HeadOnly,
                    "body" => AvoidanceMode::FullBody,
                    other => return Err(format!("--avoid expects head|body, got {other}")),
                })
            }
            "--perceive" => {
                options.perception = Some(match value()?.as_str() {
                    "planar" => PelletPerception::Planar,
                    "toroidal" => PelletPerception::Toroidal,
                    other => return Err(format!("--perceive expects planar|toroidal, got {other}")),
                })
            }
            "--snapshot" => options.include_snapshot = true,
            "--report" => report = Some(PathBuf::from(value()?)),
            other => return Err(format!("unknown argument {other}")),
        }
    }
    Ok(Cli { options, report })
}

fn parse_num<T: std::str::FromStr>(v: &str) -> Result<T, String> {
    v.parse().map_err(|_| format!("not a number: {v}"))
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!(
                "usage: coil-soak [--scenario baseline|crowded|seam] [--ticks N] [--seed N] \
                 [--bots N] [--pellets N] [--avoid head|body] [--perceive planar|toroidal] \
                 [--snapshot] [--report PATH]"
            );
            return ExitCode::from(2);
        }
    };

    let report = match soak::run_soak(&cli.options) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "soak run could not start");
            return ExitCode::from(2);
        }
    };

    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "report serialization failed");
            return ExitCode::FAILURE;
        }
    };
    match &cli.report {
        Some(path) => match std::fs::write(path, &json) {
            Ok(()) => tracing::info!(path = %path.display(), "report written"),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "report write failed");
                return ExitCode::FAILURE;
            }
        },
        None => println!("{json}"),
    }

    tracing::info!(
        status = %report.overall_status,
        survivors = report.survivors,
        deaths = report.deaths.len(),
        "soak run finished"
    );
    if report.overall_status == "PASS" {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
