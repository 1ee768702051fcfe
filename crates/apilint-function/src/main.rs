//! apilint function host.
//!
//! `serve` runs the Azure Functions custom handler. `invoke` runs a single
//! trigger from a file, and `normalize` converts saved Spectral output, both
//! for local debugging.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use uuid::Uuid;

use apilint::config::{
    DEFAULT_API_VERSION, DEFAULT_MANAGEMENT_ENDPOINT, DEFAULT_RULESET_PATH, DEFAULT_SPECTRAL_BIN,
};
use apilint::engine::parse_spectral_output;
use apilint::{normalize, LintError, LinterConfig, Pipeline, Ruleset, SpectralCli};
use apilint_telemetry::{LogFormat, LogOutput, TelemetryConfig};

mod envelope;
mod router;
mod server;


#[derive(Parser, Debug)]
#[command(
    name = "apilint-function",
    about = "Lint API Center definitions with Spectral and upload the analysis report",
    version
)]
struct Cli {
    /// Log level filter (RUST_LOG takes precedence).
    #[arg(long, global = true, env = "APILINT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format: json or pretty.
    #[arg(long, global = true, env = "APILINT_LOG_FORMAT", default_value = "json", value_parser = parse_log_format)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the custom handler HTTP server.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port assigned by the Functions host.
        #[arg(long, env = "FUNCTIONS_CUSTOMHANDLER_PORT", default_value_t = 8080)]
        port: u16,

        #[command(flatten)]
        linter: LinterArgs,
    },

    /// Run one invocation from an Event Grid event file.
    Invoke {
        /// Path to the event JSON.
        #[arg(long)]
        event: PathBuf,

        #[command(flatten)]
        linter: LinterArgs,
    },

    /// Convert Spectral JSON output into analysis report results.
    Normalize {
        /// Path to `spectral lint --format json` output.
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct LinterArgs {
    /// Management plane base URL.
    #[arg(long, env = "APILINT_MANAGEMENT_ENDPOINT", default_value = DEFAULT_MANAGEMENT_ENDPOINT)]
    management_endpoint: String,

    /// api-version for export and report calls.
    #[arg(long, env = "APILINT_API_VERSION", default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Packaged ruleset location.
    #[arg(long, env = "APILINT_RULESET", default_value = DEFAULT_RULESET_PATH)]
    ruleset: PathBuf,

    /// Spectral executable.
    #[arg(long, env = "APILINT_SPECTRAL_BIN", default_value = DEFAULT_SPECTRAL_BIN)]
    spectral_bin: PathBuf,
}

impl LinterArgs {
    fn config(&self) -> LinterConfig {
        LinterConfig::new()
            .with_management_endpoint(&self.management_endpoint)
            .with_api_version(&self.api_version)
            .with_ruleset_path(&self.ruleset)
            .with_spectral_bin(&self.spectral_bin)
    }
}

fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    LogFormat::parse(s).ok_or_else(|| format!("unknown log format '{}' (expected json or pretty)", s))
}

/// Exit codes:
/// 1 = bad input (trigger shape, unparseable document)
/// 2 = remote failure (export, link, upload, credential)
/// 3 = local setup (ruleset, engine, endpoint, I/O)
fn exit_code(err: &LintError) -> ExitCode {
    match err {
        LintError::TriggerShape(_) | LintError::Parse(_) => ExitCode::from(1),
        LintError::RemoteFetch(_) | LintError::Upload(_) | LintError::Credential(_) => {
            ExitCode::from(2)
        }
        LintError::Ruleset(_)
        | LintError::Engine(_)
        | LintError::InvalidEndpoint(_)
        | LintError::Client(_) => ExitCode::from(3),
    }
}

fn build_pipeline(config: &LinterConfig) -> Result<Pipeline<SpectralCli>, LintError> {
    Pipeline::new(config, SpectralCli::new(&config.spectral_bin))
}

fn init_telemetry(cli: &Cli, output: LogOutput) -> Result<(), ExitCode> {
    let config = TelemetryConfig::new()
        .with_service_name("apilint-function")
        .with_log_level(&cli.log_level)
        .with_log_format(cli.log_format)
        .with_log_output(output);
    apilint_telemetry::init(&config).map_err(|e| {
        eprintln!("error: {}", e);
        ExitCode::from(3)
    })
}

async fn run_serve(host: IpAddr, port: u16, linter: &LinterArgs) -> ExitCode {
    let config = linter.config();

    // Loaded again per invocation; this only surfaces packaging mistakes early.
    if let Err(e) = Ruleset::load(&config.ruleset_path).await {
        tracing::warn!(error = %e, "ruleset not loadable at startup");
    }

    let pipeline = match build_pipeline(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            return exit_code(&e);
        }
    };

    let server_config = server::ServerConfig {
        listen_addr: SocketAddr::new(host, port),
    };
    match server::run(server_config, pipeline).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(3)
        }
    }
}

async fn run_invoke(event_path: &Path, linter: &LinterArgs) -> ExitCode {
    let event: Value = match std::fs::read_to_string(event_path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
    {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: failed to read event {}: {}", event_path.display(), e);
            return ExitCode::from(3);
        }
    };

    let result = match build_pipeline(&linter.config()) {
        Ok(pipeline) => {
            pipeline
                .run(&Uuid::new_v4().to_string(), Some(&event))
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => match serde_json::to_string_pretty(&report.results) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::from(3)
            }
        },
        Err(e) => {
            eprintln!("error: {}", e);
            exit_code(&e)
        }
    }
}

fn run_normalize(input: &Path) -> ExitCode {
    let raw = match std::fs::read(input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: failed to read {}: {}", input.display(), e);
            return ExitCode::from(3);
        }
    };

    let diagnostics = match parse_spectral_output(&raw) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: not Spectral JSON output: {}", e);
            return ExitCode::from(1);
        }
    };

    match serde_json::to_string_pretty(&normalize(&diagnostics)) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(3)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match &cli.command {
        Command::Serve { host, port, linter } => {
            if let Err(code) = init_telemetry(&cli, LogOutput::Stdout) {
                return code;
            }
            run_serve(*host, *port, linter).await
        }
        Command::Invoke { event, linter } => {
            // stdout carries the results.
            if let Err(code) = init_telemetry(&cli, LogOutput::Stderr) {
                return code;
            }
            run_invoke(event, linter).await
        }
        Command::Normalize { input } => run_normalize(input),
    }
}
