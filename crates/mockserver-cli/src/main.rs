//! MockServer command line client
//!
//! Drives a running MockServer from a shell or CI script.
//!
//! # Usage
//!
//! ```bash
//! # Is the server up?
//! mockserver status
//!
//! # Register expectations from a file, then check traffic
//! mockserver --port 1090 load expectations.json
//! mockserver verify --method GET --path /hello --exactly 2
//! mockserver retrieve requests --path /hello
//!
//! # Tear down
//! mockserver reset
//! mockserver stop
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mockserver_client::path::ensure_leading_slash;
use mockserver_client::{
    codec, ClearType, ClientConfig, ClientError, HttpRequest, MockServerClient, VerificationTimes,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Parser, Debug)]
#[command(name = "mockserver")]
#[command(author, version, about = "Control a running MockServer instance")]
struct Args {
    /// MockServer host
    #[arg(
        long,
        default_value = "localhost",
        env = "MOCKSERVER_HOST",
        global = true
    )]
    host: String,

    /// MockServer port
    #[arg(
        short,
        long,
        default_value_t = 1080,
        env = "MOCKSERVER_PORT",
        global = true
    )]
    port: u16,

    /// Path the server is mounted under
    #[arg(
        long,
        default_value = "",
        env = "MOCKSERVER_CONTEXT_PATH",
        global = true
    )]
    context_path: String,

    /// Use https
    #[arg(long, global = true)]
    secure: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    timeout_secs: u64,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the server answers on /status
    Status {
        /// Number of checks before giving up
        #[arg(long, default_value_t = 10)]
        attempts: u32,

        /// Milliseconds between checks
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// Remove all expectations and recorded requests
    Reset,
    /// Remove expectations and/or log entries matching a request
    Clear {
        #[command(flatten)]
        matcher: MatcherArgs,

        /// What to clear
        #[arg(long = "type", value_enum, default_value_t = ClearKind::All)]
        kind: ClearKind,
    },
    /// Register every expectation in a JSON file
    Load {
        /// File holding one expectation or an array of them
        file: PathBuf,
    },
    /// Print what the server recorded
    Retrieve {
        #[arg(value_enum)]
        kind: RetrieveKind,

        #[command(flatten)]
        matcher: MatcherArgs,
    },
    /// Assert how often a request was received
    Verify {
        #[command(flatten)]
        matcher: MatcherArgs,

        /// Received exactly N times
        #[arg(long, conflicts_with_all = ["at_least", "at_most"])]
        exactly: Option<u32>,

        /// Received at least N times
        #[arg(long)]
        at_least: Option<u32>,

        /// Received at most N times
        #[arg(long)]
        at_most: Option<u32>,
    },
    /// Shut the server down and wait for it to go away
    Stop {
        /// Succeed even if the stop request fails
        #[arg(long)]
        ignore_failure: bool,
    },
    /// Make the server listen on more ports (0 picks a free one)
    Bind {
        #[arg(required = true)]
        ports: Vec<u16>,
    },
}

/// Request matcher given on the command line.
#[derive(clap::Args, Debug, Default)]
struct MatcherArgs {
    /// HTTP method to match
    #[arg(long)]
    method: Option<String>,

    /// Request path to match
    #[arg(long)]
    path: Option<String>,

    /// Full matcher as JSON; --method and --path override its fields
    #[arg(long, value_name = "JSON")]
    request: Option<String>,
}

impl MatcherArgs {
    fn is_empty(&self) -> bool {
        self.method.is_none() && self.path.is_none() && self.request.is_none()
    }

    fn to_request(&self) -> anyhow::Result<Option<HttpRequest>> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut request = match &self.request {
            Some(json) => codec::from_json::<HttpRequest>(json)
                .context("--request is not a valid request matcher")?,
            None => HttpRequest::new(),
        };
        if let Some(method) = &self.method {
            request = request.with_method(method.to_uppercase());
        }
        if let Some(path) = &self.path {
            request = request.with_path(ensure_leading_slash(path));
        }
        Ok(Some(request))
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ClearKind {
    Expectations,
    Log,
    All,
}

impl From<ClearKind> for ClearType {
    fn from(kind: ClearKind) -> Self {
        match kind {
            ClearKind::Expectations => ClearType::Expectations,
            ClearKind::Log => ClearType::Log,
            ClearKind::All => ClearType::All,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RetrieveKind {
    Requests,
    ActiveExpectations,
    RecordedExpectations,
    Logs,
}

fn verification_times(
    exactly: Option<u32>,
    at_least: Option<u32>,
    at_most: Option<u32>,
) -> VerificationTimes {
    match (exactly, at_least, at_most) {
        (Some(n), _, _) => VerificationTimes::exactly(n),
        (None, Some(min), Some(max)) => VerificationTimes::between(min, max),
        (None, Some(min), None) => VerificationTimes::at_least(min),
        (None, None, Some(max)) => VerificationTimes::at_most(max),
        (None, None, None) => VerificationTimes::at_least(1),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = ClientConfig::new(&args.host, args.port)
        .with_context_path(&args.context_path)
        .with_secure(args.secure)
        .with_request_timeout(Duration::from_secs(args.timeout_secs));
    let target = config.base_url();
    let client = MockServerClient::with_config(config)?;

    match args.command {
        Command::Status {
            attempts,
            interval_ms,
        } => {
            if client
                .is_running_with(attempts, Duration::from_millis(interval_ms))
                .await
            {
                println!("{GREEN}running{RESET} {DIM}{target}{RESET}");
            } else {
                println!("{RED}not running{RESET} {DIM}{target}{RESET}");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Reset => {
            client.reset().await?;
            println!("{GREEN}reset{RESET} {DIM}{target}{RESET}");
        }
        Command::Clear { matcher, kind } => {
            let request = matcher.to_request()?;
            client.clear_with_type(request.as_ref(), kind.into()).await?;
            println!("{GREEN}cleared{RESET} {}", ClearType::from(kind));
        }
        Command::Load { file } => {
            let loaded = client
                .load_expectations_from_file(&file)
                .await
                .with_context(|| format!("loading {}", file.display()))?;
            println!(
                "{GREEN}loaded{RESET} {BOLD}{}{RESET} expectation(s) from {CYAN}{}{RESET}",
                loaded.len(),
                file.display()
            );
        }
        Command::Retrieve { kind, matcher } => {
            let request = matcher.to_request()?;
            let filter = request.as_ref();
            let output = match kind {
                RetrieveKind::Requests => {
                    codec::to_json_pretty(&client.retrieve_recorded_requests(filter).await?)?
                }
                RetrieveKind::ActiveExpectations => {
                    codec::to_json_pretty(&client.retrieve_active_expectations(filter).await?)?
                }
                RetrieveKind::RecordedExpectations => {
                    codec::to_json_pretty(&client.retrieve_recorded_expectations(filter).await?)?
                }
                RetrieveKind::Logs => client.retrieve_log_messages(filter).await?,
            };
            println!("{output}");
        }
        Command::Verify {
            matcher,
            exactly,
            at_least,
            at_most,
        } => {
            let request = matcher.to_request()?.unwrap_or_default();
            let times = verification_times(exactly, at_least, at_most);
            match client.verify(&request, times).await {
                Ok(()) => println!("{GREEN}verified{RESET} received {times}"),
                Err(ClientError::Assertion(message)) => {
                    println!("{RED}{BOLD}verification failed{RESET}");
                    println!("{message}");
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Stop { ignore_failure } => {
            client.stop_with(ignore_failure).await?;
            if client.is_running_with(1, Duration::ZERO).await {
                println!("{YELLOW}Warning:{RESET} {target} still answering");
            } else {
                println!("{GREEN}stopped{RESET} {DIM}{target}{RESET}");
            }
        }
        Command::Bind { ports } => {
            let bound = client.bind(&ports).await?;
            let list: Vec<String> = bound.ports.iter().map(u16::to_string).collect();
            println!(
                "{GREEN}listening{RESET} on {BOLD}{}{RESET}",
                list.join(", ")
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_connection_flags() {
        let args = Args::try_parse_from([
            "mockserver",
            "reset",
            "--host",
            "mock.internal",
            "--port",
            "1090",
            "--context-path",
            "/ctx",
        ])
        .unwrap();
        assert_eq!(args.host, "mock.internal");
        assert_eq!(args.port, 1090);
        assert_eq!(args.context_path, "/ctx");
        assert!(matches!(args.command, Command::Reset));
    }

    #[test]
    fn test_matcher_flags_override_json() {
        let json = r#"{"method": "GET", "path": "/x", "headers": {"Accept": ["json"]}}"#;
        let matcher = MatcherArgs {
            method: Some("post".to_string()),
            path: Some("orders".to_string()),
            request: Some(json.to_string()),
        };
        let request = matcher.to_request().unwrap().unwrap();
        assert_eq!(request.method.as_deref(), Some("POST"));
        assert_eq!(request.path.as_deref(), Some("/orders"));
        assert_eq!(request.header("accept"), Some("json"));
        assert!(MatcherArgs::default().to_request().unwrap().is_none());
    }

    #[test]
    fn test_verification_times_from_flags() {
        assert_eq!(
            verification_times(Some(2), None, None),
            VerificationTimes::exactly(2)
        );
        assert_eq!(
            verification_times(None, Some(1), Some(3)),
            VerificationTimes::between(1, 3)
        );
        assert_eq!(
            verification_times(None, None, None),
            VerificationTimes::at_least(1)
        );
    }

    #[test]
    fn test_exactly_conflicts_with_bounds() {
        let result = Args::try_parse_from([
            "mockserver",
            "verify",
            "--exactly",
            "1",
            "--at-least",
            "2",
        ]);
        assert!(result.is_err());
    }
}
