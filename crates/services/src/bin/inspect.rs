use std::fmt;
use std::sync::Arc;

use api::{ApiConfig, HttpApi};
use plan_core::SessionId;
use services::{SessionDetail, SessionService};

#[derive(Debug, Clone)]
struct Args {
    base_url: String,
    token: String,
    session: Option<SessionId>,
    limit: u32,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSession { raw: String },
    InvalidLimit { raw: String },
    MissingToken,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSession { raw } => write!(f, "invalid --session value: {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::MissingToken => write!(f, "PLAN_API_TOKEN (or --token) is required"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut base_url =
            std::env::var("PLAN_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());
        let mut token = std::env::var("PLAN_API_TOKEN").ok();
        let mut session: Option<SessionId> = None;
        let mut limit: u32 = 20;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--base" => {
                    base_url = require_value(&mut args, "--base")?;
                }
                "--token" => {
                    token = Some(require_value(&mut args, "--token")?);
                }
                "--session" => {
                    let value = require_value(&mut args, "--session")?;
                    let parsed = value
                        .parse::<SessionId>()
                        .map_err(|_| ArgsError::InvalidSession { raw: value.clone() })?;
                    session = Some(parsed);
                }
                "--limit" => {
                    let value = require_value(&mut args, "--limit")?;
                    limit = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let token = token
            .filter(|value| !value.trim().is_empty())
            .ok_or(ArgsError::MissingToken)?;

        Ok(Self {
            base_url,
            token,
            session,
            limit,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p services --bin inspect -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --base <url>              Backend base URL (default: http://localhost:8000)");
    eprintln!("  --token <token>           Bearer token for the backend");
    eprintln!("  --session <id>            Print the detail view of one session");
    eprintln!("  --limit <n>               Row count when listing sessions (default: 20)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  PLAN_API_URL, PLAN_API_TOKEN");
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let api = HttpApi::new(ApiConfig {
        base_url: args.base_url,
        token: args.token,
    });
    let service = SessionService::new(Arc::new(api));

    match args.session {
        Some(id) => {
            let session = service.fetch_session(id).await?;
            let plan = session.plan();
            let tracker = service.tracker(id);
            tracker.load().await;
            let detail = SessionDetail::from_parts(&session, &plan, &tracker.snapshot());
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        None => {
            let sessions = service.list_sessions(args.limit).await?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
