//! pepcli - submit a XACML Request to a PEPd and show the XACML
//! Response.
//!
//! Exit codes: 0 success, 2 option error, 3 certchain error, 4 response
//! rendering error, 5 PEP client error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use pepc_core::client::{ClientConfig, ClientError, PepClient};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod certchain;
mod render;
mod request;

use certchain::CertchainError;

/// Submit a XACML Request to a PEPd and show the XACML Response.
#[derive(Parser, Debug)]
#[command(name = "pepcli", version, about, long_about = None)]
struct Cli {
    /// PEPd endpoint URL. Repeat for failover.
    #[arg(short = 'p', long = "pepd", value_name = "URL", required = true)]
    pepd: Vec<String>,

    /// XACML Subject identifier: user DN (RFC 2253 format).
    #[arg(short = 's', long = "subjectid", value_name = "DN")]
    subjectid: Option<String>,

    /// XACML Subject cert-chain: proxy or X.509 PEM file.
    #[arg(short = 'c', long = "certchain", value_name = "FILE")]
    certchain: Option<PathBuf>,

    /// XACML Subject voms-primary-fqan and voms-fqan. Repeat for
    /// secondary FQANs; the first one is the primary FQAN.
    #[arg(short = 'f', long = "fqan", value_name = "FQAN")]
    fqan: Vec<String>,

    /// XACML Resource identifier.
    #[arg(short = 'r', long = "resourceid", value_name = "URI")]
    resourceid: Option<String>,

    /// XACML Action identifier.
    #[arg(short = 'a', long = "actionid", value_name = "URI")]
    actionid: Option<String>,

    /// Connection timeout in seconds.
    #[arg(short = 't', long = "timeout", value_name = "SEC")]
    timeout: Option<u64>,

    /// Show the effective XACML Request context.
    #[arg(short = 'x', long = "requestcontext")]
    requestcontext: bool,

    /// Print the XACML Response as JSON.
    #[arg(long)]
    json: bool,

    /// Verbose output (full response dump).
    #[arg(short, long)]
    verbose: bool,

    /// Turn off output.
    #[arg(short, long)]
    quiet: bool,

    /// Show debug information.
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Certchain(#[from] CertchainError),

    #[error("failed to render response as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Certchain(_) => ExitCode::from(3),
            Self::Json(_) => ExitCode::from(4),
            Self::Client(_) => ExitCode::from(5),
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.debug {
        "debug"
    } else if cli.verbose && !cli.quiet {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    for (i, url) in cli.pepd.iter().enumerate() {
        info!(%url, rank = i, "pepd endpoint");
    }
    for (i, fqan) in cli.fqan.iter().enumerate() {
        if i == 0 {
            info!(%fqan, "primary fqan");
        } else {
            info!(%fqan, "fqan");
        }
    }

    let chain = match &cli.certchain {
        Some(path) => Some(certchain::read_certchain(path)?),
        None => None,
    };

    let request = request::build_request(
        cli.subjectid.as_deref(),
        chain.as_deref(),
        &cli.fqan,
        cli.resourceid.as_deref(),
        cli.actionid.as_deref(),
    );

    let mut config = ClientConfig::default().validate_ssl(false);
    for url in &cli.pepd {
        config = config.endpoint(url);
    }
    if let Some(secs) = cli.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }
    let client = PepClient::new(config)?;

    info!("authorizing XACML request");
    let response = client.authorize(&request)?;

    if cli.quiet {
        return Ok(());
    }
    if cli.requestcontext {
        print!("{}", render::request_context(&request));
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    if cli.verbose {
        print!("{}", render::response_dump(&response));
    }
    print!("{}", render::human_summary(&response));
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pepcli: {err}");
            err.exit_code()
        },
    }
}
