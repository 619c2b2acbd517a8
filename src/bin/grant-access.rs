//! `grant-access`: grants a single buyer access to a fresh copy of a template folder.
//!
//! Configuration comes from a TOML file (`--config`) or, without one, from the
//! `GOOGLE_*` environment variables (see `drive_grant::config`).
//! The grant result is printed to stdout as JSON; logs go to stderr.

use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use drive_grant::{
    config::GrantConfig,
    folder::CopyFolderOperation,
    grant::{AccessGranter, GrantAccessRequest},
    node::NodeId,
    storage::DriveClient,
};
use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};


/// Grants a buyer read access to their own copy of a template folder.
#[derive(Parser, Debug)]
#[command(name = "grant-access")]
#[command(version, about, long_about = None)]
struct Args {
    /// E-mail address of the buyer
    #[arg(long, env = "BUYER_EMAIL")]
    buyer_email: String,

    /// Template folder to copy (defaults to GOOGLE_TEMPLATE_FOLDER_ID)
    #[arg(long)]
    template_folder_id: Option<String>,

    /// Name of the buyer folder (defaults to "Order - <buyer e-mail>")
    #[arg(long)]
    folder_name: Option<String>,

    /// Folder to create the buyer folder in (defaults to GOOGLE_ORDERS_FOLDER_ID)
    #[arg(long)]
    destination_folder_id: Option<String>,

    /// TOML configuration file; without it, configuration is read from the environment
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every created folder and copied file
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_request(&self) -> GrantAccessRequest {
        GrantAccessRequest {
            buyer_email: self.buyer_email.clone(),
            template_folder_id: self.template_folder_id.as_deref().map(NodeId::new),
            folder_name: self.folder_name.clone(),
            destination_folder_id: self.destination_folder_id.as_deref().map(NodeId::new),
        }
    }
}


fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug,hyper=warn,h2=warn,reqwest=warn,rustls=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(filter))
        .init();
}


fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => GrantConfig::from_file(path)?,
        None => GrantConfig::from_env()?,
    };

    let client = DriveClient::new(config.credentials)?;
    let granter = AccessGranter::new(client, config.defaults);

    let result = granter.grant_access_with_progress(args.to_request(), |progress| {
        match &progress.current_operation {
            CopyFolderOperation::CreatingFolder { name, .. } => {
                debug!(folders_created = progress.folders_created, "creating folder {name}");
            }
            CopyFolderOperation::CopyingFile { name, .. } => {
                debug!(files_copied = progress.files_copied, "copying file {name}");
            }
        }
    })?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}


fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut message = error.to_string();

            let mut source = error.source();
            while let Some(cause) = source {
                message.push_str(&format!("\n  caused by: {cause}"));
                source = cause.source();
            }

            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
