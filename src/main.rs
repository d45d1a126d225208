use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info};

use zoom_deprovisioner_lib::api::ZoomClient;
use zoom_deprovisioner_lib::config::ApiConfig;
use zoom_deprovisioner_lib::run::{RunPaths, RunStamp};
use zoom_deprovisioner_lib::sync::SyncError;
use zoom_deprovisioner_lib::{confirm, deprovision, importer, logging, sync};

#[derive(clap::Parser, Debug)]
#[command(version, about = "Deprovision Zoom users listed in a CSV file", long_about = None)]
struct Args {
    /// Filepath for CSV Zoom users to deprovision list
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// API config file (defaults to .zoom_api_config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the log and backup files are written to
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Back up and report the directory, but delete nothing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    let stamp = RunStamp::now();
    let paths = RunPaths::new(&args.log_dir, &stamp);
    logging::init_logging(&paths.log_file)
        .with_context(|| format!("Failed to open log file {}", paths.log_file.display()))?;

    let config = ApiConfig::load(args.config.as_deref())?;
    let client = ZoomClient::new(config)?;

    info!("Welcome to Zoom User Deprovisioner");

    let csv_path = match args.file {
        Some(path) => {
            info!("Using provided file argument.");
            path
        }
        None => {
            info!("Did not detect file argument, asking for input instead.");
            prompt_for_path()?
        }
    };

    if let Err(e) = importer::validate_import_path(&csv_path) {
        error!("{}", e);
        return Ok(());
    }

    let emails = importer::import_emails(&csv_path)?;

    let outcome = match sync::sync_directory(&client, &paths.backup_file, &emails).await {
        Ok(outcome) => outcome,
        Err(SyncError::Api(e)) => {
            error!("{}", e.diagnostics());
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    if args.dry_run {
        info!("Dry run requested; no users were deprovisioned. Exiting.");
        return Ok(());
    }

    if outcome.targets.is_empty() {
        info!("No users from the imported file were found in Zoom. Exiting.");
        return Ok(());
    }

    info!("Please note that due to Zoom API restrictions only 10 requests per second may be processed.");
    info!("Double checking with user before proceeding.");

    if !confirm::proceed_double_check()? {
        info!("User indicated not to proceed with deprovisioning. Exiting.");
        return Ok(());
    }

    info!("Received confirmation to proceed. Starting deprovisioning process now.");
    deprovision::deprovision_users(&client, &outcome.targets).await;
    info!("Finished deprovisioning Zoom users. Recommended: confirm new user counts and backup user listing files. Exiting.");

    Ok(())
}

fn prompt_for_path() -> dialoguer::Result<PathBuf> {
    let raw =
        confirm::prompt_text("Please enter a filepath for CSV Zoom users to deprovision list")?;
    Ok(PathBuf::from(importer::clean_path_input(&raw)))
}
