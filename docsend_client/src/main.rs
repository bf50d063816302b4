use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::anyhow;
use clap::Parser;
use colored::Colorize;
use log::{error, info, warn};

use docsend_api::{ApiClient, HttpUploader};
use docsend_core::{
    api::{ClientId, FileId},
    config::ConfigFile,
    upload::session::{Removal, UploadMirror, UploadSession},
    util::format_bytes,
};

mod batch;
mod files;
mod state;

/// Attach document archives, upload them, and dispatch them to a client by email.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Files to attach and upload
    files: Vec<PathBuf>,

    /// Client record the email goes to (overrides the config file)
    #[arg(short, long)]
    client_id: Option<String>,

    /// Dispatch the email once the uploads settle
    #[arg(short, long)]
    send: bool,

    /// Print the restored submission state and exit
    #[arg(long)]
    status: bool,

    /// Remove a previously attached file by its id
    #[arg(long, value_name = "FILE_ID")]
    remove: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("{} {}", "Error:".bright_red(), err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();
    dotenvy::dotenv().ok();
    let args = Args::parse();

    info!(
        "{}",
        format!("Docsend Client v{}", env!("CARGO_PKG_VERSION")).red()
    );

    let config_path =
        std::env::var("DOCSEND_CONFIG_PATH").unwrap_or_else(|_| "docsend.toml".to_string());
    let config_text = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|_| anyhow!("No {} found!", config_path))?;
    let config: ConfigFile = toml::from_str(&config_text)?;

    let policy = config.policy()?;
    let mirror = state::JsonStateMirror::new(config.state_path());
    let mut session = UploadSession::restore(policy, mirror)?;

    if args.status {
        print_status(&session);
        return Ok(());
    }

    let api = ApiClient::new(&config.server_url, config.token.as_deref())?;

    if let Some(remove) = args.remove {
        return remove_file(&mut session, &api, remove).await;
    }

    let instant = Instant::now();

    if !args.files.is_empty() {
        let candidates = files::gather_candidates(&args.files)?;
        let admitted = session.add_files(candidates)?;
        for message in session.errors() {
            error!("{}", message.red());
        }
        session.clear_errors();

        for record in &admitted {
            info!(
                "[{}] Uploading {} ({})...",
                "@".purple(),
                record.name.purple(),
                format_bytes(record.size)
            );
        }
        let uploader = Arc::new(HttpUploader::new(api.clone()));
        batch::run_batch(&mut session, uploader, admitted).await?;
        for message in session.errors() {
            error!("{}", message.red());
        }
    }

    let attachment_ids = session.attachment_ids();
    info!("{} file(s) ready to send.", attachment_ids.len());

    if args.send {
        let client_id = args
            .client_id
            .clone()
            .or_else(|| config.client_id.clone())
            .ok_or_else(|| {
                anyhow!("No client selected! Pass --client-id or set client_id in {config_path}")
            })?;
        if attachment_ids.is_empty() {
            return Err(anyhow!("No completed uploads to send."));
        }

        let response = api.send_email(ClientId(client_id), attachment_ids).await?;
        info!("{}", response.message.green());
        if let Some(email_id) = response.data.email_id {
            session.clear()?;
            info!(
                "[{}] Submission {} dispatched, local state cleared.",
                "#".green(),
                email_id.0.green()
            );
        } else {
            info!("Email queued; keeping local state until the server confirms.");
        }
    }

    info!(
        "{} Done in {:.2}s",
        "SUCCESS!".green(),
        instant.elapsed().as_secs_f32()
    );

    Ok(())
}

async fn remove_file<M: UploadMirror>(
    session: &mut UploadSession<M>,
    api: &ApiClient,
    id: String,
) -> anyhow::Result<()> {
    match session.remove(&FileId(id.clone()))? {
        Removal::NotFound => warn!("No attached file with id {}", id.yellow()),
        Removal::Deleted { attachment_id } => {
            info!("[{}] {} removed.", "-".red(), id.red());
            // Best effort: local state already moved on.
            if let Err(err) = api.delete_attachment(&attachment_id).await {
                warn!(
                    "Could not delete remote attachment {}: {}",
                    attachment_id.0, err
                );
            }
        }
        Removal::Cancelled | Removal::Discarded => {
            info!("[{}] {} removed.", "-".red(), id.red());
        }
    }
    Ok(())
}

fn print_status<M: UploadMirror>(session: &UploadSession<M>) {
    if session.files().is_empty() {
        info!("No attached files.");
        return;
    }
    for record in session.files() {
        let attachment = record
            .attachment_id
            .as_ref()
            .map(|attachment| attachment.0.as_str())
            .unwrap_or("-");
        info!(
            "[{}] {} {} ({}) attachment: {}",
            record.status,
            record.id.0.blue(),
            record.name,
            format_bytes(record.size),
            attachment
        );
    }
}
