use clap::{Args, Subcommand};
use colored::Colorize;
use log::info;

use docsend_core::{api::ClientCreateBody, models::clients::ClientStatus, util::mask_tax_id};

use crate::config;

#[derive(Subcommand)]
pub enum ClientsCommand {
    /// List client records
    List(ListCommand),
    /// Create a client record
    Create(CreateCommand),
}

impl ClientsCommand {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        match self {
            Self::List(cmd) => cmd.run().await,
            Self::Create(cmd) => cmd.run().await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only show clients whose name contains this text
    #[arg(short, long)]
    filter: Option<String>,
}

impl ListCommand {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let (_, cfg) = config::load().await?;
        let api = config::api(&cfg)?;
        let clients = api.clients().await?;

        let filter = self.filter.as_deref().map(str::to_lowercase);
        let mut shown = 0usize;
        for client in clients.iter().filter(|client| match &filter {
            Some(filter) => client.name.to_lowercase().contains(filter),
            None => true,
        }) {
            shown += 1;
            let status = match client.status {
                ClientStatus::Sent => "sent".green(),
                ClientStatus::NotSent => "not sent".yellow(),
            };
            info!(
                "{} {} [{}] {} <{}> {}",
                client.id.0.blue(),
                client.name.bold(),
                mask_tax_id(&client.tax_id),
                client.accountant.name,
                client.accountant.email,
                status
            );
        }
        info!("{} client(s).", shown);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct CreateCommand {
    /// Company name
    #[arg(long)]
    name: String,

    /// 14-digit registry number
    #[arg(long)]
    tax_id: String,

    /// Accountant receiving the submissions
    #[arg(long)]
    accountant_name: String,

    /// Accountant email
    #[arg(long)]
    accountant_email: String,
}

impl CreateCommand {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let (_, cfg) = config::load().await?;
        let api = config::api(&cfg)?;
        api.create_client(&ClientCreateBody {
            name: self.name.clone(),
            tax_id: self.tax_id.clone(),
            accountant_name: self.accountant_name.clone(),
            accountant_email: self.accountant_email.clone(),
        })
        .await?;
        info!("{}", format!("Client {} created.", self.name).green());
        Ok(())
    }
}
