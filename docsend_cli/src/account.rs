use clap::Args;
use colored::Colorize;
use log::info;

use crate::config;

/// Create an account on the server
#[derive(Args, Debug)]
pub struct RegisterCommand {
    /// Display name for the account
    #[arg(long)]
    name: String,

    /// Sign-in email
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long)]
    password: String,
}

impl RegisterCommand {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let (_, cfg) = config::load().await?;
        let api = config::api(&cfg)?;
        api.register(&self.name, &self.email, &self.password)
            .await?;
        info!(
            "{}",
            "Account created. Log in to fetch your API token.".green()
        );
        Ok(())
    }
}

/// Log in and store the API token in the config file
#[derive(Args, Debug)]
pub struct LoginCommand {
    /// Sign-in email
    #[arg(long)]
    email: String,

    /// Password
    #[arg(long)]
    password: String,
}

impl LoginCommand {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let (path, mut cfg) = config::load().await?;
        let api = config::api(&cfg)?;
        let token = api.login(&self.email, &self.password).await?;
        cfg.token = Some(token);
        config::save(&path, &cfg).await?;
        info!("{}", format!("Signed in. Token saved to {path}.").green());
        Ok(())
    }
}

/// Show the signed-in profile
#[derive(Args, Debug)]
pub struct ProfileCommand {}

impl ProfileCommand {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let (_, cfg) = config::load().await?;
        let api = config::api(&cfg)?;
        let profile = api.profile().await?;
        info!("{} <{}>", profile.name.bold(), profile.email);
        Ok(())
    }
}
