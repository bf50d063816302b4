use clap::{Parser, Subcommand};

mod account;
mod clients;
mod config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account on the server
    Register(account::RegisterCommand),
    /// Log in and store the API token in the config file
    Login(account::LoginCommand),
    /// Show the signed-in profile
    Profile(account::ProfileCommand),
    /// Manage client records
    #[command(subcommand)]
    Clients(clients::ClientsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    let args = Args::parse();

    match args.commands {
        Commands::Register(mut cmd) => cmd.run().await,
        Commands::Login(mut cmd) => cmd.run().await,
        Commands::Profile(mut cmd) => cmd.run().await,
        Commands::Clients(mut cmd) => cmd.run().await,
    }
}
