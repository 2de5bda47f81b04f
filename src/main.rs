use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use savemedha_gateway::config::Config;
use savemedha_gateway::gateway::GatewayClient;
use savemedha_gateway::logging::init_tracing;
use savemedha_gateway::resources::{Resource, ResourceClient};
use savemedha_gateway::session::{Credentials, SessionStore};
use savemedha_gateway::storage::FileStorage;
use savemedha_gateway::ui::{BusyOverlay, LoginRedirect, Navigator, LOGIN_LOCATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "savemedha", about = "Savemedha admin API client", version)]
struct Cli {
    /// Backend base URL (overrides config file and VITE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// GET an arbitrary API path
    Get { path: String },
    /// List a resource collection (blogs, services, jobs, ...)
    List { resource: String },
}

/// Terminal stand-in for the login view redirect.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn current_location(&self) -> String {
        "/cli".to_string()
    }

    fn navigate(&self, location: &str) {
        if location == LOGIN_LOCATION {
            eprintln!("Session expired, please log in again (savemedha login)");
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    Ok(Config::resolve(cli.config.as_deref(), cli.api_url.as_deref())?)
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let storage = Arc::new(FileStorage::new(config.storage.session_path()));
    let session = SessionStore::open(storage);
    let gateway = GatewayClient::new(config.api.clone())?;
    gateway.configure(Arc::new(session.clone()))?;

    let mut events = gateway.subscribe();
    if std::io::stderr().is_terminal() {
        let mut overlay = BusyOverlay::new(&gateway.busy());
        tokio::spawn(async move {
            while let Some(visible) = overlay.changed().await {
                if visible {
                    eprintln!("Processing request...");
                }
            }
        });
    }

    let result = match cli.command {
        Command::Login { email, password } => {
            let credentials = Credentials::new(email, password);
            match session.login(&gateway, &credentials).await {
                Ok(user) => print_json(&serde_json::to_value(&user)?),
                Err(_) => Err(anyhow!(session
                    .snapshot()
                    .error
                    .unwrap_or_else(|| "Login failed".to_string()))),
            }
        }
        Command::Logout => {
            session.logout();
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            let snapshot = session.snapshot();
            match snapshot.user {
                Some(user) if snapshot.token.is_some() => print_json(&serde_json::to_value(&user)?),
                _ if snapshot.token.is_some() => {
                    println!("Signed in (no profile stored)");
                    Ok(())
                }
                _ => Err(anyhow!("Not logged in")),
            }
        }
        Command::Get { path } => {
            let value = gateway
                .get(&path)
                .await
                .with_context(|| format!("GET {} failed", path))?;
            print_json(&value)
        }
        Command::List { resource } => {
            let resource = Resource::parse(&resource).ok_or_else(|| {
                let known: Vec<&str> = Resource::all().iter().map(|r| r.slug()).collect();
                anyhow!("Unknown resource '{}'. Known: {}", resource, known.join(", "))
            })?;
            let client = ResourceClient::new(gateway.clone(), resource);
            match client.fetch_all().await {
                Ok(items) => print_json(&Value::Array(items)),
                Err(_) => Err(anyhow!(client
                    .snapshot()
                    .error
                    .unwrap_or_else(|| format!("Failed to load {}", resource.label())))),
            }
        }
    };

    let redirect = LoginRedirect::new(Arc::new(TerminalNavigator));
    while let Ok(event) = events.try_recv() {
        redirect.handle(&event);
    }

    result
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
