use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "config-cli")]
#[command(about = "Query a running configuration service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full bound configuration
    Full,
    /// Show the database group
    Database,
    /// Show the security group
    Security,
    /// Show the status snapshot
    Status,
    /// Show the environment-specific payload
    EnvironmentInfo,
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Full => "/api/config",
            Commands::Database => "/api/config/database",
            Commands::Security => "/api/config/security",
            Commands::Status => "/api/config/status",
            Commands::EnvironmentInfo => "/api/config/environment-info",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path()))
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Config API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("request failed with status {}", status).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
