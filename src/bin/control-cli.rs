use clap::{Parser, Subcommand};
use url::Url;

use proxy_control::interceptor::{ControlClient, ControlUnavailable};
use proxy_control::proxy::RequestDescriptor;

#[derive(Parser)]
#[command(name = "control-cli")]
#[command(about = "Management CLI for the proxy control service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:10016")]
    url: String,

    /// API key, when the service has one configured.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// View current proxy statistics
    Stats,
    /// Reset proxy statistics
    Reset,
    /// Dry-run a request descriptor through the policy
    CheckRequest {
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "/")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base_url = Url::parse(&cli.url)?;
    let client = ControlClient::new(base_url, cli.key)?;

    match cli.command {
        Commands::Status => print_result(client.get_status().await),
        Commands::Stats => print_result(client.get_stats().await),
        Commands::Reset => print_result(client.reset_stats().await),
        Commands::CheckRequest { method, host, path } => {
            let descriptor = RequestDescriptor {
                method,
                host,
                path,
                headers: Default::default(),
                stats: Default::default(),
            };
            match client.process_request(&descriptor).await {
                Ok(modifications) => {
                    println!("{}", serde_json::to_string_pretty(&modifications)?);
                }
                Err(e) => report_unavailable(e),
            }
        }
    }

    Ok(())
}

fn print_result(result: Result<serde_json::Value, ControlUnavailable>) {
    match result {
        Ok(json) => match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", json),
        },
        Err(e) => report_unavailable(e),
    }
}

fn report_unavailable(e: ControlUnavailable) {
    eprintln!("Error: control service unavailable: {}", e);
    std::process::exit(1);
}
