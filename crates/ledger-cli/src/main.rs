use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:5500)
    #[arg(long, global = true, default_value = "http://127.0.0.1:5500")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction to the pending pool
    Submit {
        /// First party (e.g. the nominee)
        #[arg(long)]
        party_a: String,
        /// Second party (e.g. the voter)
        #[arg(long)]
        party_b: String,
    },
    /// Mine the pending pool into a new block
    Mine,
    /// Print the node's full chain
    Chain,
    /// List transactions waiting for the next block
    Pending,
    /// Register one or more peers with the node
    Register {
        /// Peer address, e.g. http://127.0.0.1:5501 (repeatable)
        #[arg(required = true)]
        peers: Vec<String>,
    },
    /// Ask the node to adopt the longest valid chain among its peers
    Resolve,
}

#[derive(Serialize)]
struct TxIn {
    party_a: String,
    party_b: String,
}

#[derive(Serialize)]
struct RegisterIn {
    nodes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = Client::new();
    let res = match cli.cmd {
        Command::Submit { party_a, party_b } => {
            let tx = TxIn { party_a, party_b };
            client
                .post(format!("{node}/transactions/new"))
                .json(&tx)
                .send()
                .await?
        }
        Command::Mine => client.get(format!("{node}/mine")).send().await?,
        Command::Chain => client.get(format!("{node}/chain")).send().await?,
        Command::Pending => {
            client
                .get(format!("{node}/transactions/pending"))
                .send()
                .await?
        }
        Command::Register { peers } => {
            client
                .post(format!("{node}/nodes/register"))
                .json(&RegisterIn { nodes: peers })
                .send()
                .await?
        }
        Command::Resolve => client.get(format!("{node}/nodes/resolve")).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    debug!(%status, bytes = body.len(), "node answered");
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
