//! # dataflow-cli
//!
//! `dataflow graph new|add-block|connect|run|serialize` operates on a single
//! graph persisted to a local JSON file between invocations, for local
//! experimentation without a running gateway. `dataflow serve` boots the
//! gateway with an in-memory store and sandbox, the way `orchestrator-server`
//! boots the orchestrator's axum app.

mod commands;
mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dataflow")]
#[command(about = "Dataflow graph engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Operate on a single locally persisted graph.
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },
    /// Boot the HTTP gateway against an in-memory store and sandbox.
    Serve {
        /// Address to bind, overrides `DATAFLOW_GATEWAY_HOST`/`_PORT`.
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum GraphAction {
    /// Create a new, empty graph.
    New {
        /// Graph name.
        name: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Add a block to the graph.
    AddBlock {
        /// Block name.
        name: String,
        /// Block kind: base, variable, code, or llm.
        #[arg(long)]
        kind: String,
        /// Source text (code blocks) or prompt template (llm blocks).
        #[arg(long)]
        source: Option<String>,
        /// `name=json_value` pairs to seed a variable block's outputs.
        #[arg(long = "value")]
        values: Vec<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Connect one block's output to another's input.
    Connect {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long = "from-port")]
        from_port: Option<String>,
        #[arg(long = "to-port")]
        to_port: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Run every block in evaluation order.
    Run {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the stored graph's JSON to stdout.
    Serialize {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tooling::logging::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Graph { action } => run_graph_action(action).await,
        Commands::Serve { bind } => serve(bind).await,
    }
}

async fn run_graph_action(action: GraphAction) -> anyhow::Result<()> {
    match action {
        GraphAction::New { name, file } => commands::new_graph(&commands::resolve_file(file), &name),
        GraphAction::AddBlock { name, kind, source, values, file } => {
            let values = values.iter().map(|raw| commands::parse_value_pair(raw)).collect::<anyhow::Result<Vec<_>>>()?;
            commands::add_block(&commands::resolve_file(file), &name, &kind, source.as_deref(), &values)
        }
        GraphAction::Connect { from, to, from_port, to_port, file } => {
            commands::connect(&commands::resolve_file(file), &from, &to, from_port.as_deref(), to_port.as_deref())
        }
        GraphAction::Run { file } => commands::run(&commands::resolve_file(file)).await,
        GraphAction::Serialize { file } => commands::serialize(&commands::resolve_file(file)),
    }
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    use dataflow_gateway::config::GatewayConfig;
    use tooling::config::ConfigBuilder;

    let mut config = GatewayConfig::from_env_with_defaults("DATAFLOW_GATEWAY_")?;
    if let Some(bind) = bind {
        let (host, port) = bind.split_once(':').ok_or_else(|| anyhow::anyhow!("--bind must be 'host:port'"))?;
        config.host = host.to_string();
        config.port = port.parse()?;
    }

    let registry = Arc::new(dataflow_store::GraphRegistry::new(Arc::new(dataflow_store::InMemoryKvStore::new())));
    let exec_env = storage::default_exec_env();
    let auth = Arc::new(dataflow_gateway::InMemoryAuthProvider::new(Arc::clone(&registry)));
    let state = dataflow_gateway::AppState::new(registry, exec_env, auth);
    let router = dataflow_gateway::create_router(state);

    let addr = config.bind_address();
    tracing::info!(%addr, "starting dataflow gateway");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
