// SPDX-License-Identifier: Apache-2.0
//! `ocmd`: collaborator CLI/daemon over the OCM engineering core.
//!
//! Merges `jitos-cli`'s subcommand shape with `jitosd`'s axum server into
//! one binary: `status` and `run` are one-shot CLI commands, `serve` hosts
//! the same transformation-graph entry point over HTTP.

mod demo;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::{Parser, Subcommand};
use ocm_graph::GraphError;
use ocm_plugin::{PluginError, PluginManager};
use ocm_runtime::{ConfigService, FsConfigStore, Runtime};
use ocm_transform::{CancellationToken, TransformError, TransformationGraphDefinition, TransformationOrchestrator};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the loaded runtime settings and exit.
    Status,
    /// Run a transformation graph definition from a JSON file and print its
    /// outputs.
    Run {
        /// Path to a `TransformationGraphDefinition` JSON document.
        definition: PathBuf,
        /// Bound on concurrent steps within one processing frontier.
        #[clap(long)]
        worker_limit: Option<usize>,
    },
    /// Serve the core over HTTP.
    Serve {
        /// Port for the HTTP API.
        #[clap(short, long, default_value_t = 7031)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let code = match dispatch(args).await {
        Ok(()) => 0,
        Err(err) => {
            error!("{err:?}");
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

async fn dispatch(args: Args) -> Result<()> {
    let config = ConfigService::new(FsConfigStore::new().context("resolving config directory")?);
    let runtime = ocm_runtime::initialize_runtime(&config).context("initializing runtime")?;
    demo::register_demo_plugins(&runtime.plugins).context("registering demo plugins")?;
    demo::register_demo_credentials(&runtime.credentials);

    match args.cmd {
        Command::Status => {
            println!("worker_limit: {:?}", runtime.settings.worker_limit);
            println!("plugin_search_paths: {:?}", runtime.settings.plugin_search_paths);
            println!("credential_cache_ttl: {:?}", runtime.settings.credential_cache_ttl);
            let demo_identity = ocm_credentials::Identity::new([("type".to_string(), "demo".to_string())]);
            let credentials = runtime.credentials.resolve(&demo_identity).await.context("resolving demo credential")?;
            println!("demo credential: {credentials:?}");
            Ok(())
        }
        Command::Run { definition, worker_limit } => run_once(&runtime, &definition, worker_limit).await,
        Command::Serve { port } => serve(runtime, port).await,
    }
}

async fn run_once(runtime: &Runtime, definition: &PathBuf, worker_limit: Option<usize>) -> Result<()> {
    let text = std::fs::read_to_string(definition).with_context(|| format!("reading {}", definition.display()))?;
    let parsed: TransformationGraphDefinition =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", definition.display()))?;

    let orchestrator = TransformationOrchestrator::new(Arc::clone(&runtime.plugins), Arc::clone(&runtime.credentials));
    let limit = worker_limit.or(runtime.settings.worker_limit);
    let outputs = orchestrator.run(&parsed, limit, CancellationToken::new()).await?;
    println!("{}", serde_json::to_string_pretty(&outputs)?);
    Ok(())
}

#[derive(Clone)]
struct ApiState {
    plugins: Arc<PluginManager>,
    credentials: Arc<ocm_credentials::CredentialGraph>,
    worker_limit: Option<usize>,
}

async fn serve(runtime: Runtime, port: u16) -> Result<()> {
    let state = ApiState {
        plugins: runtime.plugins,
        credentials: runtime.credentials,
        worker_limit: runtime.settings.worker_limit,
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/transform/run", post(run_transformation))
        .with_state(state);

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse().context("parsing bind address")?;
    let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, "ocmd listening");
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn run_transformation(
    State(state): State<ApiState>,
    Json(definition): Json<TransformationGraphDefinition>,
) -> Result<Json<HashMap<String, serde_json::Value>>, StatusCode> {
    let orchestrator = TransformationOrchestrator::new(Arc::clone(&state.plugins), Arc::clone(&state.credentials));
    orchestrator.run(&definition, state.worker_limit, CancellationToken::new()).await.map(Json).map_err(|err| {
        error!("{err}");
        match err {
            TransformError::Plugin(_) => StatusCode::BAD_GATEWAY,
            TransformError::Graph(GraphError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    })
}

/// Maps a failure to the exit-code discipline the collaborator CLI honours:
/// `1` user error, `2` remote/plugin error, `3` cancellation.
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(plugin_err) = cause.downcast_ref::<PluginError>() {
            return plugin_exit_code(plugin_err);
        }
        if let Some(transform_err) = cause.downcast_ref::<TransformError>() {
            return match transform_err {
                TransformError::Plugin(plugin_err) => plugin_exit_code(plugin_err),
                TransformError::Graph(GraphError::Cancelled) => 3,
                _ => 1,
            };
        }
        if matches!(cause.downcast_ref::<GraphError<String>>(), Some(GraphError::Cancelled)) {
            return 3;
        }
    }
    1
}

fn plugin_exit_code(err: &PluginError) -> i32 {
    match err {
        PluginError::Http { .. } | PluginError::StartupTimeout { .. } | PluginError::Process { .. } | PluginError::Shutdown { .. } => 2,
        _ => 1,
    }
}
