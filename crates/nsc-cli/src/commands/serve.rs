//! Web server command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use nsc_core::config::redact_uri;
use nsc_core::{AppConfig, ConsoleError, ConsoleResult, ErrorKind};
use nsc_docstore::DocumentAdapter;
use nsc_graph::GraphAdapter;
use nsc_web::state::{AppState, Handle};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "3030")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Policy file (TOML); takes precedence over NSC_CONFIG
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path (defaults to ./nosql-console.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Bound a startup connection attempt.
async fn within<T>(
    store: &str,
    timeout: Duration,
    attempt: impl Future<Output = ConsoleResult<T>>,
) -> ConsoleResult<T> {
    tokio::time::timeout(timeout, attempt)
        .await
        .unwrap_or_else(|_| {
            Err(ConsoleError::connection(format!(
                "{} did not answer within {}s",
                store,
                timeout.as_secs()
            )))
        })
}

/// Unsupported URIs stop startup; anything else only disables the panel.
fn into_handle<T>(store: &str, result: ConsoleResult<T>) -> Result<Handle<T>> {
    match result {
        Err(e) if e.kind() == ErrorKind::ConfigError => Err(e.into()),
        Err(e) => {
            warn!(store = store, "{}", e);
            Ok(Handle::from_result(Err(e)))
        }
        ok => Ok(Handle::from_result(ok)),
    }
}

fn status_line<T>(name: &str, uri: &str, handle: &Handle<T>) {
    match handle {
        Handle::Ready(_) => println!("  {}  {}", name.green(), redact_uri(uri)),
        Handle::Unavailable(message) => {
            println!("  {}  {} {}", name.red(), redact_uri(uri), message.dimmed())
        }
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = AppConfig::from_env(args.config.as_deref())?;
    let connections = &config.connections;
    let policy = config.policy.clone();
    let timeout = Duration::from_secs(policy.connect_timeout_secs);

    let documents = within(
        "document store",
        timeout,
        nsc_docstore::connect(&connections.document_uri),
    )
    .await
    .map(|store| DocumentAdapter::new(store, policy.page_size));
    let documents = into_handle("documents", documents)?;

    let graph = within(
        "graph store",
        timeout,
        nsc_graph::connect(
            &connections.graph_uri,
            &connections.graph_user,
            &connections.graph_password,
        ),
    )
    .await
    .map(|store: Arc<dyn nsc_graph::GraphStore>| GraphAdapter::new(store, policy.clone()));
    let graph = into_handle("graph", graph)?;

    println!();
    println!(
        "  {} {}",
        "NoSQL".cyan().bold(),
        "Console".bold()
    );
    println!();
    status_line("Documents", &connections.document_uri, &documents);
    status_line("Graph    ", &connections.graph_uri, &graph);
    println!();
    println!(
        "  {}  http://{}:{}",
        "Dashboard".green(),
        args.host,
        args.port
    );
    println!(
        "  {}        http://{}:{}/api",
        "API".green(),
        args.host,
        args.port
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let state = AppState::new(documents, graph, policy);
    nsc_web::run_server(state, &args.host, args.port).await?;

    Ok(())
}
