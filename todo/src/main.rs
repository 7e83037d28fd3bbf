//! Command-line demo for the todo store.
//!
//! Mounts the store against the configured GraphQL service (or an in-memory
//! one with `--mock`), adds a todo, prints the list, then unmounts.

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tasksync_core::environment::SystemClock;
use todo::mocks::InMemoryTodoApi;
use todo::{GraphQlTodoApi, TodoApi, TodoConfig, TodoEnvironment, TodoStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let config = TodoConfig::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(fmt::layer())
        .init();

    let body = std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .unwrap_or_else(|| "Try the todo store".to_string());

    if std::env::args().any(|arg| arg == "--mock") {
        tracing::info!("Using the in-memory todo service");
        run(InMemoryTodoApi::new(), &config, body).await
    } else {
        tracing::info!(url = %config.graphql.url, "Using the GraphQL todo service");
        run(GraphQlTodoApi::new(config.graphql_client()), &config, body).await
    }
}

async fn run<A: TodoApi>(api: A, config: &TodoConfig, body: String) -> anyhow::Result<()> {
    let env = TodoEnvironment::new(Arc::new(api), Arc::new(SystemClock));
    let todos = TodoStore::new(env, config.sync).with_response_timeout(config.response_timeout());

    todos.mount().await.context("mounting the todo store")?;
    let before = todos.snapshot().await.count();

    todos.set_draft_body(body).await?;
    todos.add_todo().await.context("creating the todo")?;

    // The new todo arrives through the creation channel
    for _ in 0..50 {
        if todos.snapshot().await.count() > before {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    println!("=== Todos ===\n");
    for todo in todos.sorted_todos().await {
        let status = if todo.status { "✓" } else { " " };
        println!("  [{status}] {}  {}", todo.deadline, todo.body);
    }

    let progress = todos.progress().await;
    if progress.is_nan() {
        println!("\nNo todos yet");
    } else {
        println!("\nProgress: {progress:.0}%");
    }

    todos.unmount().await?;
    Ok(())
}
