//! Snapmark server binary.

#![warn(missing_docs)]

use anyhow::Result;
use axum::body::Body;
use axum::http::Request;
use clap::Parser;
use snapmark_server::{app, GameRegistry};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Snapmark - tic-tac-toe server with photo move submission
#[derive(Parser, Debug)]
#[command(name = "snapmark_server")]
#[command(about = "HTTP tic-tac-toe server with photo move submission", long_about = None)]
#[command(version)]
struct Cli {
    /// Port to bind to
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,snapmark_server=debug")),
        )
        .init();

    info!("Starting snapmark server");
    info!(port = cli.port, "Server will listen on http://{}:{}", cli.host, cli.port);

    let registry = GameRegistry::new();

    // Wrap the router with request logging
    let router = app(registry).layer(ServiceBuilder::new().map_request(
        |req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        },
    ));

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!("✅ Server ready at http://{}:{}/", cli.host, cli.port);
    axum::serve(listener, router).await?;

    Ok(())
}
