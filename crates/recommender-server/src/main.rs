//! Recommender server entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use recommender::config::Config;
use recommender::embedding::SentenceEmbedder;
use recommender_server::cli::{
    Cli, Command, build_engine, format_report, load_embedder, prepare_embeddings, run_evaluate,
    run_predict,
};
use recommender_server::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.health_check {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = cli.apply(Config::from_env()?);
    config.validate()?;

    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::PrepareEmbeddings { force } => {
            let embedder = load_embedder(&config)?;
            let rows = prepare_embeddings(&config, &embedder, force)?;
            println!(
                "Saved embeddings for {rows} rows to {}",
                config.embeddings_path.display()
            );
            Ok(())
        }
        Command::Evaluate { dataset, k } => {
            let engine = build_engine(&config, load_embedder(&config)?)?;
            let report = run_evaluate(&engine, &dataset, k)?;
            print!("{}", format_report(&report));
            Ok(())
        }
        Command::Predict { dataset, output, k } => {
            let engine = build_engine(&config, load_embedder(&config)?)?;
            let lines = run_predict(&engine, &dataset, &output, k)?;
            println!("Saved {lines} predictions to {}", output.display());
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        catalog = %config.catalog_path.display(),
        top_k = config.top_k,
        "Recommender starting"
    );

    let state: HandlerState<SentenceEmbedder> =
        HandlerState::new(config.top_k, config.cors_origins.clone());

    // The listener comes up immediately; /ready reports 503 until the engine is published.
    let build_config = config.clone();
    state.spawn_engine_build(move || {
        let embedder = SentenceEmbedder::load(build_config.embedder_config())?;
        build_engine(&build_config, embedder)
    });

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Recommender shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var("RECOMMENDER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let url = format!("http://127.0.0.1:{}/health", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
