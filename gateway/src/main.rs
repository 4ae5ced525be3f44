use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use relay_gateway::{
    ServerConfig, build_router,
    client::{ClientOptions, WavCaptureSource, WavRenderEngine, run_client},
    state::AppState,
};

/// Relay Gateway - realtime voice relay with server-side tools
#[derive(Parser, Debug)]
#[command(name = "relay-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream a WAV file to a relay and record the assistant's reply
    Client {
        /// Relay WebSocket URL
        #[arg(short = 'u', long = "url", default_value = "ws://127.0.0.1:3001/realtime")]
        url: String,

        /// Input WAV file (24 kHz)
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: PathBuf,

        /// Output WAV file for the rendered playback
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: PathBuf,

        /// Seconds to keep listening after the input ends
        #[arg(long = "linger", default_value_t = 5)]
        linger: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    if let Some(Commands::Client {
        url,
        input,
        output,
        linger,
    }) = cli.command
    {
        return run_headless_client(url, input, output, linger).await;
    }

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        println!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    let address = config.address();
    println!("Starting server on {address}");

    // Create application state
    let app_state = AppState::new(config)?;
    let app = build_router(app_state);

    // Parse socket address
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    println!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn run_headless_client(
    url: String,
    input: PathBuf,
    output: PathBuf,
    linger: u64,
) -> anyhow::Result<()> {
    let source = WavCaptureSource::open(&input)
        .map_err(|e| anyhow!("Failed to open {}: {}", input.display(), e))?;
    info!(input = %input.display(), samples = source.remaining(), "Capture source ready");

    let mut options = ClientOptions::new(url);
    options.linger = std::time::Duration::from_secs(linger);

    let (report, engine) = run_client(&options, source, WavRenderEngine::new()).await?;
    let rendered = engine.finish(&output)?;

    println!(
        "Sent {} frames ({} dropped), scheduled {} chunks, {} interruptions; wrote {:.2}s to {}",
        report.frames_sent,
        report.frames_dropped,
        report.chunks_scheduled,
        report.interruptions,
        rendered.as_secs_f64(),
        output.display()
    );
    Ok(())
}
