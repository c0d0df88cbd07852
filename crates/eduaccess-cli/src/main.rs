//! eduaccess CLI — runs the backend and pokes a running instance.
//!
//! ```text
//! eduaccess serve [--host 0.0.0.0] [--port 5000]
//! eduaccess braille "hello world"
//! eduaccess speak "hello world" [--server http://localhost:5000]
//! eduaccess describe https://example.com/dog.jpg [--server ...]
//! ```

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eduaccess_lib::config::Settings;
use eduaccess_lib::eduaccess_core::braille::to_braille;
use eduaccess_lib::server;
use eduaccess_lib::state::AppState;

const DEFAULT_SERVER: &str = "http://localhost:5000";

/// eduaccess — accessibility backend for text, audio, Braille and images
#[derive(Parser)]
#[command(name = "eduaccess", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP backend
    Serve {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Listen host (overrides HOST)
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the Braille rendering of some text
    Braille {
        text: String,
    },
    /// Ask a running server to synthesize speech
    Speak {
        text: String,
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Ask a running server to describe an image by URL
    Describe {
        url: String,
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,eduaccess_lib=debug,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host } => {
            let mut settings = Settings::from_env()?;
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(host) = host {
                settings.host = host;
            }
            serve(settings).await?;
        }

        Command::Braille { text } => println!("{}", to_braille(&text)),

        Command::Speak { text, server } => {
            post_json(&server, "api/text-to-audio", serde_json::json!({ "text": text })).await?;
        }

        Command::Describe { url, server } => {
            post_json(&server, "api/analyze-image-url", serde_json::json!({ "url": url })).await?;
        }
    }

    Ok(())
}

async fn serve(settings: Settings) -> Result<(), Box<dyn Error>> {
    settings.ensure_dirs()?;

    if settings.speech.is_none() {
        tracing::warn!("AZURE_SPEECH_KEY/AZURE_SPEECH_REGION unset, speech routes will fail");
    }
    if settings.vision.is_none() {
        tracing::warn!("AZURE_IMAGE_API_KEY/AZURE_IMAGE_ENDPOINT unset, image routes will fail");
    }

    let addr = format!("{}:{}", settings.host, settings.port);
    tracing::info!(
        %addr,
        uploads = %settings.upload_dir.display(),
        audio = %settings.audio_dir.display(),
        "eduaccess listening"
    );

    let app = server::router(AppState::from_settings(settings));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn post_json(
    server: &str,
    path: &str,
    body: serde_json::Value,
) -> Result<(), Box<dyn Error>> {
    let resp = reqwest::Client::new()
        .post(format!("{}/{path}", server.trim_end_matches('/')))
        .json(&body)
        .send()
        .await?;
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    if status.is_success() {
        println!("{text}");
        Ok(())
    } else {
        Err(format!("server returned {status}: {text}").into())
    }
}
