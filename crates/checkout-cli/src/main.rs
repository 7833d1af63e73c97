//! checkout-cli
//!
//! Drives one embedded-checkout session from a terminal. Useful for trying a
//! processor integration without a mobile build.

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_client::{ClientConfig, HttpInitializer, MockInitializer};
use checkout_core::{RedirectEndpoint, SessionInitializer, SessionRequest};
use checkout_runtime::{Controller, ControllerConfig};

use crate::console::{ConsoleDisplay, ConsoleHost, Finished, PromptSlot, answer_prompt};

#[derive(Debug, Parser)]
#[command(name = "checkout-cli", version, about = "Run an embedded checkout session from the terminal")]
struct Args {
    /// JSON file holding the session request
    #[arg(short, long)]
    request: PathBuf,

    /// Override the processor's session endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Override the in-app redirect endpoint
    #[arg(long)]
    redirect_url: Option<String>,

    /// Use the offline mock processor
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the session dialogue
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.request)
        .with_context(|| format!("reading {}", args.request.display()))?;
    let mut request: SessionRequest =
        serde_json::from_str(&raw).context("parsing session request")?;
    if request.authorization.is_empty() {
        request.authorization = std::env::var("CHECKOUT_AUTHORIZATION").unwrap_or_default();
    }

    let mut controller_config = ControllerConfig::from_env()?;
    if let Some(redirect) = &args.redirect_url {
        controller_config.redirect = RedirectEndpoint::parse(redirect)?;
    }

    let initializer: Arc<dyn SessionInitializer> = if args.mock {
        tracing::warn!("Using mock processor - no real payment will be created");
        Arc::new(MockInitializer::new())
    } else {
        let mut client_config = ClientConfig::from_env()?;
        if let Some(endpoint) = &args.endpoint {
            client_config = client_config.with_endpoint(endpoint)?;
        }
        Arc::new(HttpInitializer::new(client_config)?)
    };

    tracing::info!(
        tx_ref = %request.tx_ref,
        amount = %request.amount,
        currency = %request.currency,
        processor = %initializer.name(),
        "Starting checkout"
    );

    let (finished_tx, mut finished_rx) = mpsc::unbounded_channel();
    let prompt: PromptSlot = Arc::default();
    let handle = Controller::spawn(
        initializer,
        Arc::new(ConsoleDisplay),
        Arc::new(ConsoleHost::new(finished_tx, prompt.clone())),
        request,
        controller_config,
    );
    handle.begin();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let finished = loop {
        tokio::select! {
            finished = finished_rx.recv() => break finished,
            line = lines.next_line() => {
                let Some(line) = line? else { break None };
                if answer_prompt(&prompt, &line) {
                    continue;
                }
                match line.trim() {
                    "" => {}
                    "abort" => handle.abort(),
                    "reload" => handle.reload(),
                    location => handle.navigated(location),
                }
            }
        }
    };

    handle.shutdown();

    match finished {
        Some(Finished::Completed(outcome)) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Some(Finished::Aborted) => {
            println!("Payment abandoned.");
            Ok(())
        }
        Some(Finished::Failed(error)) => {
            anyhow::bail!("initialization failed [{}]: {}", error.code, error.message)
        }
        Some(Finished::Malformed(error)) => anyhow::bail!("{error}"),
        None => {
            println!("Input closed before the checkout finished.");
            Ok(())
        }
    }
}
