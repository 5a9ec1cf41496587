// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth-Session command line client
//!
//! Runs the session controller against the configured identity service and
//! prints the resulting session state as JSON.

use auth_session::{config::Config, AuthController, SessionState, SignInMode};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "auth-session", about = "Authentication session controller")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the current identity
    Status,
    /// Resolve again, ignoring the cached state
    Refresh,
    /// Start the OAuth sign-in flow
    SignIn,
    /// Start the OAuth sign-up flow
    SignUp,
    /// Sign out locally and remotely
    SignOut,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::info!(api = %config.api_base_url, "Starting auth-session");

    let controller = Arc::new(AuthController::from_config(&config)?);
    let listener = controller.spawn_signal_listener();

    let state = match cli.command {
        Command::Status => controller.initialize().await,
        Command::Refresh => {
            controller.initialize().await;
            controller.refresh().await
        }
        Command::SignIn => sign_in(&controller, SignInMode::SignIn).await,
        Command::SignUp => sign_in(&controller, SignInMode::SignUp).await,
        Command::SignOut => {
            controller.initialize().await;
            controller.sign_out().await
        }
    };

    println!("{}", serde_json::to_string_pretty(&state)?);

    listener.abort();
    Ok(())
}

async fn sign_in(controller: &AuthController, mode: SignInMode) -> SessionState {
    controller.initialize().await;
    if let Err(e) = controller.sign_in(mode).await {
        tracing::error!(error = %e, category = %e.category, "Sign-in failed");
    }
    controller.state()
}

/// Initialize structured JSON logging on stderr.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auth_session=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
