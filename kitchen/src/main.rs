use clap::Parser;
use kitchen::{Application, Config, config::Args, telemetry};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!("{} is valid.", args.config);
        return Ok(());
    }

    telemetry::init_telemetry(config.log_format)?;
    tracing::debug!(config_file = %args.config, "Configuration loaded");

    Application::new(config).await?.serve(stop_requested()).await
}

/// Resolves on Ctrl+C, or SIGTERM on unix. A signal that can't be watched is logged and never
/// fires, so the other one still stops the kitchen.
async fn stop_requested() {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "Ctrl+C",
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    tracing::info!("Received {received}, finishing in-flight requests");
}
