use anyhow::Result;
use ogn_client::args::Args;
use ogn_client::{AprsClient, Config, ConnectionState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

fn init_logging(verbose: u8) -> Result<()> {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "ogn_listen={0},ogn_client={0},ogn_message=info,protocol_trace=info",
                    log_level
                )
                .into()
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

/// Logs the state of the connection as it changes.
async fn watch_state(client: Arc<AprsClient>) {
    let mut state = client.state();
    while state.changed().await.is_ok() {
        let current = *state.borrow_and_update();
        match current {
            ConnectionState::Reconnecting => warn!("Connection lost, reconnecting"),
            ConnectionState::Closed => break,
            other => debug!(state = %other, "Connection state"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging first
    init_logging(args.verbose)?;
    if args.trace {
        ogn_client::set_protocol_trace(true);
    }

    info!("Starting ogn-listen {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_args(&args)?;
    info!(
        server = %config.server(),
        user = %config.auth.username,
        "Connecting to APRS server"
    );

    let client = Arc::new(AprsClient::new(config)?);
    let lines = client.receiver();
    let cancel = CancellationToken::new();

    tokio::spawn(watch_state(Arc::clone(&client)));

    let runner = Arc::clone(&client);
    let token = cancel.clone();
    let run = tokio::spawn(async move { runner.run(token).await });

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down");
            ctrl_c.cancel();
        }
    });

    // Ends when run() returns and drops the sender.
    while let Ok(line) = lines.recv_async().await {
        if aprs_protocol::is_server_comment(&line) {
            debug!(comment = %line, "Server comment");
            continue;
        }
        match ogn_message::extract_message_type(&line) {
            Ok(marker) => debug!(marker, "Beacon"),
            Err(e) => debug!(error = %e, "Line without type marker"),
        }
        println!("{}", line);
    }

    match run.await? {
        Ok(()) => {
            info!("Stopped");
            Ok(())
        }
        Err(e) => {
            warn!("Client exited with error: {}", e);
            Err(e.into())
        }
    }
}
