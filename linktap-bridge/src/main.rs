use anyhow::Context;
use linktap_bridge::{Config, LinkTapBridge, MemoryHost, UserCommand, init_logger, runtime};
use linktap_client::HttpClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and configuration
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 2. Logging
    init_logger(config.log_level(), config.log_dir.as_deref())?;

    let client_config = config.client_config();
    tracing::info!(
        api_url = %client_config.api_url(),
        username = %client_config.credentials.username,
        api_key = %client_config.credentials.masked_key(),
        "LinkTap bridge configured"
    );

    // 3. Host device storage
    let mut host = match &config.devices_file {
        Some(path) => MemoryHost::load(path)
            .with_context(|| format!("Failed to load devices from {path}"))?,
        None => MemoryHost::new(),
    };
    tracing::info!(devices = host.len(), "Host devices loaded");

    // 4. Remote client and plugin
    let api = client_config.build_http_client()?;
    let mut bridge: LinkTapBridge<HttpClient> = LinkTapBridge::new(api, &config);

    // 5. User commands from stdin, one "<unit> <level>" per line
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(read_commands(tx));

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
        }
        token.cancel();
    });

    runtime::run(&mut bridge, &mut host, config.heartbeat(), rx, shutdown).await;

    if let Some(path) = &config.devices_file {
        host.save(path)
            .with_context(|| format!("Failed to save devices to {path}"))?;
        tracing::info!(devices = host.len(), path = %path, "Host devices saved");
    }

    Ok(())
}

async fn read_commands(tx: mpsc::Sender<UserCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match UserCommand::parse(&line) {
                Ok(cmd) => {
                    if tx.send(cmd).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("Ignoring input: {e}"),
            },
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read stdin: {e}");
                break;
            }
        }
    }
}
