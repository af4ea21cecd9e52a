use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser)]
#[command(name = "egov")]
#[command(about = "Citizen services chat assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config.json.
    Init {
        /// Config file path (default: EGOV_CONFIG_PATH or ~/.egov/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the chat gateway (landing page + WebSocket). Reads the LLM key from GROQ_API_KEY.
    Serve {
        /// Config file path (default: EGOV_CONFIG_PATH or ~/.egov/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP and WebSocket port (default from config or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Chat with the assistant through a running gateway (interactive).
    Chat {
        /// Config file path (default: EGOV_CONFIG_PATH or ~/.egov/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// List models available from the configured LLM provider.
    Models {
        /// Config file path (default: EGOV_CONFIG_PATH or ~/.egov/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("egov {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Models { config }) => {
            if let Err(e) = run_models(config).await {
                log::error!("models failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(egov::config::default_config_path);
    let dir = egov::config::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _) = egov::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    egov::gateway::run_gateway(config).await
}

async fn run_models(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, _) = egov::config::load_config(config_path)?;
    let client = egov::llm::GroqClient::new(
        Some(config.llm.base_url.clone()),
        egov::config::resolve_api_key(&config),
    );
    for model in client.list_models().await? {
        let marker = if model.name == config.llm.model { "*" } else { " " };
        println!("{} {}", marker, model.name);
    }
    Ok(())
}

/// Interactive loop over one WebSocket connection, so the conversation keeps its history.
async fn run_chat(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = egov::config::load_config(config_path)?;
    let ws_url = format!("ws://{}:{}/ws", config.gateway.bind.trim(), config.gateway.port);
    let (mut ws, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .map_err(|e| anyhow::anyhow!("connecting to {}: {}", ws_url, e))?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        let frame = serde_json::json!({ "event": "send_message", "data": { "message": input } });
        ws.send(Message::Text(frame.to_string())).await?;

        match next_reply(&mut ws).await {
            Ok(Some(reply)) => println!("< {}", reply.trim()),
            Ok(None) => {
                eprintln!("gateway closed the connection");
                break;
            }
            Err(e) => eprintln!("chat error: {}", e),
        }
    }

    let _ = ws.close(None).await;
    Ok(())
}

/// Wait for the next `receive_message` frame. None when the gateway shuts down or closes.
async fn next_reply<S>(ws: &mut S) -> Result<Option<String>, String>
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(msg) = ws.next().await {
        let msg = msg.map_err(|e| e.to_string())?;
        let Message::Text(text) = msg else { continue };
        let frame: serde_json::Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
        match frame.get("event").and_then(|v| v.as_str()) {
            Some("receive_message") => {
                let message = frame
                    .get("data")
                    .and_then(|d| d.get("message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("")
                    .to_string();
                return Ok(Some(message));
            }
            Some("shutdown") => return Ok(None),
            _ => continue,
        }
    }
    Ok(None)
}
