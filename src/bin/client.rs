//! Terminal chat client.
//!
//! Sends the display name as the first line, then forwards stdin lines to
//! the relay and prints every line it receives.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chat_relay_client -- --name alice
//! cargo run --bin chat_relay_client -- --host 10.0.0.2 --port 12345
//! ```

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing_subscriber::EnvFilter;

use chat_relay::config::DEFAULT_PORT;
use chat_relay::message::display_name;
use chat_relay::LineCodec;

#[derive(Parser, Debug)]
#[command(name = "chat_relay_client")]
#[command(about = "Terminal client for the chat relay", long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Server port to connect to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Display name announced to the server
    #[arg(short = 'n', long, default_value = "")]
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let stream = match TcpStream::connect((args.host.as_str(), args.port)).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::debug!("connect failed: {}", e);
            println!("[Client]: Error connecting to server.");
            std::process::exit(1);
        }
    };

    let (read_half, write_half) = stream.into_split();
    let mut incoming = FramedRead::new(read_half, LineCodec::new());
    let mut outgoing = FramedWrite::new(write_half, LineCodec::new());

    let name = display_name(&args.name);
    if outgoing.send(name.clone()).await.is_err() {
        println!("[Client]: Error connecting to server.");
        std::process::exit(1);
    }
    println!("[Client]: Connected as {}", name);

    // Receive task: server lines -> stdout
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(line)) = incoming.next().await {
            println!("{}", line);
        }
        println!("[Client]: Disconnected from server.");
    });

    // Send task: stdin lines -> server
    let mut send_task = tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = stdin.next_line().await {
            let message = line.trim();
            if message.is_empty() {
                continue;
            }
            if outgoing.send(message.to_string()).await.is_err() {
                break;
            }
        }
        let _ = outgoing.close().await;
    });

    tokio::select! {
        _ = &mut receive_task => send_task.abort(),
        _ = &mut send_task => {
            // Stdin closed; keep printing until the server closes too
            let _ = receive_task.await;
        }
    }
}
