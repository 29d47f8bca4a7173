//! Server configuration
//!
//! Command line options parsed with clap. The listening address is the only
//! externally visible setting.

use clap::Parser;

use crate::codec::DEFAULT_MAX_LINE_LENGTH;

/// Default listening port
pub const DEFAULT_PORT: u16 = 12345;

/// Channel buffer size for server commands
pub const COMMAND_BUFFER_SIZE: usize = 256;


#[derive(Parser, Debug, Clone)]
#[command(name = "chat_relay")]
#[command(about = "Line-oriented TCP chat relay", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Longest accepted line in bytes; longer lines close the connection
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
