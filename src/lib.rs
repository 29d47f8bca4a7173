//! Line-oriented TCP Chat Relay Library
//!
//! Clients connect over TCP, send a display name as their first line, and
//! every following line is rebroadcast to all other connected clients as
//! `[User<N>]: <text>`.
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the `Registry`
//! - `Acceptor` assigns identities and spawns one `handler` task per connection
//! - Each connection has a writer task draining its outbound queue
//! - No locks needed - all registry access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use chat_relay::serve;
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:12345").await.unwrap();
//!     serve(listener, 64 * 1024).await.unwrap();
//! }
//! ```

pub mod acceptor;
pub mod broadcast;
pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use acceptor::{serve, Acceptor};
pub use broadcast::{broadcast, Delivery};
pub use client::Client;
pub use codec::LineCodec;
pub use config::ServerConfig;
pub use connection::Connection;
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use message::{format_line, Notice, Origin};
pub use registry::Registry;
pub use server::{ChatServer, ServerCommand, ServerHandle};
pub use types::{Identity, IdentityCounter};
