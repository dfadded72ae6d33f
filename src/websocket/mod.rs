//! WebSocket transport: accepts connections, frames the event protocol,
//! and drives the chat core's router.

mod connection;
mod server;

pub use connection::Connection;
pub use server::ChatServer;
