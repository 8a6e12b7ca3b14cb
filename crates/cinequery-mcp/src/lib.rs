//! Cinequery MCP Server
//!
//! Model Context Protocol server exposing the movie catalog to AI assistants.

pub mod protocol;
mod resources;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
