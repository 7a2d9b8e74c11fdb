//! MCP transport

mod server;

pub use server::MacroPlannerService;
