// One module per subcommand. main.rs dispatches to these handlers.

pub mod generators;
pub mod mcp;
pub mod render;

pub use mcp::configure_tracing;
