//! Command implementations for the coref-scorer CLI
//!
//! Each command has its own module/file.

pub mod align;
pub mod config;
pub mod score;

// Re-export argument types for parser
pub use align::AlignArgs;
pub use config::ConfigArgs;
pub use score::ScoreArgs;
