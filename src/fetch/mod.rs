pub mod loader;
pub mod source;

// Re-exports for convenience
pub use loader::QuakeLoader;
pub use source::{QuakeSource, UsgsSource};
