pub mod identifiable;
pub mod record;

// Re-exports
pub use identifiable::*;
pub use record::*;
