pub mod actor;
pub mod changelog;
pub mod duplicate;
pub mod identifier;
pub mod resolution;
pub mod validation;

// Re-exports
pub use actor::*;
pub use changelog::*;
pub use duplicate::*;
pub use identifier::*;
pub use resolution::*;
pub use validation::*;
