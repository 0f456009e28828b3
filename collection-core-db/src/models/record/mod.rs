pub mod change_log;
pub mod common_enums;
pub mod customer_record;
pub mod draft;
pub mod staged_upload;

// Re-exports
pub use change_log::*;
pub use common_enums::*;
pub use customer_record::*;
pub use draft::*;
pub use staged_upload::*;
