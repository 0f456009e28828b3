pub mod allocate_uid;
pub mod create;
pub mod delete;
pub mod find_by_id;
pub mod find_by_mobile;
pub mod find_by_uid;
pub mod find_duplicates;
pub mod repo_impl;
pub mod scan_identity_values;
pub mod update;

pub use repo_impl::RecordRepositoryImpl;
