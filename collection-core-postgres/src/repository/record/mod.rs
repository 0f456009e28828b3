pub mod change_log_repository;
pub mod record_repository;
pub mod staging_repository;

#[cfg(test)]
pub mod test_utils;

pub use change_log_repository::ChangeLogRepositoryImpl;
pub use record_repository::RecordRepositoryImpl;
pub use staging_repository::StagingRepositoryImpl;
