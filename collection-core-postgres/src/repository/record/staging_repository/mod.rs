pub mod repo_impl;
pub mod staging;

pub use repo_impl::StagingRepositoryImpl;
