pub mod reconciliation;

pub use reconciliation::ReconciliationService;
