pub mod task;
pub mod worker;

pub use task::validate_test_name;
pub use worker::{validate_identifier, validate_worker_address, validate_worker_id};
