mod system_api_tests;
mod task_api_tests;
mod test_utils;
mod worker_api_tests;
