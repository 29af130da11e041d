pub mod api;

#[cfg(test)]
#[path = "api_test.rs"]
mod api_tests;
