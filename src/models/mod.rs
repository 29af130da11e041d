pub mod common;
pub mod form;
pub mod submission;

#[cfg(test)]
#[path = "serde_test.rs"]
mod serde_tests;
