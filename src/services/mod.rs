pub mod exporter;
pub mod form_store;
pub mod pdf;
pub mod registry;
pub mod renderer;
pub mod reorder;
pub mod storage;
pub mod submission_store;

#[cfg(test)]
#[path = "reorder_test.rs"]
mod reorder_tests;

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_tests;

#[cfg(test)]
#[path = "form_store_test.rs"]
mod form_store_tests;

#[cfg(test)]
#[path = "submission_store_test.rs"]
mod submission_store_tests;

#[cfg(test)]
#[path = "renderer_test.rs"]
mod renderer_tests;

#[cfg(test)]
#[path = "exporter_test.rs"]
mod exporter_tests;
