pub mod file_entry;
pub mod plan;
pub mod report;
pub mod undo_batch;
