pub mod file_service;
pub mod ollama_service;
pub mod organize_service;
pub mod plan_parser;
pub mod snapshot_service;
pub mod undo_service;
