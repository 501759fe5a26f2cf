pub mod http;
pub mod memory_store;
pub mod persistence;
pub mod sample;
