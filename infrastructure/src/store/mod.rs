//! State storage adapters

mod memory;

pub use memory::InMemoryStateStore;
