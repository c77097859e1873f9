pub mod types;
pub use types::{ExecutionRepository, InMemoryExecutionRepository};
