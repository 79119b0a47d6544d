pub mod engine;
pub mod transaction;
