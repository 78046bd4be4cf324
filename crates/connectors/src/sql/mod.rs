pub mod batcher;
pub mod mysql;
pub mod postgres;
