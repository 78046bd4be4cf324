pub mod checkpoint;
pub mod error;
pub mod finalize;
pub mod metrics;
pub mod pipeline;
pub mod provision;
pub mod retry;
pub mod schema;
pub mod settings;
pub mod sink;
pub mod supervisor;
