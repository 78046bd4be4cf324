pub mod core;
pub mod error;
pub mod records;
pub mod schema;
pub mod table;
pub mod watermark;
