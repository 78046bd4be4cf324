pub mod blob;
pub mod error;
pub mod source;
pub mod sql;
pub mod warehouse;
