pub mod connect;
pub mod decode;
pub mod source;
