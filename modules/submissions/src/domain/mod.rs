pub mod error;
pub mod ports;
pub mod schema;
pub mod service;
