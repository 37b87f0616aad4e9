pub mod errors;
pub mod models;
pub mod ports;
pub mod responder;
pub mod service;
