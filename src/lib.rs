pub mod config;
pub mod dom;
pub mod engine;
pub mod popup;
pub mod session;
pub mod thread;
