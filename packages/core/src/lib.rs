// Library root: exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod app;
pub mod cache;
pub mod credentials;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod services;

// Only needed by the binary, declared pub so integration tests can build
// a config without touching the process environment.
pub mod cli;
pub mod config;
pub mod logging;
