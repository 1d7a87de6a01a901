//! Core library for the `bulksend` CLI.
//!
//! `bulksend` walks an ordered bundle of JSON payloads and sends each one to
//! a single HTTP endpoint under a controlled rate. The [`dispatch`] module
//! holds the engine and its three strategies (sync, async and protected);
//! [`http`] provides the retrying `reqwest` transport behind it. The
//! remaining modules carry the CLI surface: argument types, configuration
//! files, bundle loading, and the end-of-run summary.
pub mod args;
pub mod bundle;
pub mod config;
pub mod dispatch;
pub mod entry;
pub mod error;
mod export;
pub mod http;
mod logger;
mod shutdown_handlers;
pub mod summary;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
