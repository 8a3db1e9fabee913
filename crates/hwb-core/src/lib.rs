//! Core domain + application logic for the homework status bot.
//!
//! This crate is framework-agnostic. The review API (HTTP) and Telegram live
//! behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod poller;
pub mod ports;
pub mod translator;
pub mod validator;

pub use errors::{Error, Result};
