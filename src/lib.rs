//! Pronote Cache Library
//!
//! A file-backed TTL cache for school portal data, with the key builders,
//! configuration and CLI used by the `pronote-cache` binary.

pub mod cache;
pub mod cli;
pub mod config;
pub mod keys;
