//! LexiTalk Library
//!
//! Core modules for the LexiTalk dyslexia practice client.

pub mod audio;
pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod frontend;
pub mod render;
pub mod runtime;
pub mod session;
pub mod timer;
