//! Phish.net API access
//!
//! - [`http`] - Thin reqwest wrapper with log sanitising
//! - [`envelope`] - Decoding of the uniform response envelope
//! - [`client`] - The typed client built on both

pub mod client;
pub mod envelope;
pub mod http;

pub use client::PhishNetClient;
pub use http::format_api_error;
