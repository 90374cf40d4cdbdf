//! Concrete implementations of the trait abstractions in `crate::traits`.
//!
//! - [`ReqwestTransport`] - HTTP transport using reqwest
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::ScriptedTransport`] - scripted chunks, failures and stalls

pub mod mock;
pub mod reqwest_transport;

pub use mock::ScriptedTransport;
pub use reqwest_transport::ReqwestTransport;
