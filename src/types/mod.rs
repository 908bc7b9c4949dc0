//! Request and response payloads of the HTTP API.

pub mod billing;
pub mod mail;
pub mod orders;
