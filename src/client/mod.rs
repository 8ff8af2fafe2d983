//! Sending side: signs outgoing requests.

pub mod http;
