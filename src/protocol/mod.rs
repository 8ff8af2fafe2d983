//! Wire-level pieces of a signed HTTP request: header names, URL
//! reconstruction and bounded body handling.

pub mod body;
pub mod headers;
pub mod url;
