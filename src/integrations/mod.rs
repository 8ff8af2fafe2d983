//! Framework integrations.

pub mod gate;
