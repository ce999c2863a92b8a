//! Desk operations. Every mutation is authorized against a [`Session`].
//!
//! [`Session`]: crate::session::Session

pub mod profiles;
pub mod settings;
pub mod tickets;
