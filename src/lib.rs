//! `ticket_desk` - a role-scoped ticket desk over `SQLite`.
//!
//! Requesters open tickets in one of three categories; category admins see
//! and work the tickets of their category; full admins see everything and
//! manage roles and settings. New tickets notify the category's admins.
//!
//! The library is organised bottom-up:
//! - [`model`] and [`policy`] are pure
//! - [`storage`] is the `SQLite` system of record
//! - [`session`] and [`service`] authorize and perform operations
//! - [`notify`] fans out new-ticket emails
//! - [`cli`] is the `td` command surface

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod notify;
pub mod policy;
pub mod service;
pub mod session;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{DeskError, ErrorCode, ErrorKind, Result, StructuredError};
