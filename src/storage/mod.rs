//! `SQLite` system of record: profiles, tickets, admin settings.

pub mod schema;
mod sqlite;

pub use sqlite::{SqliteStorage, TicketFilters, TicketUpdate};
