//! `SQLite` storage implementation.

use crate::error::{DeskError, Result};
use crate::model::{
    AdminSetting, Category, Profile, ProfileRef, Role, Status, Ticket, TicketDetails,
};
use crate::policy::Visibility;
use crate::util::IdGenerator;
use crate::util::time::parse_stored;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

const TICKET_SELECT: &str = r"
    SELECT t.id, t.title, t.description, t.category, t.status, t.requester_id,
           t.assignee_id, t.created_at, t.due_date, t.updated_at,
           r.id, r.full_name, r.email,
           a.id, a.full_name, a.email
    FROM tickets t
    LEFT JOIN profiles r ON r.id = t.requester_id
    LEFT JOIN profiles a ON a.id = t.assignee_id
";

const PROFILE_COLUMNS: &str = "id, email, full_name, role, created_at, updated_at";

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision the store keeps.
fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl SqliteStorage {
    /// Open a connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        super::schema::apply_schema(&conn)?;
        debug!(path = %path.display(), "Opened ticket database");
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Run `f` inside one IMMEDIATE transaction.
    ///
    /// Either every write in `f` lands or none does.
    ///
    /// # Errors
    ///
    /// Returns the error from `f` or from the commit; the transaction is rolled back.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        debug!(op, "Committed");
        Ok(result)
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Insert a ticket, generating its id.
    ///
    /// `ticket.id` is ignored; the stored ticket (with id) is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the requester does not exist or the insert fails.
    pub fn create_ticket(&mut self, ticket: &Ticket) -> Result<Ticket> {
        self.mutate("create_ticket", |tx| {
            if !profile_exists(tx, &ticket.requester_id)? {
                return Err(DeskError::ProfileNotFound {
                    id: ticket.requester_id.clone(),
                });
            }

            let count = count_rows(tx, "tickets")?;
            let id = IdGenerator::tickets().generate(
                &format!("{}|{}", ticket.title, ticket.requester_id),
                ticket.created_at,
                count,
                |candidate| row_exists(tx, "tickets", candidate).unwrap_or(false),
            );

            tx.execute(
                "INSERT INTO tickets (
                    id, title, description, category, status, requester_id,
                    assignee_id, created_at, due_date, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    id,
                    ticket.title,
                    ticket.description,
                    ticket.category.as_str(),
                    ticket.status.as_str(),
                    ticket.requester_id,
                    ticket.assignee_id,
                    format_ts(ticket.created_at),
                    ticket.due_date.map(format_ts),
                    format_ts(ticket.updated_at),
                ],
            )?;

            let details = tx.query_row(
                &format!("{TICKET_SELECT} WHERE t.id = ?"),
                [&id],
                ticket_details_from_row,
            )?;
            Ok(details.ticket)
        })
    }

    /// Get a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket(&self, id: &str) -> Result<Option<Ticket>> {
        Ok(self.get_ticket_details(id)?.map(|details| details.ticket))
    }

    /// Get a ticket joined with its requester and assignee.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket_details(&self, id: &str) -> Result<Option<TicketDetails>> {
        let sql = format!("{TICKET_SELECT} WHERE t.id = ?");
        let details = self
            .conn
            .query_row(&sql, [id], ticket_details_from_row)
            .optional()?;
        Ok(details)
    }

    /// Apply status and/or assignee changes, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `TicketNotFound` if the ticket does not exist, or a database error.
    pub fn update_ticket(&mut self, id: &str, update: &TicketUpdate) -> Result<Ticket> {
        let now = stored_now();
        self.mutate("update_ticket", |tx| {
            if !row_exists(tx, "tickets", id)? {
                return Err(DeskError::TicketNotFound { id: id.to_string() });
            }

            let mut sql = String::from("UPDATE tickets SET updated_at = ?");
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(format_ts(now))];

            if let Some(status) = update.status {
                sql.push_str(", status = ?");
                params.push(Box::new(status.as_str()));
            }
            if let Some(ref assignee) = update.assignee {
                sql.push_str(", assignee_id = ?");
                params.push(Box::new(assignee.clone()));
            }
            sql.push_str(" WHERE id = ?");
            params.push(Box::new(id.to_string()));

            let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
            tx.execute(&sql, params_refs.as_slice())?;

            let details = tx.query_row(
                &format!("{TICKET_SELECT} WHERE t.id = ?"),
                [id],
                ticket_details_from_row,
            )?;
            Ok(details.ticket)
        })
    }

    /// List tickets within `visibility`, then narrowed by `filters`.
    ///
    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets(
        &self,
        visibility: &Visibility,
        filters: &TicketFilters,
    ) -> Result<Vec<TicketDetails>> {
        let mut sql = format!("{TICKET_SELECT} WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        match visibility {
            Visibility::Requester(profile_id) => {
                sql.push_str(" AND t.requester_id = ?");
                params.push(Box::new(profile_id.clone()));
            }
            Visibility::Category(category) => {
                sql.push_str(" AND t.category = ?");
                params.push(Box::new(category.as_str()));
            }
            Visibility::All => {}
        }

        if let Some(ref search) = filters.search {
            let trimmed = search.trim();
            if !trimmed.is_empty() {
                let pattern = format!("%{}%", escape_like(&trimmed.to_lowercase()));
                sql.push_str(
                    " AND (td_lower(t.title) LIKE ? ESCAPE '\\' \
                     OR td_lower(t.description) LIKE ? ESCAPE '\\' \
                     OR td_lower(r.full_name) LIKE ? ESCAPE '\\')",
                );
                for _ in 0..3 {
                    params.push(Box::new(pattern.clone()));
                }
            }
        }

        if let Some(status) = filters.status {
            sql.push_str(" AND t.status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(category) = filters.category {
            sql.push_str(" AND t.category = ?");
            params.push(Box::new(category.as_str()));
        }

        if let Some(ref assignee) = filters.assignee {
            sql.push_str(" AND t.assignee_id = ?");
            params.push(Box::new(assignee.clone()));
        }

        if filters.unassigned {
            sql.push_str(" AND t.assignee_id IS NULL");
        }

        if let Some(from) = filters.created_from {
            sql.push_str(" AND t.created_at >= ?");
            params.push(Box::new(format_ts(from)));
        }

        if let Some(to) = filters.created_to {
            sql.push_str(" AND t.created_at <= ?");
            params.push(Box::new(format_ts(to)));
        }

        sql.push_str(" ORDER BY t.created_at DESC, t.rowid DESC");

        if let Some(limit) = filters.limit {
            if limit > 0 {
                let _ = write!(sql, " LIMIT {limit}");
            }
        }

        debug!(%sql, "Listing tickets");
        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let tickets = stmt
            .query_map(params_refs.as_slice(), ticket_details_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    /// Count all tickets.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_tickets(&self) -> Result<usize> {
        count_rows(&self.conn, "tickets")
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// Return the profile for `email`, creating it if absent.
    ///
    /// A new profile gets `requested` unless no admin exists yet, in which
    /// case it becomes `Admin`. The admin count and the insert share one
    /// transaction, so two concurrent first sign-ins cannot both skip it.
    /// Returns the profile and whether it was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn ensure_profile(
        &mut self,
        email: &str,
        full_name: &str,
        requested: Role,
    ) -> Result<(Profile, bool)> {
        self.insert_profile_once(None, email, full_name, requested)
    }

    /// Like [`SqliteStorage::ensure_profile`], but a created profile takes
    /// `id` instead of a generated one.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `email` already belongs to a profile
    /// with a different id, or a database error.
    pub fn ensure_profile_with_id(
        &mut self,
        id: &str,
        email: &str,
        full_name: &str,
        requested: Role,
    ) -> Result<(Profile, bool)> {
        self.insert_profile_once(Some(id), email, full_name, requested)
    }

    fn insert_profile_once(
        &mut self,
        fixed_id: Option<&str>,
        email: &str,
        full_name: &str,
        requested: Role,
    ) -> Result<(Profile, bool)> {
        let email = email.trim().to_lowercase();
        let full_name = full_name.trim().to_string();
        let now = stored_now();

        self.mutate("ensure_profile", |tx| {
            if let Some(existing) = find_profile_by_email_in(tx, &email)? {
                if fixed_id.is_some_and(|id| id != existing.id) {
                    return Err(DeskError::validation(
                        "email",
                        "is registered to another identity",
                    ));
                }
                return Ok((existing, false));
            }

            let role = if count_role(tx, Role::Admin)? == 0 {
                Role::Admin
            } else {
                requested
            };

            let id = if let Some(id) = fixed_id {
                id.to_string()
            } else {
                let count = count_rows(tx, "profiles")?;
                IdGenerator::profiles().generate(&email, now, count, |candidate| {
                    row_exists(tx, "profiles", candidate).unwrap_or(false)
                })
            };

            tx.execute(
                "INSERT INTO profiles (id, email, full_name, role, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![id, email, full_name, role.as_str(), format_ts(now), format_ts(now)],
            )?;

            if role == Role::Admin && requested != Role::Admin {
                info!(%id, %email, "First profile promoted to admin");
            }

            Ok((
                Profile {
                    id,
                    email: email.clone(),
                    full_name: full_name.clone(),
                    role,
                    created_at: now,
                    updated_at: now,
                },
                true,
            ))
        })
    }

    /// Get a profile by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");
        Ok(self
            .conn
            .query_row(&sql, [id], profile_from_row)
            .optional()?)
    }

    /// Find a profile by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        find_profile_by_email_in(&self.conn, &email.trim().to_lowercase())
    }

    /// All profiles, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at, rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let profiles = stmt
            .query_map([], profile_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    /// Profiles currently holding `role`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn profiles_with_role(&self, role: Role) -> Result<Vec<Profile>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role = ? ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let profiles = stmt
            .query_map([role.as_str()], profile_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    /// Number of full administrators.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_admins(&self) -> Result<usize> {
        count_role(&self.conn, Role::Admin)
    }

    /// Change a profile's role.
    ///
    /// Refuses to demote the last remaining admin.
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound`, `LastAdmin`, or a database error.
    pub fn set_role(&mut self, id: &str, role: Role) -> Result<Profile> {
        let now = stored_now();
        self.mutate("set_role", |tx| {
            let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");
            let Some(current) = tx.query_row(&sql, [id], profile_from_row).optional()? else {
                return Err(DeskError::ProfileNotFound { id: id.to_string() });
            };

            if current.role == role {
                return Ok(current);
            }

            if current.role == Role::Admin && count_role(tx, Role::Admin)? <= 1 {
                return Err(DeskError::LastAdmin { id: id.to_string() });
            }

            tx.execute(
                "UPDATE profiles SET role = ?, updated_at = ? WHERE id = ?",
                rusqlite::params![role.as_str(), format_ts(now), id],
            )?;

            info!(%id, from = %current.role, to = %role, "Role changed");

            Ok(Profile {
                role,
                updated_at: now,
                ..current
            })
        })
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Read a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored value is not JSON.
    pub fn get_setting(&self, key: &str) -> Result<Option<AdminSetting>> {
        let row = self
            .conn
            .query_row(
                "SELECT key, value, updated_at FROM admin_settings WHERE key = ?",
                [key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(key, value, updated_at)| -> Result<AdminSetting> {
            Ok(AdminSetting {
                key,
                value: serde_json::from_str(&value)?,
                updated_at: parse_stored(&updated_at).unwrap_or_else(Utc::now),
            })
        })
        .transpose()
    }

    /// Insert or replace a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_setting(&mut self, key: &str, value: &serde_json::Value) -> Result<AdminSetting> {
        let now = stored_now();
        let encoded = serde_json::to_string(value)?;
        self.mutate("set_setting", |tx| {
            tx.execute(
                "INSERT INTO admin_settings (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                rusqlite::params![key, encoded, format_ts(now)],
            )?;
            Ok(AdminSetting {
                key: key.to_string(),
                value: value.clone(),
                updated_at: now,
            })
        })
    }
}

/// Filter options for listing tickets.
///
/// Applied after the visibility restriction, never instead of it.
#[derive(Debug, Clone, Default)]
pub struct TicketFilters {
    /// Case-insensitive match on title, description, or requester name.
    pub search: Option<String>,
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub assignee: Option<String>,
    pub unassigned: bool,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// Fields that can change after creation.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub status: Option<Status>,
    /// `Some(None)` clears the assignee.
    pub assignee: Option<Option<String>>,
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Table names here are compile-time constants, never user input.
fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn row_exists(conn: &Connection, table: &str, id: &str) -> Result<bool> {
    let exists = conn
        .prepare(&format!("SELECT 1 FROM {table} WHERE id = ?"))?
        .exists([id])?;
    Ok(exists)
}

fn profile_exists(conn: &Connection, id: &str) -> Result<bool> {
    row_exists(conn, "profiles", id)
}

fn count_role(conn: &Connection, role: Role) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM profiles WHERE role = ?",
        [role.as_str()],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn find_profile_by_email_in(conn: &Connection, email: &str) -> Result<Option<Profile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?");
    Ok(conn.query_row(&sql, [email], profile_from_row).optional()?)
}

fn parse_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = DeskError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_stored(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp '{raw}'").into(),
        )
    })
}

fn profile_from_row(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        role: Role::parse_lenient(&row.get::<_, String>(3)?),
        created_at: timestamp_column(row, 4)?,
        updated_at: timestamp_column(row, 5)?,
    })
}

fn profile_ref_at(row: &rusqlite::Row, start: usize) -> rusqlite::Result<Option<ProfileRef>> {
    let Some(id) = row.get::<_, Option<String>>(start)? else {
        return Ok(None);
    };
    Ok(Some(ProfileRef {
        id,
        full_name: row.get(start + 1)?,
        email: row.get(start + 2)?,
    }))
}

fn ticket_details_from_row(row: &rusqlite::Row) -> rusqlite::Result<TicketDetails> {
    let ticket = Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.filter(|d| !d.is_empty()),
        category: parse_column(row, 3)?,
        status: parse_column(row, 4)?,
        requester_id: row.get(5)?,
        assignee_id: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
        due_date: row
            .get::<_, Option<String>>(8)?
            .as_deref()
            .and_then(parse_stored),
        updated_at: timestamp_column(row, 9)?,
    };
    Ok(TicketDetails {
        ticket,
        requester: profile_ref_at(row, 10)?,
        assignee: profile_ref_at(row, 13)?,
    })
}
