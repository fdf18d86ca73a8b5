/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and the conversion
/// between column text and typed domain values.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

use crate::domain::{
    format_calendar_date, parse_calendar_date, Accessory, Avatar, FrequencyDays, HabitId,
    HabitRecord, ReminderTime, UserId,
};
use crate::storage::{migrations, HabitMutation, HabitStorage, StorageError};

const HABIT_COLUMNS: &str = "id, user_id, name, frequency_days, color, reminder_time, start_date, \
                             streak, longest_streak, last_completed_at, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring the schema up to date
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {}", db_path.display());
        Ok(storage)
    }

    /// Throwaway in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        // Another process toggling the same habit waits instead of failing
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(|e| StorageError::Connection(format!("Failed to set busy timeout: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    fn write_transaction(&self) -> Result<Transaction<'_>, StorageError> {
        Ok(Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?)
    }
}

/// Raw column values of a `habits` row
struct HabitRow {
    id: String,
    user_id: String,
    name: String,
    frequency_days: String,
    color: Option<String>,
    reminder_time: Option<String>,
    start_date: Option<String>,
    streak: u32,
    longest_streak: u32,
    last_completed_at: Option<String>,
    created_at: String,
}

impl HabitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            frequency_days: row.get(3)?,
            color: row.get(4)?,
            reminder_time: row.get(5)?,
            start_date: row.get(6)?,
            streak: row.get(7)?,
            longest_streak: row.get(8)?,
            last_completed_at: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    fn into_record(self, completed_dates: BTreeSet<NaiveDate>) -> Result<HabitRecord, StorageError> {
        let id = HabitId::parse(&self.id).map_err(|e| corrupt("habits", format!("id '{}': {}", self.id, e)))?;
        let user_id = UserId::new(self.user_id).map_err(|e| corrupt("habits", e.to_string()))?;

        let days: Vec<u8> = serde_json::from_str(&self.frequency_days)?;
        let frequency_days = FrequencyDays::new(days).map_err(|e| corrupt("habits", e.to_string()))?;

        let reminder_time = self
            .reminder_time
            .as_deref()
            .map(ReminderTime::parse)
            .transpose()
            .map_err(|e| corrupt("habits", e.to_string()))?;

        let start_date = self
            .start_date
            .as_deref()
            .map(parse_calendar_date)
            .transpose()
            .map_err(|e| corrupt("habits", e.to_string()))?;

        let last_completed_at = self.last_completed_at.as_deref().map(parse_timestamp).transpose()?;
        let created_at = parse_timestamp(&self.created_at)?;

        Ok(HabitRecord {
            id,
            user_id,
            name: self.name,
            frequency_days,
            color: self.color,
            reminder_time,
            completed_dates,
            start_date,
            streak: self.streak,
            longest_streak: self.longest_streak,
            last_completed_at,
            created_at,
        })
    }
}

fn corrupt(table: &'static str, message: String) -> StorageError {
    StorageError::CorruptRecord { table, message }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt("habits", format!("timestamp '{}': {}", s, e)))
}

fn load_completions(conn: &Connection, habit_id: &str) -> Result<BTreeSet<NaiveDate>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT completed_on FROM habit_completions WHERE habit_id = ?1 ORDER BY completed_on",
    )?;

    let rows = stmt.query_map(params![habit_id], |row| row.get::<_, String>(0))?;

    let mut dates = BTreeSet::new();
    for raw in rows {
        let raw = raw?;
        let date = parse_calendar_date(&raw).map_err(|e| corrupt("habit_completions", e.to_string()))?;
        dates.insert(date);
    }

    Ok(dates)
}

fn load_habits(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<HabitRecord>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, HabitRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut habits = Vec::with_capacity(rows.len());
    for row in rows {
        let completions = load_completions(conn, &row.id)?;
        habits.push(row.into_record(completions)?);
    }

    Ok(habits)
}

fn load_habit(conn: &Connection, user_id: &UserId, habit_id: &HabitId) -> Result<HabitRecord, StorageError> {
    let sql = format!("SELECT {} FROM habits WHERE id = ?1 AND user_id = ?2", HABIT_COLUMNS);

    let row = conn
        .query_row(&sql, params![habit_id.to_string(), user_id.as_str()], HabitRow::from_row)
        .optional()?
        .ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })?;

    let completions = load_completions(conn, &row.id)?;
    row.into_record(completions)
}

/// Write the editable columns of a habit row
///
/// Completions and cached streak columns are left as stored.
fn write_fields(conn: &Connection, habit: &HabitRecord) -> Result<(), StorageError> {
    let frequency_json = serde_json::to_string(&habit.frequency_days)?;

    let rows_affected = conn.execute(
        "UPDATE habits SET
            name = ?3,
            frequency_days = ?4,
            color = ?5,
            reminder_time = ?6,
            start_date = ?7
         WHERE id = ?1 AND user_id = ?2",
        params![
            habit.id.to_string(),
            habit.user_id.as_str(),
            habit.name,
            frequency_json,
            habit.color,
            habit.reminder_time.map(|t| t.to_string()),
            habit.start_date.map(format_calendar_date),
        ],
    )?;

    if rows_affected == 0 {
        return Err(StorageError::HabitNotFound {
            habit_id: habit.id.to_string(),
        });
    }

    Ok(())
}

/// Write the whole habit and bring its completions in line with the record
///
/// Only safe on a record loaded inside the same write transaction.
fn write_habit(conn: &Connection, habit: &HabitRecord) -> Result<(), StorageError> {
    write_fields(conn, habit)?;

    conn.execute(
        "UPDATE habits SET streak = ?2, longest_streak = ?3, last_completed_at = ?4 WHERE id = ?1",
        params![
            habit.id.to_string(),
            habit.streak,
            habit.longest_streak,
            habit.last_completed_at.map(|t| t.to_rfc3339()),
        ],
    )?;

    let habit_id = habit.id.to_string();
    let stored = load_completions(conn, &habit_id)?;

    for removed in stored.difference(&habit.completed_dates) {
        conn.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1 AND completed_on = ?2",
            params![habit_id, format_calendar_date(*removed)],
        )?;
    }

    for added in habit.completed_dates.difference(&stored) {
        conn.execute(
            "INSERT OR IGNORE INTO habit_completions (habit_id, completed_on) VALUES (?1, ?2)",
            params![habit_id, format_calendar_date(*added)],
        )?;
    }

    Ok(())
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &HabitRecord) -> Result<(), StorageError> {
        let frequency_json = serde_json::to_string(&habit.frequency_days)?;

        let tx = self.write_transaction()?;
        tx.execute(
            "INSERT INTO habits (
                id, user_id, name, frequency_days, color, reminder_time, start_date,
                streak, longest_streak, last_completed_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                habit.id.to_string(),
                habit.user_id.as_str(),
                habit.name,
                frequency_json,
                habit.color,
                habit.reminder_time.map(|t| t.to_string()),
                habit.start_date.map(format_calendar_date),
                habit.streak,
                habit.longest_streak,
                habit.last_completed_at.map(|t| t.to_rfc3339()),
                habit.created_at.to_rfc3339(),
            ],
        )?;

        for date in &habit.completed_dates {
            tx.execute(
                "INSERT OR IGNORE INTO habit_completions (habit_id, completed_on) VALUES (?1, ?2)",
                params![habit.id.to_string(), format_calendar_date(*date)],
            )?;
        }
        tx.commit()?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn get_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<HabitRecord, StorageError> {
        load_habit(&self.conn, user_id, habit_id)
    }

    fn list_habits(&self, user_id: &UserId) -> Result<Vec<HabitRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
            HABIT_COLUMNS
        );
        load_habits(&self.conn, &sql, &[&user_id.as_str()])
    }

    fn list_habits_with_reminders(&self) -> Result<Vec<HabitRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habits WHERE reminder_time IS NOT NULL ORDER BY reminder_time ASC, id ASC",
            HABIT_COLUMNS
        );
        load_habits(&self.conn, &sql, &[])
    }

    fn update_habit(&self, habit: &HabitRecord) -> Result<(), StorageError> {
        write_fields(&self.conn, habit)?;

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn delete_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<(), StorageError> {
        let tx = self.write_transaction()?;

        let rows_affected = tx.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![habit_id.to_string(), user_id.as_str()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tx.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1",
            params![habit_id.to_string()],
        )?;
        tx.commit()?;

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn modify_habit(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        mutate: HabitMutation<'_>,
    ) -> Result<HabitRecord, StorageError> {
        let tx = self.write_transaction()?;

        let mut habit = load_habit(&tx, user_id, habit_id)?;
        mutate(&mut habit)?;
        write_habit(&tx, &habit)?;

        tx.commit()?;

        tracing::debug!(
            "Modified habit {}: {} completions, streak {}",
            habit.id,
            habit.completed_dates.len(),
            habit.streak
        );
        Ok(habit)
    }

    fn get_avatar(&self, user_id: &UserId) -> Result<Option<Avatar>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT color, shape, accessory FROM avatars WHERE user_id = ?1",
                params![user_id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((color, shape, accessory)) => {
                let accessory: Accessory = accessory
                    .parse()
                    .map_err(|e: crate::domain::DomainError| corrupt("avatars", e.to_string()))?;
                Ok(Some(Avatar {
                    color,
                    shape,
                    accessory,
                }))
            }
        }
    }

    fn save_avatar(&self, user_id: &UserId, avatar: &Avatar) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO avatars (user_id, color, shape, accessory, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                color = excluded.color,
                shape = excluded.shape,
                accessory = excluded.accessory,
                updated_at = excluded.updated_at",
            params![
                user_id.as_str(),
                avatar.color,
                avatar.shape,
                avatar.accessory.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        tracing::debug!("Saved avatar for user {}", user_id);
        Ok(())
    }
}
