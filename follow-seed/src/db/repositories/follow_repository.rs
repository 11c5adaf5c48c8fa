use anyhow::{Context, Result};
use follow_types::{FollowStatus, FollowUser};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

use crate::db::schema::{FOLLOW_COLUMNS, FOLLOW_TABLE};
use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Remove every row and reset the uid counter
    pub fn truncate(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        Self::truncate_with(&conn)
    }

    /// Truncate on an already checked-out connection.
    ///
    /// SQLite has no `TRUNCATE TABLE`; deleting all rows and dropping the
    /// table's `sqlite_sequence` entry gives the same observable result,
    /// including uids restarting at 1.
    pub fn truncate_with(conn: &Connection) -> Result<usize> {
        let removed = conn
            .execute(&format!("DELETE FROM {}", FOLLOW_TABLE), [])
            .context("Failed to clear follow table")?;
        conn.execute("DELETE FROM sqlite_sequence WHERE name = ?", [FOLLOW_TABLE])
            .context("Failed to reset follow uid sequence")?;
        Ok(removed)
    }

    /// Insert all `rows` with one multi-row statement.
    ///
    /// The caller owns the transaction; nothing is committed here.
    pub fn insert_rows(conn: &Connection, rows: &[FollowUser]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let sql = insert_sql(rows.len());
        let values = rows.iter().flat_map(row_values);

        let inserted = conn
            .execute(&sql, params_from_iter(values))
            .with_context(|| format!("Failed to insert batch of {} follow rows", rows.len()))?;
        Ok(inserted)
    }

    /// Total rows in the follow table
    pub fn count(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", FOLLOW_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Rows flagged as special follows
    pub fn count_special(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE is_special = 1", FOLLOW_TABLE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn get_by_douyin_id(&self, douyin_id: &str) -> Result<Option<FollowUser>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT uid, douyin_id, nick, avatar, is_special, remark, follow_time, status
                 FROM follow WHERE douyin_id = ?",
                [douyin_id],
                |row| {
                    let status: i32 = row.get(7)?;
                    Ok(FollowUser {
                        uid: Some(row.get(0)?),
                        douyin_id: row.get(1)?,
                        nick: row.get(2)?,
                        avatar: row.get(3)?,
                        is_special: row.get::<_, i64>(4)? != 0,
                        remark: row.get(5)?,
                        follow_time: row.get(6)?,
                        status: FollowStatus::from_i32(status).unwrap_or_default(),
                    })
                },
            )
            .optional()
            .with_context(|| format!("Failed to load follow row {}", douyin_id))?;
        Ok(user)
    }

    /// `(douyin_id, avatar)` for every row, in insertion order
    pub fn list_avatars(&self) -> Result<Vec<(String, Option<String>)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT douyin_id, avatar FROM follow ORDER BY uid")?;

        let avatars = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(avatars)
    }
}

fn insert_sql(row_count: usize) -> String {
    let placeholders = format!("({})", vec!["?"; FOLLOW_COLUMNS.len()].join(", "));
    let tuples = vec![placeholders; row_count].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        FOLLOW_TABLE,
        FOLLOW_COLUMNS.join(", "),
        tuples
    )
}

// Must follow FOLLOW_COLUMNS order
fn row_values(user: &FollowUser) -> [Value; 7] {
    [
        Value::Text(user.douyin_id.clone()),
        Value::Text(user.nick.clone()),
        user.avatar.clone().map_or(Value::Null, Value::Text),
        Value::Integer(i64::from(user.is_special)),
        user.remark.clone().map_or(Value::Null, Value::Text),
        Value::Integer(user.follow_time),
        Value::Integer(i64::from(user.status.as_i32())),
    ]
}
