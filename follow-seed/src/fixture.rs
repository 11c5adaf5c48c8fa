use anyhow::{Context, Result};
use follow_types::{FollowStatus, FollowUser};

use crate::config::{Settings, DEFAULT_BASE_FOLLOW_TIME};
use crate::db::repositories::FollowRepository;
use crate::db::schema::MAX_BATCH_ROWS;
use crate::db::{Database, DbConnection};

/// Every n-th row is flagged as a special follow
pub const SPECIAL_EVERY: u32 = 20;

/// Derives fixture rows from their index
#[derive(Debug, Clone)]
pub struct FixtureGenerator {
    base_follow_time: i64,
    avatar_prefix: String,
}

impl Default for FixtureGenerator {
    fn default() -> Self {
        Self {
            base_follow_time: DEFAULT_BASE_FOLLOW_TIME,
            avatar_prefix: "/avatars".to_string(),
        }
    }
}

impl FixtureGenerator {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_follow_time: settings.seed.base_follow_time,
            avatar_prefix: settings.avatar_url_prefix().to_string(),
        }
    }

    pub fn row(&self, index: u32) -> FollowUser {
        FollowUser {
            uid: None,
            douyin_id: format!("dy_{}", index),
            nick: format!("用户{}", index),
            avatar: Some(format!("{}/{}.jpg", self.avatar_prefix, index)),
            is_special: index % SPECIAL_EVERY == 0,
            remark: Some(String::new()),
            follow_time: self.base_follow_time + i64::from(index),
            status: FollowStatus::Following,
        }
    }

    /// Rows for indices `1..=count`
    pub fn rows(&self, count: u32) -> impl Iterator<Item = FollowUser> + '_ {
        (1..=count).map(move |index| self.row(index))
    }
}

/// Number of special rows among indices `1..=count`
pub fn expected_special_count(count: u32) -> usize {
    (count / SPECIAL_EVERY) as usize
}

/// A batch that was inserted and committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCommit {
    /// 1-based batch number
    pub batch: usize,
    pub rows: usize,
    /// Rows committed so far, this batch included
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub batches: usize,
}

/// Buffers rows and commits them in fixed-size batches.
///
/// Holds one pooled connection for its whole lifetime. Each full buffer is
/// written with a single multi-row `INSERT` in its own transaction, so a
/// failing batch leaves every earlier batch committed.
pub struct BatchLoader {
    conn: DbConnection,
    batch_size: usize,
    buffer: Vec<FollowUser>,
    summary: LoadSummary,
}

impl BatchLoader {
    pub fn new(db: &Database, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            anyhow::bail!("Batch size must be at least 1");
        }
        if batch_size > MAX_BATCH_ROWS {
            anyhow::bail!(
                "Batch size {} exceeds the {} rows one insert statement can bind",
                batch_size,
                MAX_BATCH_ROWS
            );
        }
        let conn = db.connection()?;
        Ok(Self {
            conn,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            summary: LoadSummary::default(),
        })
    }

    /// Clear the follow table on the loader's connection
    pub fn truncate(&mut self) -> Result<usize> {
        FollowRepository::truncate_with(&self.conn)
    }

    /// Buffer `row`, committing a batch once the buffer is full
    pub fn push(&mut self, row: FollowUser) -> Result<Option<BatchCommit>> {
        self.buffer.push(row);
        if self.buffer.len() >= self.batch_size {
            return self.flush();
        }
        Ok(None)
    }

    /// Rows buffered but not yet committed
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Commit any remaining rows and report the totals
    pub fn finish(mut self) -> Result<(Option<BatchCommit>, LoadSummary)> {
        let last = self.flush()?;
        Ok((last, self.summary))
    }

    fn flush(&mut self) -> Result<Option<BatchCommit>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let batch = self.summary.batches + 1;
        let tx = self
            .conn
            .transaction()
            .with_context(|| format!("Failed to begin transaction for batch {}", batch))?;
        let rows = FollowRepository::insert_rows(&tx, &self.buffer)?;
        tx.commit()
            .with_context(|| format!("Failed to commit batch {}", batch))?;

        self.buffer.clear();
        self.summary.rows += rows;
        self.summary.batches = batch;

        Ok(Some(BatchCommit {
            batch,
            rows,
            total: self.summary.rows,
        }))
    }
}
