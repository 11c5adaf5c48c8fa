/// SQL schema for the follow fixture table
/// Column widths mirror the backend entity so seeded rows stay loadable there
pub const SCHEMA: &str = r#"
-- Followed accounts
CREATE TABLE IF NOT EXISTS follow (
    uid INTEGER PRIMARY KEY AUTOINCREMENT,
    douyin_id TEXT NOT NULL UNIQUE CHECK(length(douyin_id) <= 50),
    nick TEXT NOT NULL CHECK(length(nick) <= 100),
    avatar TEXT CHECK(avatar IS NULL OR length(avatar) <= 200),
    is_special INTEGER NOT NULL DEFAULT 0,
    remark TEXT CHECK(remark IS NULL OR length(remark) <= 255),
    follow_time INTEGER NOT NULL,
    status INTEGER NOT NULL DEFAULT 1
);

-- Following lists are read newest first
CREATE INDEX IF NOT EXISTS idx_follow_follow_time ON follow(follow_time DESC);
"#;

/// Table every seed run clears and repopulates
pub const FOLLOW_TABLE: &str = "follow";

/// Insert column order, shared by the batch statement and its parameters
pub const FOLLOW_COLUMNS: [&str; 7] = [
    "douyin_id",
    "nick",
    "avatar",
    "is_special",
    "remark",
    "follow_time",
    "status",
];

/// SQLite's default cap on bound parameters per statement
pub const MAX_BIND_PARAMETERS: usize = 32766;

/// Largest batch a single multi-row insert can carry
pub const MAX_BATCH_ROWS: usize = MAX_BIND_PARAMETERS / FOLLOW_COLUMNS.len();
