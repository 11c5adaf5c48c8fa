use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::avatar::avatar_file_name;
use crate::config::Settings;
use crate::db::repositories::FollowRepository;
use crate::db::Database;
use crate::fixture::expected_special_count;

/// What a seeded database and avatar directory were found to contain
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub expected_rows: usize,
    pub row_count: usize,
    pub special_count: usize,
    pub avatar_files: usize,
    pub problems: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    fn record(&mut self, problem: String) {
        self.problems.push(problem);
    }
}

/// Check the follow table and avatar directory against a completed run
pub fn verify_seed(db: &Database, settings: &Settings) -> Result<VerifyReport> {
    let count = settings.seed.count;
    let mut report = VerifyReport {
        expected_rows: count as usize,
        ..Default::default()
    };

    if !db.has_table("follow")? {
        report.record("follow table not found".to_string());
        return Ok(report);
    }

    let repo = FollowRepository::new(db.pool.clone());
    report.row_count = repo.count()?;
    report.special_count = repo.count_special()?;

    if report.row_count != report.expected_rows {
        report.record(format!(
            "expected {} rows, found {}",
            report.expected_rows, report.row_count
        ));
    }

    let expected_special = expected_special_count(count);
    if report.special_count != expected_special {
        report.record(format!(
            "expected {} special rows, found {}",
            expected_special, report.special_count
        ));
    }

    let files = avatar_files(&settings.avatars.dir)?;
    report.avatar_files = files.len();
    let expected_files: BTreeSet<String> = (1..=count).map(avatar_file_name).collect();
    if files != expected_files {
        let missing = expected_files.difference(&files).count();
        let extra = files.difference(&expected_files).count();
        report.record(format!(
            "avatar directory has {} missing and {} unexpected files",
            missing, extra
        ));
    }

    let prefix = format!("{}/", settings.avatar_url_prefix());
    for (douyin_id, avatar) in repo.list_avatars()? {
        let Some(avatar) = avatar else {
            report.record(format!("{} has no avatar", douyin_id));
            continue;
        };
        match avatar.strip_prefix(&prefix) {
            Some(file_name) if files.contains(file_name) => {}
            Some(file_name) => {
                report.record(format!("{} points at missing file {}", douyin_id, file_name))
            }
            None => report.record(format!(
                "{} avatar {} is outside {}",
                douyin_id, avatar, prefix
            )),
        }
    }

    Ok(report)
}

/// `*.jpg` file names in `dir`; an absent directory counts as empty
fn avatar_files(dir: &Path) -> Result<BTreeSet<String>> {
    if !dir.is_dir() {
        return Ok(BTreeSet::new());
    }

    let mut names = BTreeSet::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".jpg") {
            names.insert(name);
        }
    }
    Ok(names)
}
