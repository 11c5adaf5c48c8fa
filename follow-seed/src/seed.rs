//! One-shot seed run: render every avatar, then replace the follow table.
//!
//! ```text
//! Start -> RenderAvatars -> Truncate -> InsertBatch(1..n) -> Done
//!   any failure -> Aborted
//! ```
//! Nothing is compensated on abort: avatars already written stay on disk and
//! batches already committed stay in the table.

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;

use crate::avatar::{AvatarRenderer, Typeface};
use crate::config::Settings;
use crate::db::Database;
use crate::fixture::{BatchLoader, FixtureGenerator};

/// Log avatar progress every this many images
const PROGRESS_EVERY: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPhase {
    Start,
    RenderAvatars,
    Truncate,
    /// Batch number currently being committed
    InsertBatch(usize),
    Done,
    Aborted,
}

impl SeedPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SeedPhase::Done | SeedPhase::Aborted)
    }
}

impl fmt::Display for SeedPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedPhase::Start => f.write_str("start"),
            SeedPhase::RenderAvatars => f.write_str("render-avatars"),
            SeedPhase::Truncate => f.write_str("truncate"),
            SeedPhase::InsertBatch(n) => write!(f, "insert-batch-{}", n),
            SeedPhase::Done => f.write_str("done"),
            SeedPhase::Aborted => f.write_str("aborted"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SeedOptions {
    /// Render and generate everything in memory; write no files, touch no table
    pub dry_run: bool,
}

/// Outcome of a seed run
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub avatar_dir: PathBuf,
    pub typeface: String,
    pub avatars_rendered: u32,
    pub avatars_written: u32,
    pub rows_removed: usize,
    pub rows_generated: u32,
    pub rows_inserted: usize,
    pub batches_committed: usize,
    pub special_rows: usize,
    pub dry_run: bool,
    pub phase: SeedPhase,
}

impl SeedReport {
    fn new(settings: &Settings, renderer: &AvatarRenderer, dry_run: bool) -> Self {
        Self {
            avatar_dir: settings.avatars.dir.clone(),
            typeface: renderer.typeface().describe(),
            avatars_rendered: 0,
            avatars_written: 0,
            rows_removed: 0,
            rows_generated: 0,
            rows_inserted: 0,
            batches_committed: 0,
            special_rows: 0,
            dry_run,
            phase: SeedPhase::Start,
        }
    }
}

pub struct SeedRun<'a> {
    settings: &'a Settings,
    options: SeedOptions,
    phase: SeedPhase,
}

impl<'a> SeedRun<'a> {
    pub fn new(settings: &'a Settings, options: SeedOptions) -> Self {
        Self {
            settings,
            options,
            phase: SeedPhase::Start,
        }
    }

    pub fn phase(&self) -> SeedPhase {
        self.phase
    }

    fn enter(&mut self, next: SeedPhase) {
        tracing::debug!("Seed phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Run every stage. `db` may be `None` only for dry runs.
    pub fn execute(&mut self, renderer: &AvatarRenderer, db: Option<&Database>) -> Result<SeedReport> {
        if self.phase.is_terminal() {
            anyhow::bail!("Seed run already finished ({})", self.phase);
        }
        let mut report = SeedReport::new(self.settings, renderer, self.options.dry_run);

        match self.run_stages(renderer, db, &mut report) {
            Ok(()) => {
                self.enter(SeedPhase::Done);
                report.phase = self.phase;
                Ok(report)
            }
            Err(e) => {
                let failed_in = self.phase;
                self.enter(SeedPhase::Aborted);
                tracing::error!("Seed run aborted during {}: {:#}", failed_in, e);
                Err(e.context(format!("Seed run aborted during {}", failed_in)))
            }
        }
    }

    fn run_stages(
        &mut self,
        renderer: &AvatarRenderer,
        db: Option<&Database>,
        report: &mut SeedReport,
    ) -> Result<()> {
        self.render_avatars(renderer, report)?;

        let generator = FixtureGenerator::from_settings(self.settings);
        let count = self.settings.seed.count;

        if self.options.dry_run {
            report.rows_generated = count;
            report.special_rows = generator.rows(count).filter(|row| row.is_special).count();
            tracing::info!(
                "Dry run: would replace the follow table with {} rows in batches of {}",
                count,
                self.settings.seed.batch_size
            );
            return Ok(());
        }

        let db = db.context("A database is required unless running dry")?;
        let mut loader = BatchLoader::new(db, self.settings.seed.batch_size)?;

        self.enter(SeedPhase::Truncate);
        report.rows_removed = loader.truncate()?;
        tracing::info!("Cleared follow table ({} rows removed)", report.rows_removed);

        self.enter(SeedPhase::InsertBatch(1));
        for row in generator.rows(count) {
            report.rows_generated += 1;
            if row.is_special {
                report.special_rows += 1;
            }
            if let Some(commit) = loader.push(row)? {
                tracing::info!("Committed batch {}: {}/{} rows", commit.batch, commit.total, count);
                self.enter(SeedPhase::InsertBatch(commit.batch + 1));
            }
        }

        let (last, summary) = loader.finish()?;
        if let Some(commit) = last {
            tracing::info!("Committed final batch {}: {}/{} rows", commit.batch, commit.total, count);
        }
        report.rows_inserted = summary.rows;
        report.batches_committed = summary.batches;
        Ok(())
    }

    fn render_avatars(&mut self, renderer: &AvatarRenderer, report: &mut SeedReport) -> Result<()> {
        self.enter(SeedPhase::RenderAvatars);
        let count = self.settings.seed.count;
        let dir = &self.settings.avatars.dir;

        tracing::info!("Rendering {} avatars into {}", count, dir.display());
        for index in 1..=count {
            if self.options.dry_run {
                renderer.render_jpeg(index)?;
            } else {
                renderer.write_avatar(dir, index)?;
                report.avatars_written += 1;
            }
            report.avatars_rendered += 1;

            if index % PROGRESS_EVERY == 0 {
                tracing::info!("Rendered {}/{} avatars", index, count);
            }
        }
        Ok(())
    }
}

/// Resolve the typeface, open the database and run the seeder
pub fn run_seed(settings: &Settings, options: SeedOptions) -> Result<SeedReport> {
    let candidates = Typeface::candidates(settings.avatars.font_path.as_deref());
    let renderer = AvatarRenderer::new(Typeface::resolve(&candidates));

    let db = if options.dry_run {
        None
    } else {
        tracing::info!("Connecting to database: {}", settings.database.path);
        let db = Database::new(&settings.database.path)
            .context("Failed to open database connection")?;
        db.initialize()?;
        Some(db)
    };

    SeedRun::new(settings, options).execute(&renderer, db.as_ref())
}
