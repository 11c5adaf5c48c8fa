use anyhow::{Context, Result};
use clap::Parser;
use follow_seed::config::Settings;
use follow_seed::logging;
use follow_seed::seed::{run_seed, SeedOptions, SeedReport};
use std::path::PathBuf;

/// Follow Fixture Seeder
///
/// Renders one placeholder avatar per fixture account and replaces the
/// contents of the follow table with freshly generated rows.
#[derive(Parser, Debug)]
#[command(name = "follow-seed")]
#[command(about = "Generate placeholder avatars and seed the follow table", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH")]
    database: Option<String>,

    /// Directory the avatar images are written to
    #[arg(short, long, env = "AVATAR_DIR")]
    avatar_dir: Option<PathBuf>,

    /// Font used for the avatar numerals
    #[arg(short, long, env = "AVATAR_FONT")]
    font: Option<PathBuf>,

    /// Number of accounts to generate
    #[arg(short, long)]
    count: Option<u32>,

    /// Rows per committed insert batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Perform a dry run without making changes
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply command line overrides on top of the loaded settings
    fn apply(&self, mut settings: Settings) -> Result<Settings> {
        if let Some(database) = &self.database {
            settings.database.path = database.clone();
        }
        if let Some(dir) = &self.avatar_dir {
            settings.avatars.dir = dir.clone();
        }
        if let Some(font) = &self.font {
            settings.avatars.font_path = Some(font.clone());
        }
        if let Some(count) = self.count {
            settings.seed.count = count;
        }
        if let Some(batch_size) = self.batch_size {
            settings.seed.batch_size = batch_size;
        }
        settings.validate().context("Invalid seed settings")?;
        Ok(settings)
    }
}

/// Ask before the follow table is cleared
fn confirm(settings: &Settings) -> Result<bool> {
    println!(
        "This will delete every row in the follow table of {} and insert {} new rows.",
        settings.database.path, settings.seed.count
    );
    println!("Do you want to continue? (y/N): ");

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read user input")?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Display run statistics in a formatted way
fn display_report(report: &SeedReport) {
    println!();
    println!("Seed Summary");
    println!("============");
    println!();
    println!("Typeface: {}", report.typeface);
    println!("Avatars rendered: {}", report.avatars_rendered);
    println!("Avatars written: {}", report.avatars_written);
    println!("Rows removed: {}", report.rows_removed);
    println!("Rows generated: {}", report.rows_generated);
    println!("Rows inserted: {}", report.rows_inserted);
    println!("Batches committed: {}", report.batches_committed);
    println!("Special follows: {}", report.special_rows);

    println!();
    if report.dry_run {
        println!("This was a dry run - no files or rows were written.");
    } else {
        let dir = report
            .avatar_dir
            .canonicalize()
            .unwrap_or_else(|_| report.avatar_dir.clone());
        println!("Seeding completed successfully! Avatars: {}", dir.display());
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();
    logging::init(args.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let settings = args.apply(settings)?;

    println!("Follow Fixture Seeder");
    println!("=====================");
    println!();
    println!("Database: {}", settings.database.path);
    println!("Avatar directory: {}", settings.avatars.dir.display());
    println!("Accounts: {} (batches of {})", settings.seed.count, settings.seed.batch_size);
    println!("Dry run: {}", args.dry_run);
    println!();

    if !args.yes && !args.dry_run && !confirm(&settings)? {
        println!("Seeding cancelled.");
        return Ok(());
    }

    let report = run_seed(&settings, SeedOptions { dry_run: args.dry_run })?;
    display_report(&report);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings::for_directory(std::path::Path::new("/tmp/follow-seed"))
    }

    #[test]
    fn test_args_override_settings() {
        let args = Args::parse_from([
            "follow-seed",
            "--database",
            "other.db",
            "--avatar-dir",
            "/srv/static/avatars",
            "--count",
            "250",
            "--batch-size",
            "50",
            "-y",
        ]);
        let settings = args.apply(base_settings()).expect("apply");

        assert_eq!(settings.database.path, "other.db");
        assert_eq!(settings.avatars.dir, PathBuf::from("/srv/static/avatars"));
        assert_eq!(settings.seed.count, 250);
        assert_eq!(settings.seed.batch_size, 50);
        assert!(args.yes);
    }

    #[test]
    fn test_no_args_keeps_settings() {
        let args = Args {
            database: None,
            avatar_dir: None,
            font: None,
            count: None,
            batch_size: None,
            dry_run: false,
            yes: false,
            verbose: false,
        };
        let settings = args.apply(base_settings()).expect("apply");

        assert_eq!(settings.seed.count, 1000);
        assert_eq!(settings.seed.batch_size, 100);
    }

    #[test]
    fn test_zero_batch_override_rejected() {
        let args = Args::parse_from(["follow-seed", "--batch-size", "0"]);
        assert!(args.apply(base_settings()).is_err());
    }
}
