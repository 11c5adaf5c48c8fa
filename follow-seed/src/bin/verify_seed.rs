// Quick diagnostic to check a seeded database and avatar directory
use anyhow::Context;
use follow_seed::config::Settings;
use follow_seed::db::repositories::FollowRepository;
use follow_seed::db::Database;
use follow_seed::logging;
use follow_seed::verify::verify_seed;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init(false);

    let settings = Settings::new().context("Failed to load settings")?;
    let db = Database::new(&settings.database.path)?;

    println!("=== Seed Diagnostic ===\n");
    println!("Database: {}", settings.database.path);
    println!("Avatar directory: {}", settings.avatars.dir.display());

    let report = verify_seed(&db, &settings)?;

    println!("\n=== Counts ===");
    println!("Rows: {} (expected {})", report.row_count, report.expected_rows);
    println!("Special follows: {}", report.special_count);
    println!("Avatar files: {}", report.avatar_files);

    if report.row_count > 0 {
        let repo = FollowRepository::new(db.pool.clone());
        println!("\n=== Sample rows ===");
        for douyin_id in ["dy_1", "dy_20", "dy_21"] {
            match repo.get_by_douyin_id(douyin_id)? {
                Some(user) => println!(
                    "  {} | {} | {} | special={} | status={} | followed_at={}",
                    user.douyin_id,
                    user.nick,
                    user.avatar.as_deref().unwrap_or("-"),
                    user.is_special,
                    user.status.as_str(),
                    user.followed_at()
                        .map(|at| at.to_rfc3339())
                        .unwrap_or_else(|| user.follow_time.to_string()),
                ),
                None => println!("  {} | missing", douyin_id),
            }
        }
    }

    println!();
    if report.is_ok() {
        println!("Seed verified: no problems found");
        return Ok(());
    }

    println!("Problems found: {}", report.problems.len());
    for (i, problem) in report.problems.iter().enumerate() {
        println!("  {}. {}", i + 1, problem);
    }
    anyhow::bail!("Seed verification failed with {} problems", report.problems.len())
}
