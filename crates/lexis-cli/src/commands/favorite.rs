//! Favorite command implementation

use anyhow::{Result, bail};
use colored::Colorize;
use lexis_core::{EntryId, SqliteStore};

/// Bookmark `entry_id` for `user` and print the new favorite id.
pub async fn execute(store: &SqliteStore, entry_id: i64, user: &str) -> Result<()> {
    if user.trim().is_empty() {
        bail!("--user must not be empty");
    }

    let favorite = store.add_favorite(user, EntryId(entry_id)).await?;
    println!(
        "{} entry {} for {} (favorite {})",
        "Bookmarked".green(),
        entry_id,
        user.bold(),
        favorite
    );
    Ok(())
}
