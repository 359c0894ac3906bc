#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a `lexis` command isolated from the user's config and store.
#[allow(dead_code)]
pub fn lexis_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lexis"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("LEXIS_CONFIG", dir.join("config.toml"));
    cmd.env("LEXIS_DB_PATH", dir.join("lexis.db"));
    cmd.env_remove("LEXIS_DICTIONARY_URL");
    cmd.env_remove("LEXIS_FETCH_TIMEOUT_SECS");
    cmd.env("NO_COLOR", "1");
    cmd
}
