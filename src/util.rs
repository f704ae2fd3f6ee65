use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Trim, and drop a leading "r/" from a subreddit name. Case is kept: it ends up in filenames.
#[inline]
pub fn normalize_subreddit(s: &str) -> String {
    let s = s.trim();
    s.strip_prefix("r/").unwrap_or(s).to_string()
}

/// `None` for empty / whitespace-only strings, trimmed otherwise.
pub fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Sibling temp path used while a file is being written: `<name>.tmp`.
pub fn tmp_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    dest.with_file_name(name)
}

/// Replace `dest` with `tmp`. Falls back to copy+remove when rename fails
/// (e.g. across filesystems).
pub fn replace_file_atomic(tmp: &Path, dest: &Path) -> Result<()> {
    if fs::rename(tmp, dest).is_ok() {
        return Ok(());
    }
    fs::copy(tmp, dest).with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
    fs::remove_file(tmp).with_context(|| format!("remove {}", tmp.display()))?;
    Ok(())
}
