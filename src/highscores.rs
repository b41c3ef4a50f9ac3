//! Persist the high score to disk (XDG config or ~/.config/blockfall).

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

const FILENAME: &str = "score.txt";

/// Load/save contract for the single best score.
pub trait HighScoreStore {
    /// Previous best, or 0 when there is none or it cannot be read.
    fn load(&self) -> u32;
    /// Overwrite the stored best with `score`.
    fn save(&self, score: u32) -> Result<()>;
}

/// Returns the default path (config dir / blockfall / score.txt).
fn config_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("blockfall").join(FILENAME)
}

/// High score kept as a single decimal integer in a text file.
#[derive(Debug, Clone)]
pub struct FileHighScores {
    path: PathBuf,
}

impl FileHighScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(config_path())
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScores {
    fn load(&self) -> u32 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    fn save(&self, score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, score.to_string())
            .with_context(|| format!("writing high score to {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryHighScores {
    pub best: std::cell::Cell<u32>,
    pub fail_saves: bool,
}

#[cfg(test)]
impl HighScoreStore for MemoryHighScores {
    fn load(&self) -> u32 {
        self.best.get()
    }

    fn save(&self, score: u32) -> Result<()> {
        if self.fail_saves {
            anyhow::bail!("disk full");
        }
        self.best.set(score);
        Ok(())
    }
}
