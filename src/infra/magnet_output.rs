use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Per-run list of download links, one per line. Creating it truncates
/// whatever the previous run left behind.
pub struct MagnetOutput {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl MagnetOutput {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create magnet output {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn push(&mut self, link: &str) -> Result<()> {
        writeln!(self.writer, "{link}")
            .and_then(|_| self.writer.flush())
            .with_context(|| format!("Failed to write to {}", self.path.display()))
    }
}
