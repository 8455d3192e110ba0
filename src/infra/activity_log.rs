use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Human-readable, append-only history of handed-off episodes.
pub struct ActivityLog {
    file: File,
    header_written: bool,
}

impl ActivityLog {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open activity log {}", path.display()))?;
        Ok(Self {
            file,
            header_written: false,
        })
    }

    pub fn add_entry(&mut self, name: &str) -> Result<()> {
        self.add_entry_at(name, Local::now())
    }

    fn add_entry_at(&mut self, name: &str, now: DateTime<Local>) -> Result<()> {
        if !self.header_written {
            write!(
                self.file,
                "\n---- LOG : {} -----\n",
                now.format("%d/%m/%Y %H:%M")
            )?;
            self.header_written = true;
        }
        writeln!(self.file, "Downloaded : {name}")?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_header_written_once_per_run() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloads.log");
        let at = Local.with_ymd_and_hms(2012, 3, 9, 21, 5, 0).unwrap();

        let mut log = ActivityLog::open(&path).unwrap();
        log.add_entry_at("Spartacus 2x05 [720p]", at).unwrap();
        log.add_entry_at("True Blood 5x03 720p", at).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "\n---- LOG : 09/03/2012 21:05 -----\n\
             Downloaded : Spartacus 2x05 [720p]\n\
             Downloaded : True Blood 5x03 720p\n"
        );
    }

    #[test]
    fn test_runs_append() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloads.log");

        ActivityLog::open(&path).unwrap().add_entry("First").unwrap();
        ActivityLog::open(&path).unwrap().add_entry("Second").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("---- LOG : ").count(), 2);
        assert!(content.find("Downloaded : First").unwrap() < content.find("Downloaded : Second").unwrap());
    }

    #[test]
    fn test_open_without_entries_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloads.log");

        drop(ActivityLog::open(&path).unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
