use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};
use crate::report::Report;

/// Saved reports, one JSON file per run under `<home>/reports/`.
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    /// Uses `$STRBENCH_HOME/reports`, falling back to `~/.strbench/reports`.
    pub fn open_default() -> Result<Self> {
        let home = if let Ok(home) = std::env::var("STRBENCH_HOME") {
            PathBuf::from(home)
        } else {
            directories::BaseDirs::new()
                .ok_or_else(|| {
                    BenchError::DirectoryCreationError("Could not find home directory".to_string())
                })?
                .home_dir()
                .join(".strbench")
        };
        Self::open(home.join("reports"))
    }

    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| BenchError::DirectoryCreationError(e.to_string()))?;
        }
        Ok(ReportStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, run_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", run_id))
    }

    pub fn save(&self, report: &Report) -> Result<PathBuf> {
        let path = self.path_for(&report.run_id);
        let json = report.to_json()?;
        fs::write(&path, json)?;
        tracing::info!(run_id = %report.run_id, path = %path.display(), "report saved");
        Ok(path)
    }

    /// Loads a report by run id or unique run id prefix.
    pub fn load(&self, run_id: &str) -> Result<Report> {
        let exact = self.path_for(run_id);
        if exact.exists() {
            let content = fs::read_to_string(exact)?;
            return Ok(serde_json::from_str(&content)?);
        }

        let mut matches: Vec<Report> = self
            .list(None)?
            .into_iter()
            .filter(|r| r.run_id.starts_with(run_id))
            .collect();
        match matches.len() {
            1 => Ok(matches.remove(0)),
            _ => Err(BenchError::ReportNotFound(run_id.to_string())),
        }
    }

    /// All readable reports, newest first.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<Report>> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<Report>(&content) {
                Ok(report) => reports.push(report),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable report"),
            }
        }

        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            reports.truncate(limit);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Measurement;
    use crate::strategy::Strategy;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample_report() -> Report {
        let mut report = Report::new("9001", "127.0.0.1:40000");
        report.add(Measurement::new(
            Strategy::Append,
            10,
            Duration::from_micros(3),
        ));
        report
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = ReportStore::open(temp_dir.path().join("reports")).unwrap();
        assert!(store.dir().exists());

        let report = sample_report();
        let path = store.save(&report).unwrap();
        assert!(path.ends_with(format!("{}.json", report.run_id)));

        let loaded = store.load(&report.run_id).unwrap();
        assert_eq!(loaded.measurements, report.measurements);

        let by_prefix = store.load(&report.run_id[..4]).unwrap();
        assert_eq!(by_prefix.run_id, report.run_id);
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = ReportStore::open(temp_dir.path()).unwrap();
        assert!(matches!(
            store.load("deadbeef"),
            Err(BenchError::ReportNotFound(_))
        ));
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let temp_dir = TempDir::new().unwrap();
        let store = ReportStore::open(temp_dir.path()).unwrap();

        let mut older = sample_report();
        older.created_at = older.created_at - chrono::Duration::hours(1);
        let newer = sample_report();
        store.save(&older).unwrap();
        store.save(&newer).unwrap();
        std::fs::write(temp_dir.path().join("junk.json"), "not json").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let all = store.list(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].run_id, newer.run_id);

        let one = store.list(Some(1)).unwrap();
        assert_eq!(one.len(), 1);
    }
}
