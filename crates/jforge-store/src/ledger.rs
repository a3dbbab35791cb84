use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use jforge_core::attempt::Attempt;

use crate::record::BuildRecord;
use crate::table::{parse_table, render_table, TableError};

pub const LOCAL_HEADER: [&str; 7] = [
    "timestamp",
    "project_slug",
    "status",
    "jdk_version",
    "mvn_version",
    "gradle_version",
    "use_gradlew",
];

pub const GLOBAL_HEADER: [&str; 6] = [
    "project_slug",
    "status",
    "jdk_version",
    "mvn_version",
    "gradle_version",
    "use_gradlew",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Table {
        path: String,
        source: TableError,
    },
    Json {
        path: String,
        source: serde_json::Error,
    },
    InvalidRecord {
        path: String,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io { path, source } => write!(f, "io error on '{}': {}", path, source),
            StoreError::Table { path, source } => {
                write!(f, "malformed ledger '{}': {}", path, source)
            }
            StoreError::Json { path, source } => {
                write!(f, "malformed toolchain descriptor '{}': {}", path, source)
            }
            StoreError::InvalidRecord { path, message } => {
                write!(f, "invalid record in '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalEntry {
    pub timestamp: String,
    pub record: BuildRecord,
}

/// Append-only attempt history. Rows are never rewritten or merged.
#[derive(Clone, Debug)]
pub struct LocalLedger {
    path: PathBuf,
}

impl LocalLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn entries(&self) -> Result<Vec<LocalEntry>, StoreError> {
        let rows = read_rows(&self.path, &LOCAL_HEADER)?;
        rows.into_iter()
            .map(|mut row| {
                let timestamp = row.remove(0);
                let record = BuildRecord::from_fields(&row).map_err(|message| {
                    StoreError::InvalidRecord {
                        path: self.path.display().to_string(),
                        message,
                    }
                })?;
                Ok(LocalEntry { timestamp, record })
            })
            .collect()
    }

    pub fn append(&self, record: BuildRecord) -> Result<LocalEntry, StoreError> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.append_at(timestamp, record)
    }

    pub fn append_at(&self, timestamp: String, record: BuildRecord) -> Result<LocalEntry, StoreError> {
        let entry = LocalEntry { timestamp, record };
        let mut entries = self.entries()?;
        entries.push(entry.clone());
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|entry| {
                let mut row = vec![entry.timestamp.clone()];
                row.extend(entry.record.fields());
                row
            })
            .collect();
        write_table(&self.path, &LOCAL_HEADER, &rows)?;
        tracing::debug!(
            ledger = %self.path.display(),
            project = %entry.record.project_slug,
            status = %entry.record.status,
            "appended local ledger row"
        );
        Ok(entry)
    }

    /// First successful row for the project that names a usable configuration.
    pub fn remembered_success(&self, project_slug: &str) -> Result<Option<Attempt>, StoreError> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|entry| entry.record)
            .find_map(|record| usable_success(&record, project_slug)))
    }
}

/// One row per project, replaced in place on every write.
#[derive(Clone, Debug)]
pub struct GlobalLedger {
    path: PathBuf,
}

impl GlobalLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn records(&self) -> Result<Vec<BuildRecord>, StoreError> {
        read_rows(&self.path, &GLOBAL_HEADER)?
            .iter()
            .map(|row| {
                BuildRecord::from_fields(row).map_err(|message| StoreError::InvalidRecord {
                    path: self.path.display().to_string(),
                    message,
                })
            })
            .collect()
    }

    pub fn get(&self, project_slug: &str) -> Result<Option<BuildRecord>, StoreError> {
        Ok(self
            .records()?
            .into_iter()
            .find(|record| record.project_slug == project_slug))
    }

    pub fn upsert(&self, record: BuildRecord) -> Result<(), StoreError> {
        let mut records = self.records()?;
        match records
            .iter_mut()
            .find(|existing| existing.project_slug == record.project_slug)
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        let rows: Vec<Vec<String>> = records.iter().map(BuildRecord::fields).collect();
        write_table(&self.path, &GLOBAL_HEADER, &rows)?;
        tracing::debug!(ledger = %self.path.display(), rows = rows.len(), "rewrote global ledger");
        Ok(())
    }

    pub fn remembered_success(&self, project_slug: &str) -> Result<Option<Attempt>, StoreError> {
        Ok(self
            .records()?
            .into_iter()
            .find_map(|record| usable_success(&record, project_slug)))
    }
}

fn usable_success(record: &BuildRecord, project_slug: &str) -> Option<Attempt> {
    if record.project_slug != project_slug || !record.is_success() {
        return None;
    }
    record.attempt()
}

fn read_rows(path: &Path, header: &[&str]) -> Result<Vec<Vec<String>>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(StoreError::io(path, error)),
    };
    parse_table(&contents, header).map_err(|source| StoreError::Table {
        path: path.display().to_string(),
        source,
    })
}

/// Each write stages into its own uniquely named sibling of `path`, then renames.
fn write_table(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|error| StoreError::io(parent, error))?;
    let mut staging =
        tempfile::NamedTempFile::new_in(parent).map_err(|error| StoreError::io(parent, error))?;
    staging
        .write_all(render_table(header, rows).as_bytes())
        .map_err(|error| StoreError::io(staging.path(), error))?;
    staging
        .persist(path)
        .map_err(|error| StoreError::io(path, error.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BuildStatus;

    #[test]
    fn missing_ledger_reads_as_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let local = LocalLedger::new(dir.path().join("build-info").join("build_info_local.csv"));
        assert!(local.entries().expect("entries").is_empty());
        let global = GlobalLedger::new(dir.path().join("build_info.csv"));
        assert_eq!(global.get("acme").expect("get"), None);
    }

    #[test]
    fn append_creates_parent_dir_and_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("build-info").join("build_info_local.csv");
        let local = LocalLedger::new(&path);
        local
            .append_at(
                "2024-01-01-00:00:00".to_string(),
                BuildRecord::from_attempt("acme", BuildStatus::Failure, &Attempt::maven("8", "3.5.0")),
            )
            .expect("append");
        let contents = fs::read_to_string(&path).expect("read ledger");
        assert_eq!(
            contents,
            "timestamp,project_slug,status,jdk_version,mvn_version,gradle_version,use_gradlew\n\
             2024-01-01-00:00:00,acme,failure,8,3.5.0,n/a,n/a\n"
        );
    }

    #[test]
    fn local_lookup_skips_failures_and_other_projects() {
        let dir = tempfile::tempdir().expect("temp dir");
        let local = LocalLedger::new(dir.path().join("local.csv"));
        local
            .append(BuildRecord::from_attempt("acme", BuildStatus::Failure, &Attempt::maven("8", "3.5.0")))
            .expect("append");
        local
            .append(BuildRecord::from_attempt("other", BuildStatus::Success, &Attempt::gradle("17", "8.9")))
            .expect("append");
        local
            .append(BuildRecord::from_attempt("acme", BuildStatus::Success, &Attempt::wrapper("17")))
            .expect("append");
        assert_eq!(
            local.remembered_success("acme").expect("lookup"),
            Some(Attempt::wrapper("17"))
        );
        assert_eq!(local.remembered_success("missing").expect("lookup"), None);
    }

    #[test]
    fn global_reads_rows_written_elsewhere() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("build_info.csv");
        fs::write(
            &path,
            "project_slug,status,jdk_version,mvn_version,gradle_version,use_gradlew\r\n\
             acme,success,8,n/a,7.6.4,n/a\r\n",
        )
        .expect("write ledger");
        let global = GlobalLedger::new(&path);
        assert_eq!(
            global.remembered_success("acme").expect("lookup"),
            Some(Attempt::gradle("8", "7.6.4"))
        );
    }

    #[test]
    fn malformed_ledger_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("build_info.csv");
        fs::write(&path, "slug,status\nacme,success\n").expect("write ledger");
        let error = GlobalLedger::new(&path).records().expect_err("error");
        assert!(error.to_string().contains("malformed ledger"));
    }
}
