use crate::storage::ColumnFamily;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output paths of a finished report
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReportFiles {
    pub visits: PathBuf,
    pub tables: PathBuf,
}

/// Writes the generated visits as CSV and a dump of the rollup tables
pub struct ReportWriter {
    files: ReportFiles,
    visits: BufWriter<File>,
    tables: BufWriter<File>,
}

impl ReportWriter {
    /// Create `<millis>_<site>_visits.csv` and `<millis>_<site>_tables.txt` in `dir`
    pub fn create(dir: &Path, site: &str) -> Result<Self, ReportError> {
        std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let millis = chrono::Utc::now().timestamp_millis();
        let files = ReportFiles {
            visits: dir.join(format!("{}_{}_visits.csv", millis, site)),
            tables: dir.join(format!("{}_{}_tables.txt", millis, site)),
        };

        Ok(Self {
            visits: open(&files.visits)?,
            tables: open(&files.tables)?,
            files,
        })
    }

    pub fn files(&self) -> &ReportFiles {
        &self.files
    }

    pub fn write_csv(&mut self, line: &str) -> Result<(), ReportError> {
        writeln!(self.visits, "{}", line).map_err(|source| ReportError::Io {
            path: self.files.visits.clone(),
            source,
        })
    }

    pub fn write_table(&mut self, family: &ColumnFamily) -> Result<(), ReportError> {
        writeln!(self.tables, "{}", family).map_err(|source| ReportError::Io {
            path: self.files.tables.clone(),
            source,
        })
    }

    /// Flush both files
    pub fn finish(mut self) -> Result<ReportFiles, ReportError> {
        self.visits.flush().map_err(|source| ReportError::Io {
            path: self.files.visits.clone(),
            source,
        })?;
        self.tables.flush().map_err(|source| ReportError::Io {
            path: self.files.tables.clone(),
            source,
        })?;
        Ok(self.files)
    }
}

fn open(path: &Path) -> Result<BufWriter<File>, ReportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
}
