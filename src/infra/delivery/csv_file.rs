//! CSV-file delivery audit (`timestamp,vehicle,item,quantity`).

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::{DeliverySink, SchedulerError};

const HEADER: [&str; 4] = ["timestamp", "vehicle", "item", "quantity"];

/// Appends one row per delivery to a CSV file.
///
/// The header is written once when the file is created; rows are appended
/// under a mutex so concurrent delivery jobs never interleave.
pub struct CsvDeliverySink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvDeliverySink {
    /// Open (or create) the audit file at `path`.
    ///
    /// # Errors
    ///
    /// `SchedulerError::Collaborator` if the file or its header cannot be written.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(collaborator)?;
        }
        if !path.exists() {
            let mut writer = csv::Writer::from_path(&path).map_err(collaborator)?;
            writer.write_record(HEADER).map_err(collaborator)?;
            writer.flush().map_err(collaborator)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the audit file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DeliverySink for CsvDeliverySink {
    fn record_delivery(
        &self,
        vehicle_name: &str,
        item_name: &str,
        quantity: u32,
    ) -> Result<(), SchedulerError> {
        let _guard = self.write_lock.lock();
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(collaborator)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        let timestamp = chrono::Local::now().to_rfc3339();
        writer
            .write_record([timestamp.as_str(), vehicle_name, item_name, &quantity.to_string()])
            .map_err(collaborator)?;
        writer.flush().map_err(collaborator)?;
        Ok(())
    }
}

fn collaborator(err: impl std::fmt::Display) -> SchedulerError {
    SchedulerError::Collaborator(format!("delivery log: {err}"))
}
