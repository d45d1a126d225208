//! Directory sync: walks the full user listing page by page, writes every
//! record to the backup CSV and picks out the accounts named in the import.

use crate::api::{DirectoryUser, ZoomClient, MAX_PAGE_SIZE};
use crate::errors::ApiError;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Column projection of the backup file, in order
pub const BACKUP_COLUMNS: [&str; 13] = [
    "id",
    "email",
    "first_name",
    "last_name",
    "type",
    "enable_webinar",
    "enable_large",
    "dept",
    "created_at",
    "lastClientVersion",
    "lastLoginTime",
    "status",
    "pmi",
];

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to write backup file: {0}")]
    Backup(#[from] csv::Error),

    #[error("Failed to write backup file: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters gathered while walking the listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunMetrics {
    pub total: usize,
    pub basic: usize,
    pub pro: usize,
    pub basic_to_remove: usize,
    pub pro_to_remove: usize,
    pub matched: usize,
    /// Rows in the import file, duplicates and unknown emails included
    pub imported: usize,
    pub pages_requested: u32,
}

impl RunMetrics {
    /// These assume every matched account will be removed.
    pub fn estimated_total_after(&self) -> usize {
        self.total.saturating_sub(self.matched)
    }

    pub fn estimated_basic_after(&self) -> usize {
        self.basic.saturating_sub(self.basic_to_remove)
    }

    pub fn estimated_pro_after(&self) -> usize {
        self.pro.saturating_sub(self.pro_to_remove)
    }

    fn record(&mut self, user: &DirectoryUser, is_target: bool) {
        self.total += 1;
        if user.user_type.is_basic() {
            self.basic += 1;
        } else if user.user_type.is_pro() {
            self.pro += 1;
        }

        if is_target {
            self.matched += 1;
            if user.user_type.is_basic() {
                self.basic_to_remove += 1;
            } else if user.user_type.is_pro() {
                self.pro_to_remove += 1;
            }
        }
    }

    pub fn log_summary(&self, backup_path: &Path) {
        info!("Backup user data stored at: {}", backup_path.display());
        info!("Total accounts: {}", self.total);
        info!("Basic accounts: {}", self.basic);
        info!("Pro accounts: {}", self.pro);
        info!("Accounts to deprovision count (imported file): {}", self.imported);
        info!("Accounts found in directory for deprovisioning: {}", self.matched);
        info!(
            "Estimated total accounts after deprovisioning: {}",
            self.estimated_total_after()
        );
        info!(
            "Estimated Pro accounts after deprovisioning: {}",
            self.estimated_pro_after()
        );
        info!(
            "Estimated Basic accounts after deprovisioning: {}",
            self.estimated_basic_after()
        );
    }
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub targets: Vec<DirectoryUser>,
    pub metrics: RunMetrics,
}

/// Streams directory records into the backup CSV
pub struct BackupWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BackupWriter<W> {
    pub fn new(inner: W) -> Result<Self, csv::Error> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(BACKUP_COLUMNS)?;
        Ok(Self { writer })
    }

    pub fn write_user(&mut self, user: &DirectoryUser) -> Result<(), csv::Error> {
        self.writer
            .write_record(BACKUP_COLUMNS.iter().map(|key| user.field(key)))
    }

    pub fn finish(mut self) -> Result<(), std::io::Error> {
        self.writer.flush()
    }
}

/// Pages through the whole user listing starting at page 1.
///
/// Stops after the first page holding fewer than [`MAX_PAGE_SIZE`] records,
/// or when a response has no `users` field. A listing that is an exact
/// multiple of the page size therefore costs one extra (empty) request.
pub async fn sync_directory(
    client: &ZoomClient,
    backup_path: &Path,
    import_emails: &[String],
) -> Result<SyncOutcome, SyncError> {
    info!("Gathering current Zoom user data and metrics...");

    let file = std::fs::File::create(backup_path)?;
    let mut backup = BackupWriter::new(file)?;

    let wanted: HashSet<&str> = import_emails.iter().map(String::as_str).collect();
    let mut metrics = RunMetrics {
        imported: import_emails.len(),
        ..Default::default()
    };
    let mut targets = Vec::new();

    let mut page_number: u32 = 1;
    let mut result_count = MAX_PAGE_SIZE;

    while result_count == MAX_PAGE_SIZE {
        let page = client.list_users(page_number, MAX_PAGE_SIZE).await?;
        metrics.pages_requested += 1;

        let Some(users) = page.users else {
            debug!("Page {} returned no users field, stopping", page_number);
            break;
        };

        debug!(
            "Page {}/{} returned {} users (total_records: {:?})",
            page_number,
            page.page_count.map(|c| c.to_string()).unwrap_or_else(|| "?".into()),
            users.len(),
            page.total_records
        );

        result_count = users.len();
        for user in users {
            let is_target = wanted.contains(user.email.as_str());
            metrics.record(&user, is_target);
            backup.write_user(&user)?;
            if is_target {
                targets.push(user);
            }
        }

        page_number += 1;
    }

    backup.finish()?;
    metrics.log_summary(backup_path);

    Ok(SyncOutcome { targets, metrics })
}
