use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Timestamp tag shared by every file one run produces
#[derive(Debug, Clone, PartialEq)]
pub struct RunStamp(String);

impl RunStamp {
    pub fn at(when: DateTime<Local>) -> Self {
        Self(when.format("%-m-%-d-%Y_%-H-%-M-%-S").to_string())
    }

    pub fn now() -> Self {
        Self::at(Local::now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct RunPaths {
    pub log_file: PathBuf,
    pub backup_file: PathBuf,
}

impl RunPaths {
    pub fn new(log_dir: &Path, stamp: &RunStamp) -> Self {
        Self {
            log_file: log_dir.join(format!("zoom_user_deprovisioner_{}.log", stamp.as_str())),
            backup_file: log_dir.join(format!(
                "zoom_users_backup_before_deprovisioning_{}.csv",
                stamp.as_str()
            )),
        }
    }
}
