use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Account license tier as reported by the user listing.
///
/// The API encodes the tier as a small integer. Codes 1 and 2 are known;
/// anything else is carried through untouched so it still lands in the backup.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UserType {
    Basic,
    Pro,
    Other(serde_json::Value),
    #[default]
    Missing,
}

impl UserType {
    pub const BASIC_CODE: i64 = 1;
    pub const PRO_CODE: i64 = 2;

    pub fn from_code(code: i64) -> Self {
        match code {
            Self::BASIC_CODE => UserType::Basic,
            Self::PRO_CODE => UserType::Pro,
            other => UserType::Other(serde_json::Value::from(other)),
        }
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, UserType::Basic)
    }

    pub fn is_pro(&self) -> bool {
        matches!(self, UserType::Pro)
    }

    /// Text written to the backup file
    pub fn to_backup_value(&self) -> String {
        match self {
            UserType::Basic => "Basic".to_string(),
            UserType::Pro => "Pro".to_string(),
            UserType::Other(serde_json::Value::String(s)) => s.clone(),
            UserType::Other(v) => v.to_string(),
            UserType::Missing => String::new(),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_backup_value())
    }
}

impl Serialize for UserType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            UserType::Basic => serializer.serialize_str("Basic"),
            UserType::Pro => serializer.serialize_str("Pro"),
            UserType::Other(v) => v.serialize(serializer),
            UserType::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for UserType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::Null => UserType::Missing,
            serde_json::Value::Number(ref n) => match n.as_i64() {
                Some(code) => UserType::from_code(code),
                None => UserType::Other(raw),
            },
            // Already translated, e.g. when re-reading a backup
            serde_json::Value::String(ref s) if s == "Basic" => UserType::Basic,
            serde_json::Value::String(ref s) if s == "Pro" => UserType::Pro,
            other => UserType::Other(other),
        })
    }
}
