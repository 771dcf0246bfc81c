use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::kv::KeyValue;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Log {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub fields: Vec<KeyValue>,
}
