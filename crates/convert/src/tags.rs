use std::collections::HashSet;

use spandoc_core::config::ConverterConfig;
use spandoc_core::model::{KeyValue, ValueType};

use crate::document::{KeyValueDocument, TagMap};
use crate::encode::{kept_key_value, native_value};

/// Decides which tags are flattened into the `tag` map and which stay in
/// the `tags` array.
#[derive(Debug, Clone)]
pub struct TagPolicy {
    all_tags_as_fields: bool,
    tag_keys_as_fields: HashSet<String>,
    tag_dot_replacement: String,
}

impl TagPolicy {
    pub fn new(cfg: &ConverterConfig) -> Self {
        Self {
            all_tags_as_fields: cfg.all_tags_as_fields,
            tag_keys_as_fields: cfg.tag_keys_as_fields.iter().cloned().collect(),
            tag_dot_replacement: cfg.tag_dot_replacement.clone(),
        }
    }

    /// Binary values are never promoted.
    pub fn should_promote(&self, kv: &KeyValue) -> bool {
        kv.value_type() != ValueType::Binary
            && (self.all_tags_as_fields || self.tag_keys_as_fields.contains(&kv.key))
    }

    pub fn field_name(&self, key: &str) -> String {
        key.replace('.', &self.tag_dot_replacement)
    }

    /// Splits `kvs` into kept array entries and promoted fields. The map is
    /// `None` when nothing was promoted; on field name collisions the later
    /// tag wins.
    pub fn classify(&self, kvs: &[KeyValue]) -> (Vec<KeyValueDocument>, Option<TagMap>) {
        let mut kept = Vec::new();
        let mut promoted: Option<TagMap> = None;
        for kv in kvs {
            if self.should_promote(kv) {
                promoted
                    .get_or_insert_with(TagMap::new)
                    .insert(self.field_name(&kv.key), native_value(&kv.value));
            } else {
                kept.push(kept_key_value(kv));
            }
        }
        (kept, promoted)
    }

    pub fn promotes_all(&self) -> bool {
        self.all_tags_as_fields
    }

    pub fn promoted_key_count(&self) -> usize {
        self.tag_keys_as_fields.len()
    }
}
