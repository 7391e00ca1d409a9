//! Resource tag reconciliation
//!
//! A resource exposes two maps: `tags` (what the configuration set) and
//! `tags_all` (everything the provider manages, default tags included).
//! Tags with the `aws:` prefix and keys matched by the provider's
//! `ignore_tags` block never appear in either map and are never touched.

use std::collections::{BTreeMap, BTreeSet};

use tfplug::types::Dynamic;
use tracing::debug;

use crate::api::tags::{TagRef, TagsApi};
use crate::api::ApiError;

const AWS_TAG_PREFIX: &str = "aws:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueTags(BTreeMap<String, String>);

impl KeyValueTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a Terraform map of strings; null and unknown entries are skipped
    pub fn from_dynamic(value: Option<&Dynamic>) -> Self {
        let mut tags = BTreeMap::new();
        if let Some(Dynamic::Map(entries)) = value {
            for (k, v) in entries {
                if let Dynamic::String(s) = v {
                    tags.insert(k.clone(), s.clone());
                }
            }
        }
        Self(tags)
    }

    /// An empty set becomes null so an unset `tags` attribute stays unset
    pub fn to_dynamic(&self) -> Dynamic {
        if self.0.is_empty() {
            return Dynamic::Null;
        }
        Dynamic::Map(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Dynamic::String(v.clone())))
                .collect(),
        )
    }

    pub fn from_wire(tags: &[TagRef]) -> Self {
        tags.iter()
            .map(|t| (t.key.clone(), t.value.clone()))
            .collect()
    }

    pub fn to_wire(&self) -> Vec<TagRef> {
        self.0
            .iter()
            .map(|(key, value)| TagRef {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of both sets; `other` wins on conflicting keys
    pub fn merge(&self, other: &KeyValueTags) -> KeyValueTags {
        let mut merged = self.0.clone();
        merged.extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self(merged)
    }

    pub fn ignore_aws(&self) -> KeyValueTags {
        self.filter(|k, _| !k.starts_with(AWS_TAG_PREFIX))
    }

    pub fn ignore_config(&self, config: &IgnoreConfig) -> KeyValueTags {
        self.filter(|k, _| !config.ignores(k))
    }

    /// Drops default tags, but only where the value still equals the default
    pub fn remove_default_config(&self, config: &DefaultConfig) -> KeyValueTags {
        self.filter(|k, v| config.tags.get(k) != Some(v))
    }

    /// Keys present here but missing from `new`
    pub fn removed(&self, new: &KeyValueTags) -> KeyValueTags {
        self.filter(|k, _| !new.0.contains_key(k))
    }

    /// Pairs of `new` that are absent here or carry a different value
    pub fn updated(&self, new: &KeyValueTags) -> KeyValueTags {
        new.filter(|k, v| self.get(k) != Some(v))
    }

    fn filter(&self, keep: impl Fn(&str, &str) -> bool) -> KeyValueTags {
        Self(
            self.0
                .iter()
                .filter(|(k, v)| keep(k, v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueTags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Provider-level `default_tags`
#[derive(Debug, Clone, Default)]
pub struct DefaultConfig {
    pub tags: KeyValueTags,
}

impl DefaultConfig {
    /// Default tags overlaid with the resource's own tags
    pub fn merge_tags(&self, tags: &KeyValueTags) -> KeyValueTags {
        self.tags.merge(tags)
    }
}

/// Provider-level `ignore_tags`
#[derive(Debug, Clone, Default)]
pub struct IgnoreConfig {
    pub keys: BTreeSet<String>,
    pub key_prefixes: Vec<String>,
}

impl IgnoreConfig {
    pub fn ignores(&self, key: &str) -> bool {
        self.keys.contains(key) || self.key_prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

/// The `tags` and `tags_all` values a resource writes to state
#[derive(Debug, Clone, PartialEq)]
pub struct StateTags {
    pub tags: KeyValueTags,
    pub tags_all: KeyValueTags,
}

/// Splits the remote tag set into the two state attributes
pub fn state_tags(
    remote: &KeyValueTags,
    defaults: &DefaultConfig,
    ignore: &IgnoreConfig,
) -> StateTags {
    let tags_all = remote.ignore_aws().ignore_config(ignore);
    let tags = tags_all.remove_default_config(defaults);
    StateTags { tags, tags_all }
}

/// Applies the difference between two `tags_all` sets to a remote resource
///
/// At most one untag call with exactly the removed keys and one tag call with
/// exactly the added or changed pairs.
pub async fn update_tags(
    api: &TagsApi<'_>,
    arn: &str,
    old_all: &KeyValueTags,
    new_all: &KeyValueTags,
    ignore: &IgnoreConfig,
) -> Result<(), ApiError> {
    let old_all = old_all.ignore_aws().ignore_config(ignore);
    let new_all = new_all.ignore_aws().ignore_config(ignore);

    let removed = old_all.removed(&new_all);
    if !removed.is_empty() {
        debug!("Untagging {} keys from {}", removed.len(), arn);
        api.untag(arn, &removed.keys()).await?;
    }

    let updated = old_all.updated(&new_all);
    if !updated.is_empty() {
        debug!("Tagging {} keys on {}", updated.len(), arn);
        api.tag(arn, &updated.to_wire()).await?;
    }

    Ok(())
}
