//! Resolved registry: definitions validated and flattened for runtime use.

use crate::schema::ModelSchema;
use std::collections::HashMap;

/// Direction of a related-include: to_one (we hold the FK) or to_many (they hold an FK to us).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncludeDirection {
    ToOne,
    ToMany,
}

/// Related records embedded in collection reads when `foreign_keys=true`.
#[derive(Clone, Debug)]
pub struct IncludeSpec {
    /// Key under which related data is placed in each row.
    pub name: String,
    pub direction: IncludeDirection,
    pub related_resource: String,
    /// Our FK field (to_one) or our primary key (to_many).
    pub our_key: String,
    /// Their primary key (to_one) or their FK field (to_many).
    pub their_key: String,
}

#[derive(Clone, Debug)]
pub struct ResourceEntry {
    pub name: String,
    pub route_url: String,
    pub table: String,
    pub db_schema: Option<String>,
    pub page_size: u32,
    pub schema: ModelSchema,
    pub includes: Vec<IncludeSpec>,
}

/// Resource name → entry, in registration order. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: Vec<ResourceEntry>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub(crate) fn from_entries(entries: Vec<ResourceEntry>) -> Self {
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Registry { entries, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&ResourceEntry> {
        self.by_name.get(name).map(|i| &self.entries[*i])
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
