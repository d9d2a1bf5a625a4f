use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `(dc, directory)` pair that gets its own polling loop.
///
/// Two targets with the same fields are still polled independently; the
/// pair itself is the only identity a target has.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub dc: String,
    pub directory: String,
}

impl Target {
    pub fn new(dc: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            dc: dc.into(),
            directory: directory.into(),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.dc, self.directory)
    }
}

/// The resolved list of targets to poll.
///
/// # Examples
///
/// ```
/// use kvmon_common::TargetSet;
/// use std::collections::BTreeMap;
///
/// let mut dcs = BTreeMap::new();
/// dcs.insert("dc2".to_string(), vec!["app".to_string()]);
/// dcs.insert("dc1".to_string(), vec!["app".to_string(), "flags".to_string()]);
///
/// let targets = TargetSet::from_directories(&dcs);
/// assert_eq!(targets.len(), 3);
/// assert_eq!(targets.iter().next().unwrap().to_string(), "dc1:app");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    /// Flattens a `dc -> [directory]` mapping, ordered by dc name and then by
    /// the configured directory order. Duplicate directories are kept.
    pub fn from_directories(dcs: &BTreeMap<String, Vec<String>>) -> Self {
        let targets = dcs
            .iter()
            .flat_map(|(dc, directories)| {
                directories
                    .iter()
                    .map(move |directory| Target::new(dc.clone(), directory.clone()))
            })
            .collect();
        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }
}

impl From<Vec<Target>> for TargetSet {
    fn from(targets: Vec<Target>) -> Self {
        Self { targets }
    }
}

impl IntoIterator for TargetSet {
    type Item = Target;
    type IntoIter = std::vec::IntoIter<Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.into_iter()
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

/// A single modify index read from the KV store during one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub dc: String,
    pub key: String,
    pub version: f64,
}

/// One `(dc, key, value)` triple read back from the metric store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub dc: String,
    pub key: String,
    pub value: f64,
}
