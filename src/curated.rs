use anyhow::{ anyhow, Context };
use serde::{ Deserialize, Serialize };
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::certification::CertificationRecord;

const BUILTIN: &str = include_str!("../data/curated_certifications.yaml");

/// Details the certification finder does not return, maintained by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedDetails {
    pub description: String,
    pub certifying_organization: String,
    pub organization_url: Option<String>,
    /// Requirement questions in display order.
    #[serde(default)]
    pub details: Vec<Requirement>,
    pub exam_details: Option<String>,
    pub more_info_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct CuratedEntry {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(flatten)]
    curated: CuratedDetails,
}

impl CuratedEntry {
    fn keys(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(&self.name).chain(self.aliases.iter()).map(|name| match_key(name))
    }
}

fn match_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CuratedCatalog {
    entries: Vec<CuratedEntry>,
}

impl CuratedCatalog {
    /// The table compiled into the binary.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_yaml(BUILTIN).context("built-in curated certification table is invalid")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path).with_context(||
            format!("failed to read curated certifications from {}", path.display())
        )?;
        Self::from_yaml(&data).with_context(|| format!("invalid curated certifications in {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> anyhow::Result<Self> {
        let entries: Vec<CuratedEntry> = serde_yaml::from_str(data)?;

        let mut seen = HashSet::new();
        for entry in &entries {
            for key in entry.keys() {
                if !seen.insert(key) {
                    return Err(anyhow!("certification '{}' is listed more than once", entry.name));
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&CuratedDetails> {
        let key = match_key(name);
        self.entries
            .iter()
            .find(|entry| entry.keys().any(|k| k == key))
            .map(|entry| &entry.curated)
    }

    /// Attaches curated details to every record whose name matches an entry.
    pub fn enrich(&self, records: &mut [CertificationRecord]) {
        for record in records.iter_mut() {
            if let Some(curated) = self.lookup(&record.name) {
                tracing::debug!("attaching curated details to '{}'", record.name);
                record.curated = Some(curated.clone());
            }
        }
    }
}
