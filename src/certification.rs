use serde::Serialize;
use serde_json::Value;

use crate::badge::{ derive_badges, BadgeTag };
use crate::curated::CuratedDetails;
use crate::data::RawCertification;
use crate::outcome::ListOutcome;

/// Shown in place of any missing text field.
pub const PLACEHOLDER: &str = "N/A";

/// Top-level key of the certification finder response.
pub const CERT_LIST_KEY: &str = "CertList";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificationRecord {
    pub name: String,
    pub organization: String,
    pub description: String,
    pub more_info_url: Option<String>,
    pub badges: Vec<BadgeTag>,
    /// Attached after normalization when the name is in the curated table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curated: Option<CuratedDetails>,
}

impl From<RawCertification> for CertificationRecord {
    fn from(raw: RawCertification) -> Self {
        let badges = derive_badges(raw.agencies.iter().map(String::as_str));
        CertificationRecord {
            name: raw.name.unwrap_or_else(|| PLACEHOLDER.to_string()),
            organization: raw.organization.unwrap_or_else(|| PLACEHOLDER.to_string()),
            description: raw.description.unwrap_or_else(|| PLACEHOLDER.to_string()),
            more_info_url: raw.url.filter(|url| !url.trim().is_empty()),
            badges,
            curated: None,
        }
    }
}

/// Classifies a decoded certification finder payload.
///
/// `None` means the fetch stage produced nothing. Individual entries are
/// decoded independently; an entry that is not an object becomes a record of
/// placeholders.
pub fn normalize_certifications(payload: Option<&Value>) -> ListOutcome<CertificationRecord> {
    let payload = match payload {
        Some(payload) => payload,
        None => {
            return ListOutcome::FetchFailed("no certification data was received".to_string());
        }
    };

    let entries = match payload.get(CERT_LIST_KEY) {
        None => {
            return ListOutcome::MalformedResponse(format!("response has no '{}' key", CERT_LIST_KEY));
        }
        Some(Value::Null) => {
            return ListOutcome::Empty;
        }
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return ListOutcome::MalformedResponse(format!("'{}' is not a list", CERT_LIST_KEY));
        }
    };

    if entries.is_empty() {
        return ListOutcome::Empty;
    }

    let records = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            match serde_json::from_value::<RawCertification>(entry.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!("{} entry {} could not be decoded: {}", CERT_LIST_KEY, index, e);
                    RawCertification::default()
                }
            }
        })
        .map(CertificationRecord::from)
        .collect();

    ListOutcome::Records(records)
}
