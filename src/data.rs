use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

/// One entry of the certification finder `CertList`.
///
/// Every field is optional and tolerant of unexpected JSON types so that a
/// single odd entry never fails the batch.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct RawCertification {
    #[serde(rename = "Name", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "Organization", default, deserialize_with = "lenient_string")]
    pub organization: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(rename = "Url", default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(rename = "CertAccredAgencyList", default, deserialize_with = "agency_names")]
    pub agencies: Vec<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where D: Deserializer<'de>
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn agency_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error> where D: Deserializer<'de> {
    let names = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(agencies)) =>
            agencies
                .iter()
                .filter_map(|agency| agency.get("Name").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
        _ => Vec::new(),
    };
    Ok(names)
}

/// RSS 2.0 document root (`<rss>`).
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct RssDocument {
    pub channel: RssChannel,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct RssChannel {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "item", default)]
    pub items: Vec<RssItem>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct RssItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
}

/// Atom document root (`<feed>`).
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct AtomFeed {
    #[serde(default)]
    pub title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    pub entries: Vec<AtomEntry>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct AtomEntry {
    #[serde(default)]
    pub title: Option<AtomText>,
    #[serde(rename = "link", default)]
    pub links: Vec<AtomLink>,
    #[serde(default)]
    pub summary: Option<AtomText>,
    #[serde(default)]
    pub content: Option<AtomText>,
    #[serde(default)]
    pub published: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct AtomLink {
    #[serde(rename = "@href", default)]
    pub href: Option<String>,
    #[serde(rename = "@rel", default)]
    pub rel: Option<String>,
}

impl AtomEntry {
    /// The `alternate` link, or the first link carrying an href.
    pub fn alternate_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel.as_deref().map_or(true, |rel| rel == "alternate") && link.href.is_some())
            .or_else(|| self.links.iter().find(|link| link.href.is_some()))
            .and_then(|link| link.href.as_deref())
    }
}

/// Text construct; `type` attributes are ignored.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct AtomText {
    #[serde(rename = "$text", default)]
    pub value: String,
}
