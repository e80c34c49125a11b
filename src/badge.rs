use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Red,
    Green,
    Blue,
    Violet,
}

impl BadgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeCategory::Red => "red",
            BadgeCategory::Green => "green",
            BadgeCategory::Blue => "blue",
            BadgeCategory::Violet => "violet",
        }
    }
}

/// A labeled tag derived from an accrediting-agency name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeTag {
    pub label: &'static str,
    pub category: BadgeCategory,
}

/// Keys are canonical agency names: trimmed and uppercased.
const BADGES: [(&str, BadgeTag); 8] = [
    ("IN-DEMAND", BadgeTag { label: "In-Demand", category: BadgeCategory::Red }),
    ("MILITARY", BadgeTag { label: "Military", category: BadgeCategory::Green }),
    ("ANSI", BadgeTag { label: "ANSI", category: BadgeCategory::Blue }),
    ("JOB CORPS", BadgeTag { label: "Job Corps", category: BadgeCategory::Violet }),
    ("NCCA", BadgeTag { label: "NCCA", category: BadgeCategory::Violet }),
    ("NAM", BadgeTag { label: "NAM", category: BadgeCategory::Violet }),
    ("ABNS", BadgeTag { label: "ABNS", category: BadgeCategory::Violet }),
    ("ICAC", BadgeTag { label: "ICAC", category: BadgeCategory::Violet }),
];

/// Looks up the badge for one agency name, ignoring case and surrounding whitespace.
pub fn badge_for(agency: &str) -> Option<BadgeTag> {
    let canonical = agency.trim().to_uppercase();
    BADGES.iter()
        .find(|(key, _)| *key == canonical)
        .map(|(_, badge)| *badge)
}

/// Maps agency names to badges in source order. Duplicates are kept.
pub fn derive_badges<'a, I>(agencies: I) -> Vec<BadgeTag> where I: IntoIterator<Item = &'a str> {
    agencies.into_iter().filter_map(badge_for).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_and_ordered() {
        let badges = derive_badges(["ansi", "Military"]);
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0].label, "ANSI");
        assert_eq!(badges[0].category, BadgeCategory::Blue);
        assert_eq!(badges[1].label, "Military");
        assert_eq!(badges[1].category, BadgeCategory::Green);
    }

    #[test]
    fn test_unknown_agency_yields_nothing() {
        assert!(badge_for("Board of Something Else").is_none());
        assert!(derive_badges(["", "   ", "ISO"]).is_empty());
    }

    #[test]
    fn test_whitespace_and_multiword_names() {
        let badge = badge_for("  job corps ").unwrap();
        assert_eq!(badge.label, "Job Corps");
        assert_eq!(badge.category.as_str(), "violet");
        assert_eq!(badge_for("In-Demand").unwrap().category, BadgeCategory::Red);
    }

    #[test]
    fn test_duplicates_preserved() {
        let badges = derive_badges(["NCCA", "ncca"]);
        assert_eq!(badges, vec![badges[0], badges[0]]);
        assert_eq!(badges.len(), 2);
    }
}
