//! Crate and version models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A crate as served by the registry API.
///
/// `max_version` and `newest_version` are derived from the crate's versions
/// when the record is served; they are `None` on stored records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crate {
    /// The crate ID. The registry uses the name as ID.
    pub id: String,

    /// The crate name.
    pub name: String,

    /// Short description.
    #[serde(default)]
    pub description: Option<String>,

    /// Documentation URL declared in the crate manifest.
    #[serde(default)]
    pub documentation: Option<String>,

    /// Homepage URL.
    #[serde(default)]
    pub homepage: Option<String>,

    /// Repository URL.
    #[serde(default)]
    pub repository: Option<String>,

    /// All-time download count.
    #[serde(default)]
    pub downloads: u64,

    /// Download count over the last 90 days.
    #[serde(default)]
    pub recent_downloads: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Keyword IDs.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Category slugs.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Highest non-yanked version.
    #[serde(default)]
    pub max_version: Option<String>,

    /// Most recently published version.
    #[serde(default)]
    pub newest_version: Option<String>,
}

/// A published version of a crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: u64,

    /// Name of the crate this version belongs to.
    #[serde(rename = "crate")]
    pub crate_name: String,

    /// The version number, e.g. "1.0.0".
    pub num: String,

    #[serde(default)]
    pub yanked: bool,

    #[serde(default)]
    pub downloads: u64,

    #[serde(default)]
    pub license: Option<String>,

    /// Size of the packaged crate in bytes.
    #[serde(default)]
    pub crate_size: Option<u64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Version {
    /// Parse the version number.
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.num).ok()
    }
}

/// Pick the version a crate page displays by default.
///
/// That is the highest semver version that is not yanked, or the highest
/// version overall if every version is yanked. Unparseable numbers sort last.
pub fn max_version<'a, I>(versions: I) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    let versions: Vec<&Version> = versions.into_iter().collect();
    let highest = |candidates: Vec<&'a Version>| {
        candidates
            .into_iter()
            .max_by(|a, b| a.semver().cmp(&b.semver()))
    };

    let live: Vec<&Version> = versions.iter().copied().filter(|v| !v.yanked).collect();
    if live.is_empty() {
        highest(versions)
    } else {
        highest(live)
    }
}

/// Pick the most recently published version.
pub fn newest_version<'a, I>(versions: I) -> Option<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    versions
        .into_iter()
        .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn version(id: u64, num: &str, yanked: bool) -> Version {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(id as i64);
        Version {
            id,
            crate_name: "foo".to_string(),
            num: num.to_string(),
            yanked,
            downloads: 0,
            license: None,
            crate_size: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_max_version_uses_semver_order() {
        let versions = vec![
            version(1, "0.9.0", false),
            version(2, "0.10.0", false),
            version(3, "0.2.0", false),
        ];
        assert_eq!(max_version(&versions).unwrap().num, "0.10.0");
    }

    #[test]
    fn test_max_version_skips_yanked() {
        let versions = vec![version(1, "1.0.0", false), version(2, "2.0.0", true)];
        assert_eq!(max_version(&versions).unwrap().num, "1.0.0");
    }

    #[test]
    fn test_max_version_all_yanked() {
        let versions = vec![version(1, "1.0.0", true), version(2, "2.0.0", true)];
        assert_eq!(max_version(&versions).unwrap().num, "2.0.0");
    }

    #[test]
    fn test_max_version_empty() {
        assert!(max_version(&Vec::new()).is_none());
    }

    #[test]
    fn test_newest_version_by_publish_date() {
        let versions = vec![version(2, "0.1.1", false), version(1, "1.0.0", false)];
        assert_eq!(newest_version(&versions).unwrap().num, "0.1.1");
    }
}
