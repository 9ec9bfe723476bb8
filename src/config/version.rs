//! Admin API version selection.
//!
//! The version becomes part of every REST and GraphQL path
//! (`/admin/api/{version}/...`).

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Shopify Admin API version.
///
/// Shopify ships a stable version every quarter (January, April, July,
/// October). Known releases get a variant; other well-formed quarterly
/// versions parse into [`ApiVersion::Custom`].
///
/// ```rust
/// use shopify_app::ApiVersion;
///
/// let version: ApiVersion = "2025-10".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2025_10);
/// assert_eq!(version.to_string(), "2025-10");
///
/// let future: ApiVersion = "2027-04".parse().unwrap();
/// assert_eq!(future, ApiVersion::Custom("2027-04".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// 2025-01
    V2025_01,
    /// 2025-04
    V2025_04,
    /// 2025-07
    V2025_07,
    /// 2025-10
    V2025_10,
    /// 2026-01
    V2026_01,
    /// The `unstable` channel.
    Unstable,
    /// A well-formed quarterly version this crate has no variant for.
    Custom(String),
}

impl ApiVersion {
    const KNOWN: [(Self, &'static str); 5] = [
        (Self::V2025_01, "2025-01"),
        (Self::V2025_04, "2025-04"),
        (Self::V2025_07, "2025-07"),
        (Self::V2025_10, "2025-10"),
        (Self::V2026_01, "2026-01"),
    ];

    /// Returns the newest stable version this crate knows about.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2026_01
    }

    /// Returns the path segment used in Admin API URLs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unstable => "unstable",
            Self::Custom(version) => version,
            known => Self::KNOWN
                .iter()
                .find(|(variant, _)| variant == known)
                .map_or("unstable", |(_, name)| *name),
        }
    }

    fn is_quarterly(version: &str) -> bool {
        let Some((year, month)) = version.split_once('-') else {
            return false;
        };
        year.len() == 4
            && year.chars().all(|c| c.is_ascii_digit())
            && matches!(month, "01" | "04" | "07" | "10")
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.trim().to_lowercase();

        if version == "unstable" {
            return Ok(Self::Unstable);
        }
        if let Some((variant, _)) = Self::KNOWN.iter().find(|(_, name)| *name == version) {
            return Ok(variant.clone());
        }
        if Self::is_quarterly(&version) {
            Ok(Self::Custom(version))
        } else {
            Err(ConfigError::InvalidApiVersion { version })
        }
    }
}
