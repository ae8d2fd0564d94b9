//! Region catalogue: Indian states and union territories with their station-id prefix

use serde::Serialize;

use crate::{PlannerError, Result};

/// A selectable region. Stations belong to it when their id starts with `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub name: &'static str,
    pub code: &'static str,
}

const REGIONS: &[Region] = &[
    Region { name: "Andhra Pradesh", code: "AP" },
    Region { name: "Arunachal Pradesh", code: "AR" },
    Region { name: "Assam", code: "AS" },
    Region { name: "Bihar", code: "BR" },
    Region { name: "Chhattisgarh", code: "CG" },
    Region { name: "Goa", code: "GA" },
    Region { name: "Gujarat", code: "GJ" },
    Region { name: "Haryana", code: "HR" },
    Region { name: "Himachal Pradesh", code: "HP" },
    Region { name: "Jharkhand", code: "JH" },
    Region { name: "Karnataka", code: "KA" },
    Region { name: "Kerala", code: "KL" },
    Region { name: "Madhya Pradesh", code: "MP" },
    Region { name: "Maharashtra", code: "MH" },
    Region { name: "Manipur", code: "MN" },
    Region { name: "Meghalaya", code: "ML" },
    Region { name: "Mizoram", code: "MZ" },
    Region { name: "Nagaland", code: "NL" },
    Region { name: "Odisha", code: "OD" },
    Region { name: "Punjab", code: "PB" },
    Region { name: "Rajasthan", code: "RJ" },
    Region { name: "Sikkim", code: "SK" },
    Region { name: "Tamil Nadu", code: "TN" },
    Region { name: "Telangana", code: "TG" },
    Region { name: "Tripura", code: "TR" },
    Region { name: "Uttar Pradesh", code: "UP" },
    Region { name: "Uttarakhand", code: "UK" },
    Region { name: "West Bengal", code: "WB" },
    Region { name: "Andaman and Nicobar Islands", code: "AN" },
    Region { name: "Chandigarh", code: "CH" },
    Region { name: "Dadra and Nagar Haveli and Daman and Diu", code: "DN" },
    Region { name: "Delhi", code: "DL" },
    Region { name: "Jammu and Kashmir", code: "JK" },
    Region { name: "Ladakh", code: "LA" },
    Region { name: "Lakshadweep", code: "LD" },
    Region { name: "Puducherry", code: "PY" },
];

impl Region {
    /// Every known region, states first
    #[must_use]
    pub fn all() -> &'static [Region] {
        REGIONS
    }

    /// Look up a region by display name or two-letter code, ignoring case
    pub fn resolve(input: &str) -> Result<Region> {
        let needle = input.trim();
        REGIONS
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(needle) || r.code.eq_ignore_ascii_case(needle))
            .copied()
            .ok_or_else(|| PlannerError::UnknownRegion {
                input: input.to_string(),
            })
    }

    /// Region for a code, if it is a known one
    #[must_use]
    pub fn from_code(code: &str) -> Option<Region> {
        REGIONS.iter().find(|r| r.code == code).copied()
    }

    /// Whether a station id belongs to this region
    #[must_use]
    pub fn contains(&self, station_id: &str) -> bool {
        station_id.starts_with(self.code)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("Delhi", "DL")]
    #[case("delhi", "DL")]
    #[case("  Tamil Nadu ", "TN")]
    #[case("mh", "MH")]
    #[case("Dadra and Nagar Haveli and Daman and Diu", "DN")]
    fn test_resolve(#[case] input: &str, #[case] code: &str) {
        assert_eq!(Region::resolve(input).unwrap().code, code);
    }

    #[test]
    fn test_unknown_region() {
        let err = Region::resolve("Atlantis").unwrap_err();
        assert!(matches!(err, PlannerError::UnknownRegion { ref input } if input == "Atlantis"));
    }

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = Region::all().iter().map(|r| r.code).collect();
        assert_eq!(codes.len(), Region::all().len());
        assert_eq!(Region::all().len(), 36);
    }

    #[test]
    fn test_contains_and_display() {
        let delhi = Region::from_code("DL").unwrap();
        assert!(delhi.contains("DL001"));
        assert!(!delhi.contains("MH001"));
        assert_eq!(delhi.to_string(), "Delhi (DL)");
        assert!(Region::from_code("XX").is_none());
    }
}
