//! Region and district lookup table

use serde::Serialize;

/// A region and the districts offered for live lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub name: &'static str,
    pub districts: &'static [&'static str],
}

/// Immutable region table shared by every request
#[derive(Debug, Clone, Copy)]
pub struct RegionTable {
    regions: &'static [Region],
}

static MAHARASHTRA: [Region; 5] = [
    Region {
        name: "Vidarbha",
        districts: &["Nagpur", "Amravati", "Chandrapur", "Yavatmal", "Akola"],
    },
    Region {
        name: "Marathwada",
        districts: &["Aurangabad", "Beed", "Latur", "Nanded", "Parbhani"],
    },
    Region {
        name: "Western Maharashtra",
        districts: &["Pune", "Kolhapur", "Sangli", "Satara"],
    },
    Region {
        name: "Konkan",
        districts: &["Mumbai", "Thane", "Raigad", "Ratnagiri"],
    },
    Region {
        name: "Northern Maharashtra",
        districts: &["Nashik", "Dhule", "Jalgaon"],
    },
];

impl Default for RegionTable {
    fn default() -> Self {
        Self::maharashtra()
    }
}

impl RegionTable {
    #[must_use]
    pub const fn maharashtra() -> Self {
        Self {
            regions: &MAHARASHTRA,
        }
    }

    /// All regions in display order
    #[must_use]
    pub fn regions(&self) -> &'static [Region] {
        self.regions
    }

    #[must_use]
    pub fn region(&self, name: &str) -> Option<&'static Region> {
        let name = name.trim();
        self.regions
            .iter()
            .find(|region| region.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn districts(&self, region: &str) -> Option<&'static [&'static str]> {
        self.region(region).map(|region| region.districts)
    }

    /// Canonical district name if `district` belongs to `region`
    #[must_use]
    pub fn find_district(&self, region: &str, district: &str) -> Option<&'static str> {
        let district = district.trim();
        self.districts(region)?
            .iter()
            .copied()
            .find(|candidate| candidate.eq_ignore_ascii_case(district))
    }

    /// Region containing `district`, with the district's canonical name
    #[must_use]
    pub fn region_of(&self, district: &str) -> Option<(&'static Region, &'static str)> {
        let district = district.trim();
        self.regions.iter().find_map(|region| {
            region
                .districts
                .iter()
                .copied()
                .find(|candidate| candidate.eq_ignore_ascii_case(district))
                .map(|canonical| (region, canonical))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_order() {
        let names: Vec<_> = RegionTable::maharashtra()
            .regions()
            .iter()
            .map(|region| region.name)
            .collect();
        assert_eq!(
            names,
            [
                "Vidarbha",
                "Marathwada",
                "Western Maharashtra",
                "Konkan",
                "Northern Maharashtra"
            ]
        );
    }

    #[test]
    fn test_find_district_is_case_insensitive() {
        let table = RegionTable::default();
        assert_eq!(table.find_district("konkan", " thane "), Some("Thane"));
        assert_eq!(table.find_district("Konkan", "Pune"), None);
        assert_eq!(table.find_district("Atlantis", "Pune"), None);
    }

    #[test]
    fn test_region_of() {
        let table = RegionTable::default();
        let (region, district) = table.region_of("nashik").unwrap();
        assert_eq!(region.name, "Northern Maharashtra");
        assert_eq!(district, "Nashik");
        assert!(table.region_of("Nonexistentville").is_none());
    }

    #[test]
    fn test_district_counts() {
        let table = RegionTable::default();
        assert_eq!(table.districts("Vidarbha").map(<[_]>::len), Some(5));
        assert_eq!(table.districts("Northern Maharashtra").map(<[_]>::len), Some(3));
    }
}
