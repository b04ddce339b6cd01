use std::fmt;
use std::str::FromStr;

use crate::error::ManifestError;

/// Ordered list of manifest locations, as written in a page attribute or on
/// the command line (`a.json, b.json`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestList(Vec<String>);

impl ManifestList {
    /// Splits on commas and trims every entry. Blank entries are dropped;
    /// a list with no entries left is an error.
    pub fn parse(raw: &str) -> Result<Self, ManifestError> {
        let entries: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        if entries.is_empty() {
            return Err(ManifestError::NoManifests);
        }

        Ok(Self(entries))
    }

    /// Takes already separated locations as they are, apart from trimming.
    /// Commas inside an entry are kept; a blank entry is an error.
    pub fn from_locations<I, S>(locations: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = locations
            .into_iter()
            .enumerate()
            .map(|(index, location)| match location.as_ref().trim() {
                "" => Err(ManifestError::BlankLocation { index }),
                trimmed => Ok(trimmed.to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if entries.is_empty() {
            return Err(ManifestError::NoManifests);
        }

        Ok(Self(entries))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl FromStr for ManifestList {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ManifestList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_order() {
        let list = ManifestList::parse(" /models/a.json ,/models/b.json").unwrap();
        assert_eq!(list.as_slice(), ["/models/a.json", "/models/b.json"]);
    }

    #[test]
    fn drops_blank_entries() {
        let list: ManifestList = "a.json,, b.json,".parse().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.to_string(), "a.json,b.json");
    }

    #[test]
    fn empty_attribute_is_an_error() {
        assert!(matches!(
            ManifestList::parse("  , "),
            Err(ManifestError::NoManifests)
        ));
        assert!(ManifestList::from_locations(Vec::<String>::new()).is_err());
    }

    #[test]
    fn locations_keep_embedded_commas() {
        let list =
            ManifestList::from_locations([" /api/scene.json?ids=1,2 ", "/models/b.json"]).unwrap();
        assert_eq!(list.as_slice(), ["/api/scene.json?ids=1,2", "/models/b.json"]);
    }

    #[test]
    fn blank_location_is_reported() {
        assert!(matches!(
            ManifestList::from_locations(["/models/a.json", "  "]),
            Err(ManifestError::BlankLocation { index: 1 })
        ));
    }
}
