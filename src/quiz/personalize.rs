use crate::quiz::bank::TestVersion;

/// What ZIP-lookup payloads print instead of a name when the address couldn't
/// be matched to a congressional district.
const UNRESOLVED_MARKER: &str = "house.gov";

/// The user's representative, as an explicit resolved/unresolved value instead
/// of a magic placeholder string.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Representative {
    Resolved(String),
    Unresolved,
}

impl Representative {
    /// External lookup payloads signal "couldn't resolve the district" with a
    /// "Visit house.gov ..." message where the name should be. This is the one
    /// place that text is recognized; everything downstream matches on the
    /// variant.
    pub fn from_lookup(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.contains(UNRESOLVED_MARKER) {
            return Representative::Unresolved;
        }
        Representative::Resolved(raw.to_string())
    }
}

/// The user's own civic data, built once per session (from their input or an
/// external ZIP lookup) and never mutated by the preparer.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PersonalizationContext {
    pub senators: Vec<String>,
    pub representative: Option<Representative>,
    pub governor: Option<String>,
    pub capital: Option<String>,
}

impl PersonalizationContext {
    /// The substitute candidate set for a personalizable question, or `None`
    /// when we don't actually know the user's answer (field missing, empty or
    /// unresolved) and the generic answers should be kept.
    pub fn answers_for(&self, kind: PersonalKind) -> Option<Vec<String>> {
        match kind {
            PersonalKind::Senators => {
                if self.senators.is_empty() {
                    None
                } else {
                    Some(self.senators.clone())
                }
            }
            PersonalKind::Representative => match &self.representative {
                Some(Representative::Resolved(name)) => Some(vec![name.clone()]),
                _ => None,
            },
            PersonalKind::Governor => self.governor.clone().map(|name| vec![name]),
            PersonalKind::Capital => self.capital.clone().map(|name| vec![name]),
        }
    }
}

/// Which context field a personalizable question asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalKind {
    Senators,
    Representative,
    Governor,
    Capital,
}

/// The fixed set of personalizable question ids. These come in pairs because
/// the two test versions number the same semantic question differently.
pub fn personal_kind(version: TestVersion, id: u32) -> Option<PersonalKind> {
    match (version, id) {
        (TestVersion::V2008, 20) | (TestVersion::V2025, 28) => Some(PersonalKind::Senators),
        (TestVersion::V2008, 23) | (TestVersion::V2025, 31) => Some(PersonalKind::Representative),
        (TestVersion::V2008, 43) | (TestVersion::V2025, 55) => Some(PersonalKind::Governor),
        (TestVersion::V2008, 44) | (TestVersion::V2025, 56) => Some(PersonalKind::Capital),
        _ => None,
    }
}
