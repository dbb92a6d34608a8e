//! zones — restricted-zone membership
//!
//! Zone geometry is resolved upstream; each object arrives tagged with the
//! names of the zones it overlaps.  This filter only interprets those tags.

/// Zone name the upstream analytics config uses for the monitored area.
pub const DEFAULT_RESTRICTED_ZONE: &str = "Restricted Area";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedZones {
    names: Vec<String>,
}

impl RestrictedZones {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True iff `membership` names at least one restricted zone.
    pub fn contains(&self, membership: &[String]) -> bool {
        membership
            .iter()
            .any(|zone| self.names.iter().any(|name| name == zone))
    }
}

impl Default for RestrictedZones {
    fn default() -> Self {
        Self::new([DEFAULT_RESTRICTED_ZONE])
    }
}
