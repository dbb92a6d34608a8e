//! summary — frame-level counters and the on-screen summary text
//!
//! Zone occupancy, line-crossing totals and overcrowding flags come from the
//! upstream zone analytics; the alert count comes from the compliance pass.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedFlag {
    pub name: String,
    pub status: bool,
}

/// Per-frame zone analytics, each list in the order the analytics supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameZoneStats {
    pub zone_counts: Vec<NamedCount>,
    pub line_totals: Vec<NamedCount>,
    pub overcrowding: Vec<NamedFlag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub person_count: usize,
    pub alert_count: usize,
    pub text: String,
}

impl FrameSummary {
    pub fn build(person_count: usize, alert_count: usize, stats: Option<&FrameZoneStats>) -> Self {
        let mut text = format!("People Current Frame: {person_count}\n");
        if let Some(stats) = stats {
            for zone in &stats.zone_counts {
                text.push_str(&format!("People in {}: {}\n", zone.name, zone.count));
            }
            for line in &stats.line_totals {
                text.push_str(&format!("{} Total: {}\n", line.name, line.count));
            }
            for zone in &stats.overcrowding {
                let status = if zone.status { "Yes" } else { "No" };
                text.push_str(&format!("Overcrowding in {}: {}\n", zone.name, status));
            }
        }
        text.push_str(&format!("Security alerts: {alert_count}"));

        Self {
            person_count,
            alert_count,
            text,
        }
    }
}
