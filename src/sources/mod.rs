//! Source records as served by the backend
//!
//! A page of sources is fetched, rendered and replaced wholesale on the next
//! fetch; nothing here is persisted locally.

pub mod actions;
pub mod filter;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::datetime::parse_timestamp;

pub use actions::{SaveRequestDecision, SortOrder, SortSpec, SourceQuery};
pub use filter::{ConeSearch, FilterForm, FilterSet};
pub use store::SourceStore;

/// Group a classification is visible to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default)]
    pub id: i64,
    pub classification: String,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
}

impl Classification {
    pub fn visible_to(&self, group_id: i64) -> bool {
        self.groups.iter().any(|g| g.id == group_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub attachment_name: Option<String>,
}

impl Comment {
    pub fn attachment_url(&self) -> Option<String> {
        self.attachment_name
            .as_ref()
            .map(|_| format!("/api/comment/{}/attachment", self.id))
    }
}

/// A source's membership in one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub saved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub ra: f64,
    pub dec: f64,
    #[serde(default)]
    pub redshift: Option<f64>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub alias: Vec<String>,
    #[serde(default)]
    pub classifications: Vec<Classification>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub groups: Vec<SourceGroup>,
    #[serde(default)]
    pub photometry_exists: bool,
    #[serde(default)]
    pub spectrum_exists: bool,
    #[serde(default)]
    pub peak_detected_mag: Option<f64>,
    #[serde(default)]
    pub peak_detected_at: Option<String>,
    #[serde(default)]
    pub last_detected_mag: Option<f64>,
    #[serde(default)]
    pub last_detected_at: Option<String>,
    #[serde(default)]
    pub tns_name: Option<String>,
}

fn nullable_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Source {
    pub fn url(&self) -> String {
        format!("/source/{}", self.id)
    }

    pub fn finder_url(&self) -> String {
        format!("/api/sources/{}/finder", self.id)
    }

    pub fn photometry_url(&self) -> String {
        format!("/api/sources/{}/photometry", self.id)
    }

    pub fn spectra_url(&self) -> String {
        format!("/api/sources/{}/spectra?normalization=median", self.id)
    }

    /// When the source was saved: to `group_id` if given, otherwise the most
    /// recent save across all groups
    pub fn saved_at(&self, group_id: Option<i64>) -> Option<DateTime<Utc>> {
        self.groups
            .iter()
            .filter(|g| group_id.map_or(true, |id| g.id == id))
            .filter_map(|g| g.saved_at.as_deref().and_then(parse_timestamp))
            .max()
    }

    /// Highest-probability classification, newest first on ties.
    ///
    /// With `group_id`, only classifications visible to that group count.
    pub fn best_classification(&self, group_id: Option<i64>) -> Option<&Classification> {
        self.classifications
            .iter()
            .filter(|c| group_id.map_or(true, |id| c.visible_to(id)))
            .max_by(|a, b| {
                let pa = a.probability.unwrap_or(0.0);
                let pb = b.probability.unwrap_or(0.0);
                pa.total_cmp(&pb).then_with(|| {
                    let ta = parse_timestamp(&a.created_at);
                    let tb = parse_timestamp(&b.created_at);
                    ta.cmp(&tb)
                })
            })
    }
}

/// One page of a sources listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesPage {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default = "first_page")]
    pub page_number: u32,
    #[serde(default)]
    pub total_matches: u64,
    #[serde(default)]
    pub num_per_page: Option<u32>,
}

fn first_page() -> u32 {
    crate::constants::FIRST_PAGE
}
