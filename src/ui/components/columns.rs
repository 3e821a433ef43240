//! Source table columns and their cell renderers
//!
//! Rendering is a pure mapping from a [`Source`] and a [`RenderContext`] to a
//! [`CellValue`]. The table widget only decides how a `CellValue` looks.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::constants::{GLYPH_EXISTS, GLYPH_FAVORITE, GLYPH_FINDER, GLYPH_MISSING, GLYPH_NOT_FAVORITE};
use crate::sources::Source;
use crate::utils::coords::{format_dec, format_ra, CoordinateFormat};
use crate::utils::datetime::{describe_timestamp, format_absolute, format_relative, parse_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnId {
    Favorite,
    SourceId,
    Ra,
    Dec,
    Redshift,
    Classification,
    Groups,
    SavedAt,
    Finder,
    Photometry,
    Spectrum,
    PeakMag,
    LatestMag,
    LastDetected,
    TnsName,
    Alias,
    Origin,
}

impl ColumnId {
    pub const ALL: [ColumnId; 17] = [
        Self::Favorite,
        Self::SourceId,
        Self::Ra,
        Self::Dec,
        Self::Redshift,
        Self::Classification,
        Self::Groups,
        Self::SavedAt,
        Self::Finder,
        Self::Photometry,
        Self::Spectrum,
        Self::PeakMag,
        Self::LatestMag,
        Self::LastDetected,
        Self::TnsName,
        Self::Alias,
        Self::Origin,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Favorite => "",
            Self::SourceId => "Source ID",
            Self::Ra => "RA",
            Self::Dec => "Dec",
            Self::Redshift => "Redshift",
            Self::Classification => "Classification",
            Self::Groups => "Groups",
            Self::SavedAt => "Date Saved",
            Self::Finder => "Finder",
            Self::Photometry => "Phot",
            Self::Spectrum => "Spec",
            Self::PeakMag => "Peak Mag",
            Self::LatestMag => "Latest Mag",
            Self::LastDetected => "Last Detected",
            Self::TnsName => "TNS Name",
            Self::Alias => "Alias",
            Self::Origin => "Origin",
        }
    }

    /// Name used in the configuration file
    pub fn config_name(&self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::SourceId => "source_id",
            Self::Ra => "ra",
            Self::Dec => "dec",
            Self::Redshift => "redshift",
            Self::Classification => "classification",
            Self::Groups => "groups",
            Self::SavedAt => "saved_at",
            Self::Finder => "finder",
            Self::Photometry => "photometry",
            Self::Spectrum => "spectrum",
            Self::PeakMag => "peak_mag",
            Self::LatestMag => "latest_mag",
            Self::LastDetected => "last_detected",
            Self::TnsName => "tns_name",
            Self::Alias => "alias",
            Self::Origin => "origin",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.config_name() == name)
    }

    /// Backend field the column sorts on, if it is sortable
    pub fn sort_field(&self) -> Option<&'static str> {
        match self {
            Self::SourceId => Some("id"),
            Self::Ra => Some("ra"),
            Self::Dec => Some("dec"),
            Self::Redshift => Some("redshift"),
            Self::SavedAt => Some("saved_at"),
            Self::Classification => Some("classification"),
            Self::Alias => Some("alias"),
            Self::Origin => Some("origin"),
            _ => None,
        }
    }

    pub fn sortable(&self) -> bool {
        self.sort_field().is_some()
    }

    /// Whether the filter form has a field for this column
    pub fn filterable(&self) -> bool {
        matches!(
            self,
            Self::SourceId | Self::Ra | Self::Dec | Self::Redshift | Self::Classification | Self::SavedAt | Self::TnsName
        )
    }

    pub fn default_visible(&self) -> bool {
        !matches!(self, Self::Alias | Self::Origin | Self::Finder)
    }

    /// Preferred column width in terminal cells
    pub fn width(&self) -> u16 {
        match self {
            Self::Favorite => 1,
            Self::SourceId => 14,
            Self::Ra => 11,
            Self::Dec => 11,
            Self::Redshift => 8,
            Self::Classification => 16,
            Self::Groups => 18,
            Self::SavedAt => 16,
            Self::Finder => 6,
            Self::Photometry | Self::Spectrum => 4,
            Self::PeakMag | Self::LatestMag => 10,
            Self::LastDetected => 14,
            Self::TnsName => 12,
            Self::Alias => 14,
            Self::Origin => 10,
        }
    }
}

/// Everything besides the record itself that a cell depends on
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub active_group: Option<i64>,
    pub classifications_in_group_only: bool,
    pub coordinate_format: CoordinateFormat,
    pub favorites: &'a BTreeSet<String>,
    pub date_format: &'a str,
    pub time_format: &'a str,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Strong,
    Muted,
    Link,
}

/// Presentational value of one cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellValue {
    pub text: String,
    pub links: Vec<String>,
    pub tooltip: Option<String>,
    pub emphasis: Emphasis,
}

impl CellValue {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn muted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Muted,
            ..Default::default()
        }
    }

    fn link(text: impl Into<String>, target: String) -> Self {
        Self {
            text: text.into(),
            links: vec![target],
            emphasis: Emphasis::Link,
            ..Default::default()
        }
    }

    fn with_tooltip(mut self, tooltip: Option<String>) -> Self {
        self.tooltip = tooltip;
        self
    }
}

pub fn render_cell(column: ColumnId, source: &Source, ctx: &RenderContext<'_>) -> CellValue {
    match column {
        ColumnId::Favorite => {
            if ctx.favorites.contains(&source.id) {
                CellValue {
                    text: GLYPH_FAVORITE.to_string(),
                    emphasis: Emphasis::Strong,
                    ..Default::default()
                }
            } else {
                CellValue::muted(GLYPH_NOT_FAVORITE)
            }
        }
        ColumnId::SourceId => CellValue::link(source.id.clone(), source.url()),
        ColumnId::Ra => CellValue::text(format_ra(source.ra, ctx.coordinate_format)),
        ColumnId::Dec => CellValue::text(format_dec(source.dec, ctx.coordinate_format)),
        ColumnId::Redshift => match source.redshift {
            Some(z) => CellValue::text(z.to_string()),
            None => CellValue::default(),
        },
        ColumnId::Classification => render_classification(source, ctx),
        ColumnId::Groups => CellValue {
            text: source.groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>().join(", "),
            links: source.groups.iter().map(|g| format!("/group/{}", g.id)).collect(),
            ..Default::default()
        },
        ColumnId::SavedAt => match source.saved_at(ctx.active_group) {
            Some(saved) => CellValue::text(format_absolute(&saved, ctx.date_format, ctx.time_format))
                .with_tooltip(Some(format_relative(&saved, &ctx.now))),
            None => CellValue::default(),
        },
        ColumnId::Finder => CellValue::link(GLYPH_FINDER, source.finder_url()),
        ColumnId::Photometry => existence_cell(source.photometry_exists, source.photometry_url()),
        ColumnId::Spectrum => existence_cell(source.spectrum_exists, source.spectra_url()),
        ColumnId::PeakMag => magnitude_cell(source.peak_detected_mag, source.peak_detected_at.as_deref(), ctx),
        ColumnId::LatestMag => magnitude_cell(source.last_detected_mag, source.last_detected_at.as_deref(), ctx),
        ColumnId::LastDetected => match source.last_detected_at.as_deref() {
            Some(at) => CellValue::text(describe_timestamp(at, &ctx.now)).with_tooltip(Some(at.to_string())),
            None => CellValue::default(),
        },
        ColumnId::TnsName => match &source.tns_name {
            Some(name) => CellValue::link(name.clone(), format!("https://www.wis-tns.org/object/{}", name)),
            None => CellValue::default(),
        },
        ColumnId::Alias => CellValue::text(source.alias.join(", ")),
        ColumnId::Origin => CellValue::text(source.origin.clone().unwrap_or_default()),
    }
}

fn render_classification(source: &Source, ctx: &RenderContext<'_>) -> CellValue {
    let group = if ctx.classifications_in_group_only {
        ctx.active_group
    } else {
        None
    };

    match source.best_classification(group) {
        Some(c) => {
            let tooltip = match c.probability {
                Some(p) => format!("P={:.2} by {}", p, c.author_name),
                None => format!("by {}", c.author_name),
            };
            CellValue::text(c.classification.clone()).with_tooltip(Some(tooltip))
        }
        None => CellValue::default(),
    }
}

fn existence_cell(exists: bool, url: String) -> CellValue {
    if exists {
        CellValue::link(GLYPH_EXISTS, url)
    } else {
        CellValue::muted(GLYPH_MISSING)
    }
}

fn magnitude_cell(mag: Option<f64>, at: Option<&str>, ctx: &RenderContext<'_>) -> CellValue {
    match mag {
        Some(m) => {
            let tooltip = at.map(|ts| describe_timestamp(ts, &ctx.now));
            CellValue::text(format!("{:.2}", m)).with_tooltip(tooltip)
        }
        None => CellValue::muted(GLYPH_MISSING),
    }
}

/// One line of the expanded detail row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub heading: Option<String>,
    pub text: String,
    pub link: Option<String>,
}

impl DetailLine {
    fn heading(title: &str) -> Self {
        Self {
            heading: Some(title.to_string()),
            text: String::new(),
            link: None,
        }
    }

    fn item(text: String, link: Option<String>) -> Self {
        Self {
            heading: None,
            text,
            link,
        }
    }
}

/// Detail lines for an expanded row: groups, classifications and comments
pub fn render_details(source: &Source, ctx: &RenderContext<'_>) -> Vec<DetailLine> {
    let mut lines = Vec::new();

    lines.push(DetailLine::heading("Groups"));
    for group in &source.groups {
        let saved = group
            .saved_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|dt| format!(" (saved {})", format_relative(&dt, &ctx.now)))
            .unwrap_or_default();
        lines.push(DetailLine::item(
            format!("{}{}", group.name, saved),
            Some(format!("/group/{}", group.id)),
        ));
    }

    if !source.classifications.is_empty() {
        lines.push(DetailLine::heading("Classifications"));
        for c in &source.classifications {
            let probability = c.probability.map(|p| format!(" P={:.2}", p)).unwrap_or_default();
            lines.push(DetailLine::item(
                format!("{}{} by {}", c.classification, probability, c.author_name),
                None,
            ));
        }
    }

    if !source.comments.is_empty() {
        lines.push(DetailLine::heading("Comments"));
        for comment in &source.comments {
            let when = describe_timestamp(&comment.created_at, &ctx.now);
            let attachment = comment
                .attachment_name
                .as_ref()
                .map(|name| format!(" [{}]", name))
                .unwrap_or_default();
            lines.push(DetailLine::item(
                format!("{} ({}): {}{}", comment.author_name, when, comment.text, attachment),
                comment.attachment_url(),
            ));
        }
    }

    lines.push(DetailLine::heading("Links"));
    lines.push(DetailLine::item("Source page".to_string(), Some(source.url())));
    lines.push(DetailLine::item("Finding chart".to_string(), Some(source.finder_url())));
    if source.photometry_exists {
        lines.push(DetailLine::item("Photometry".to_string(), Some(source.photometry_url())));
    }
    if source.spectrum_exists {
        lines.push(DetailLine::item("Spectra".to_string(), Some(source.spectra_url())));
    }

    lines
}
