//! Source filter form, its normalized query form, and filter chips
//!
//! The form is what the user edits. [`normalize_filter_form`] turns it into a
//! flat [`FilterSet`] of backend query parameters. Chips are the
//! human-readable labels shown above the table; [`remove_chip`] parses a
//! label back into the filter keys it stands for.
//!
//! The chip round trip goes through display strings and is lossy: a value
//! that itself contains `", "` or `" ("` will not parse back cleanly.

use std::collections::BTreeMap;

/// Flat filter parameters, keyed by backend query parameter name
pub type FilterSet = BTreeMap<String, String>;

pub const KEY_SOURCE_ID: &str = "sourceID";
pub const KEY_RA: &str = "ra";
pub const KEY_DEC: &str = "dec";
pub const KEY_RADIUS: &str = "radius";
pub const KEY_START_DATE: &str = "startDate";
pub const KEY_END_DATE: &str = "endDate";
pub const KEY_SIMBAD_CLASS: &str = "simbadClass";
pub const KEY_MIN_REDSHIFT: &str = "minRedshift";
pub const KEY_MAX_REDSHIFT: &str = "maxRedshift";
pub const KEY_HAS_TNS_NAME: &str = "hasTNSname";

const POSITION_LABEL: &str = "Position";

/// Display labels for the non-positional filter keys
const CHIP_LABELS: [(&str, &str); 7] = [
    (KEY_SOURCE_ID, "Source ID"),
    (KEY_START_DATE, "Start Date"),
    (KEY_END_DATE, "End Date"),
    (KEY_SIMBAD_CLASS, "Simbad Class"),
    (KEY_MIN_REDSHIFT, "Min Redshift"),
    (KEY_MAX_REDSHIFT, "Max Redshift"),
    (KEY_HAS_TNS_NAME, "Has TNS Name"),
];

/// Position plus radius, all as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConeSearch {
    pub ra: String,
    pub dec: String,
    pub radius: String,
}

impl ConeSearch {
    fn trimmed(&self) -> Self {
        Self {
            ra: self.ra.trim().to_string(),
            dec: self.dec.trim().to_string(),
            radius: self.radius.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ra.trim().is_empty() && self.dec.trim().is_empty() && self.radius.trim().is_empty()
    }
}

/// Raw filter form data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    pub source_id: String,
    pub position: Option<ConeSearch>,
    pub start_date: String,
    pub end_date: String,
    pub simbad_class: String,
    pub min_redshift: String,
    pub max_redshift: String,
    pub has_tns_name: bool,
}

impl FilterForm {
    /// Rebuild form data from an applied filter set
    pub fn from_filter_set(filters: &FilterSet) -> Self {
        let get = |key: &str| filters.get(key).cloned().unwrap_or_default();

        let position = ConeSearch {
            ra: get(KEY_RA),
            dec: get(KEY_DEC),
            radius: get(KEY_RADIUS),
        };

        Self {
            source_id: get(KEY_SOURCE_ID),
            position: (!position.is_empty()).then_some(position),
            start_date: get(KEY_START_DATE),
            end_date: get(KEY_END_DATE),
            simbad_class: get(KEY_SIMBAD_CLASS),
            min_redshift: get(KEY_MIN_REDSHIFT),
            max_redshift: get(KEY_MAX_REDSHIFT),
            has_tns_name: filters.get(KEY_HAS_TNS_NAME).is_some_and(|v| v == "true"),
        }
    }
}

/// Normalize form data into backend filter parameters.
///
/// The cone search is trimmed and dropped when all three fields are empty;
/// otherwise its fields become top-level `ra`, `dec`, `radius` keys. Any key
/// whose value ends up empty is left out.
pub fn normalize_filter_form(form: &FilterForm) -> FilterSet {
    let mut entries: Vec<(&str, String)> = vec![
        (KEY_SOURCE_ID, form.source_id.clone()),
        (KEY_START_DATE, form.start_date.clone()),
        (KEY_END_DATE, form.end_date.clone()),
        (KEY_SIMBAD_CLASS, form.simbad_class.clone()),
        (KEY_MIN_REDSHIFT, form.min_redshift.clone()),
        (KEY_MAX_REDSHIFT, form.max_redshift.clone()),
        (
            KEY_HAS_TNS_NAME,
            if form.has_tns_name { "true".to_string() } else { String::new() },
        ),
    ];

    if let Some(cone) = form.position.as_ref().filter(|c| !c.is_empty()) {
        let cone = cone.trimmed();
        entries.push((KEY_RA, cone.ra));
        entries.push((KEY_DEC, cone.dec));
        entries.push((KEY_RADIUS, cone.radius));
    }

    entries
        .into_iter()
        .map(|(key, value)| (key, value.trim().to_string()))
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn chip_label(key: &str) -> Option<&'static str> {
    CHIP_LABELS.iter().find(|(k, _)| *k == key).map(|(_, label)| *label)
}

fn chip_key(label: &str) -> Option<&'static str> {
    CHIP_LABELS.iter().find(|(_, l)| *l == label).map(|(key, _)| *key)
}

/// Human-readable chips for an applied filter set, position first
pub fn filter_chips(filters: &FilterSet) -> Vec<String> {
    let mut chips = Vec::new();

    let parts: Vec<String> = [(KEY_RA, "RA"), (KEY_DEC, "Dec"), (KEY_RADIUS, "Radius")]
        .iter()
        .filter_map(|(key, name)| filters.get(*key).map(|v| format!("{} ({})", v, name)))
        .collect();
    if !parts.is_empty() {
        chips.push(format!("{}: {}", POSITION_LABEL, parts.join(", ")));
    }

    for (key, value) in filters {
        if let Some(label) = chip_label(key) {
            chips.push(format!("{}: {}", label, value));
        }
    }

    chips
}

/// Parse a chip label back into the filter entries it displays.
///
/// Returns `None` for labels that are not recognizable chips.
pub fn parse_chip(label: &str) -> Option<FilterSet> {
    let (name, value) = label.split_once(": ")?;
    let mut parsed = FilterSet::new();

    if name == POSITION_LABEL {
        for part in value.split(", ") {
            let (part_value, part_name) = part.rsplit_once(" (")?;
            let key = match part_name.strip_suffix(')')? {
                "RA" => KEY_RA,
                "Dec" => KEY_DEC,
                "Radius" => KEY_RADIUS,
                _ => return None,
            };
            parsed.insert(key.to_string(), part_value.to_string());
        }
    } else {
        parsed.insert(chip_key(name)?.to_string(), value.to_string());
    }

    Some(parsed)
}

/// Filter set with the entries behind `label` removed.
///
/// Removing the position chip always drops the whole cone search. An
/// unparsable label leaves the filters unchanged.
pub fn remove_chip(label: &str, filters: &FilterSet) -> FilterSet {
    let mut remaining = filters.clone();

    let Some(parsed) = parse_chip(label) else {
        log::warn!("Filter chip '{}' could not be parsed, keeping filters", label);
        return remaining;
    };

    if parsed.keys().any(|k| k == KEY_RA || k == KEY_DEC || k == KEY_RADIUS) {
        for key in [KEY_RA, KEY_DEC, KEY_RADIUS] {
            remaining.remove(key);
        }
    } else {
        for key in parsed.keys() {
            remaining.remove(key);
        }
    }

    remaining
}
