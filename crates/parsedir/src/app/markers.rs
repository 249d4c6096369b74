//! Range marker detection in template paths.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::RangeMarker;

/// An opening `{% for <binding> in <collection> %}` tag. The collection expression may not
/// contain whitespace; anything else is left in the path as literal template text.
static RANGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{%-?\s*for\s+[^%]+?\s+in\s+[^\s%]+\s*-?%\}").expect("valid range marker regex")
});

/// Markers found in a path together with the path stripped of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkerScan {
    /// Markers in order of first occurrence.
    pub markers: Vec<RangeMarker>,
    /// The path with every marker removed.
    pub bare_path: String,
}

impl MarkerScan {
    pub fn is_ranged(&self) -> bool {
        !self.markers.is_empty()
    }
}

/// Extract every range marker from `path` without evaluating anything.
pub fn detect_markers(path: &str) -> MarkerScan {
    let markers = RANGE_MARKER
        .find_iter(path)
        .map(|found| RangeMarker::new(found.as_str()))
        .collect();
    let bare_path = RANGE_MARKER.replace_all(path, "").into_owned();
    MarkerScan { markers, bare_path }
}
