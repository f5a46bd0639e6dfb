use serde::Deserialize;

/// Requested flavor of generated analysis. Unknown values fall back to
/// `General` rather than rejecting the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Trends,
    Anomalies,
    #[default]
    #[serde(other)]
    General,
}
