//! Domain records for the internship catalog.

use serde::{Deserialize, Deserializer, Serialize};

/// How an internship is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
  Remote,
  Onsite,
  Hybrid,
}

impl std::fmt::Display for WorkMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let label = match self {
      WorkMode::Remote => "remote",
      WorkMode::Onsite => "onsite",
      WorkMode::Hybrid => "hybrid",
    };
    write!(f, "{}", label)
  }
}

/// A single internship listing. Field names on the wire are camelCase,
/// matching the catalog API payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Internship {
  pub id: String,
  pub title: String,
  pub organization: String,
  pub location: String,
  pub sector: String,
  pub stipend: String,
  pub duration: String,
  pub description: String,
  pub requirements: Vec<String>,
  pub application_deadline: String,
  #[serde(rename = "type")]
  pub mode: WorkMode,
  #[serde(default, deserialize_with = "lenient_skills")]
  pub skills: Vec<String>,
}

/// Profile a user enters once at signup; read by the recommendation filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  #[serde(default, deserialize_with = "lenient_skills")]
  pub skills: Vec<String>,
  #[serde(default)]
  pub location: String,
  #[serde(default)]
  pub sector: String,
  #[serde(default)]
  pub education: String,
}

/// Accept a sequence of strings, or a single comma-separated string (the
/// signup form historically persisted skills that way). Anything else
/// collapses to the empty list rather than failing the whole record.
fn lenient_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = serde_json::Value::deserialize(deserializer)?;
  Ok(match value {
    serde_json::Value::Array(items) => items
      .iter()
      .filter_map(|item| item.as_str())
      .map(str::to_string)
      .collect(),
    serde_json::Value::String(s) => s
      .split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_string)
      .collect(),
    _ => Vec::new(),
  })
}
