//! Catalog filtering and personalized recommendations.

use super::types::{Internship, UserProfile};

/// Upper bound on returned recommendations.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Wildcard value the location and sector pickers send for "no filter".
const ALL: &str = "all";

/// Optional constraints applied to the catalog in a single pass.
/// Constraints are AND-combined; an unset constraint always matches.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
  /// Case-insensitive substring match against the listing location
  pub location: Option<String>,
  /// Case-insensitive exact match against the listing sector
  pub sector: Option<String>,
  /// Keep listings where at least one wanted skill is a case-insensitive
  /// substring of at least one listing skill
  pub skills: Vec<String>,
}

impl FilterCriteria {
  pub fn matches(&self, internship: &Internship) -> bool {
    let location_ok = match self.location.as_deref() {
      None => true,
      Some(ALL) => true,
      Some(wanted) => internship
        .location
        .to_lowercase()
        .contains(&wanted.to_lowercase()),
    };

    let sector_ok = match self.sector.as_deref() {
      None => true,
      Some(ALL) => true,
      Some(wanted) => internship.sector.to_lowercase() == wanted.to_lowercase(),
    };

    let skills_ok = self.skills.is_empty()
      || self.skills.iter().any(|wanted| {
        let wanted = wanted.to_lowercase();
        internship
          .skills
          .iter()
          .any(|have| have.to_lowercase().contains(&wanted))
      });

    location_ok && sector_ok && skills_ok
  }

  fn apply(&self, items: &[Internship]) -> Vec<Internship> {
    items
      .iter()
      .filter(|internship| self.matches(internship))
      .cloned()
      .collect()
  }
}

/// Narrow `items` by optional location, sector, and skill criteria.
/// Pure and order-preserving: the result keeps the input order.
pub fn filter_internships(
  items: &[Internship],
  location: Option<&str>,
  sector: Option<&str>,
  skills: &[String],
) -> Vec<Internship> {
  FilterCriteria {
    location: location.map(str::to_string),
    sector: sector.map(str::to_string),
    skills: skills.to_vec(),
  }
  .apply(items)
}

/// Filter passes tried in order until one yields matches: the full
/// preference match first, then skills alone.
fn recommendation_passes(profile: &UserProfile) -> [FilterCriteria; 2] {
  [
    FilterCriteria {
      location: non_empty(&profile.location),
      sector: non_empty(&profile.sector),
      skills: profile.skills.clone(),
    },
    FilterCriteria {
      location: None,
      sector: None,
      skills: profile.skills.clone(),
    },
  ]
}

fn non_empty(value: &str) -> Option<String> {
  if value.is_empty() {
    None
  } else {
    Some(value.to_string())
  }
}

/// Personalized recommendations for a profile: up to
/// [`MAX_RECOMMENDATIONS`] listings from the first pass that matches
/// anything, in catalog order. No scoring or ranking.
pub fn recommend(items: &[Internship], profile: &UserProfile) -> Vec<Internship> {
  for criteria in recommendation_passes(profile) {
    let mut matches = criteria.apply(items);
    if !matches.is_empty() {
      matches.truncate(MAX_RECOMMENDATIONS);
      return matches;
    }
  }
  Vec::new()
}
