//! Static offline catalog served when both network and cache miss.

use crate::cache::{FallbackProvider, Response};

use super::types::{Internship, WorkMode};

/// Fallback provider backed by a fixed set of representative listings.
///
/// The payload is independent of request parameters and is never filtered
/// here; narrowing is the caller's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCatalog;

impl FallbackProvider for OfflineCatalog {
  fn fallback(&self) -> Response {
    Response::json(&offline_internships())
  }
}

/// The bundled listings available without network or cache.
pub fn offline_internships() -> Vec<Internship> {
  vec![
    Internship {
      id: "1".to_string(),
      title: "Digital India Web Development Intern".to_string(),
      organization: "Ministry of Electronics & IT".to_string(),
      location: "New Delhi".to_string(),
      sector: "Technology".to_string(),
      stipend: "₹15,000/month".to_string(),
      duration: "3 months".to_string(),
      description: "Work on government digital transformation projects and web applications."
        .to_string(),
      requirements: vec![
        "HTML/CSS".to_string(),
        "JavaScript".to_string(),
        "React".to_string(),
        "Basic programming".to_string(),
      ],
      application_deadline: "2024-01-15".to_string(),
      mode: WorkMode::Hybrid,
      skills: vec![
        "HTML".to_string(),
        "CSS".to_string(),
        "JavaScript".to_string(),
        "React".to_string(),
      ],
    },
    Internship {
      id: "2".to_string(),
      title: "Rural Development Research Intern".to_string(),
      organization: "Ministry of Rural Development".to_string(),
      location: "Mumbai".to_string(),
      sector: "Agriculture".to_string(),
      stipend: "₹12,000/month".to_string(),
      duration: "4 months".to_string(),
      description: "Conduct field research on rural development programs and policy implementation."
        .to_string(),
      requirements: vec![
        "Research skills".to_string(),
        "Data analysis".to_string(),
        "Field work".to_string(),
        "Hindi/Local language".to_string(),
      ],
      application_deadline: "2024-01-20".to_string(),
      mode: WorkMode::Onsite,
      skills: vec![
        "Research".to_string(),
        "Data Analysis".to_string(),
        "Hindi".to_string(),
      ],
    },
    Internship {
      id: "3".to_string(),
      title: "Public Health Data Analyst".to_string(),
      organization: "Ministry of Health".to_string(),
      location: "Bangalore".to_string(),
      sector: "Healthcare".to_string(),
      stipend: "₹18,000/month".to_string(),
      duration: "6 months".to_string(),
      description: "Analyze public health data and create reports for policy makers.".to_string(),
      requirements: vec![
        "Data analysis".to_string(),
        "Excel/Sheets".to_string(),
        "Statistics".to_string(),
        "Report writing".to_string(),
      ],
      application_deadline: "2024-01-25".to_string(),
      mode: WorkMode::Remote,
      skills: vec![
        "Data Analysis".to_string(),
        "Excel".to_string(),
        "Statistics".to_string(),
      ],
    },
  ]
}
