//! Typed internship catalog: domain records, network client, offline
//! fallback data, and recommendation filtering.

mod client;
mod fallback;
mod recommend;
mod service;
mod types;

pub use client::HttpFetcher;
pub use fallback::{offline_internships, OfflineCatalog};
pub use recommend::{filter_internships, recommend, FilterCriteria, MAX_RECOMMENDATIONS};
pub use service::{Catalog, InternshipService};
pub use types::{Internship, UserProfile, WorkMode};
