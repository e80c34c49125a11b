//! Certification lookup and job feed browsing for the TC2 Hub.
//!
//! Two read-only flows share one shape: fetch, normalize into a [`ListOutcome`],
//! render. Upstream failures are classified at the fetch boundary and never
//! reach the presentation layer as errors.

pub mod badge;
pub mod cache;
pub mod certification;
pub mod config;
pub mod curated;
pub mod data;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod outcome;
pub mod toolkit;
pub mod web;

pub use certification::{ normalize_certifications, CertificationRecord };
pub use curated::CuratedCatalog;
pub use error::FetchError;
pub use feed::{ normalize_feed, FeedDocument, FeedEntry, Published };
pub use outcome::ListOutcome;
pub use toolkit::{ FeedPage, SearchOutcome, Toolkit };
