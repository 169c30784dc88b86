//! NVD feed access for the ingestion pipeline.
//!
//! Three concerns live here, all free of storage dependencies:
//! computing the publication-date window for the next pull
//! ([`window::next_window`]), fetching one page of raw CVE records
//! ([`client::FeedClient`]), and normalizing a raw record into the
//! internal shape ([`normalize::normalize`]).

pub mod client;
pub mod error;
pub mod normalize;
pub mod window;
