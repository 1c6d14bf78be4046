//! Schema discovery against a running backend.
//!
//! Discovery turns a backend base URL plus an ordered list of probe paths into
//! candidate schema URLs, then checks them one at a time until one answers
//! with a success status. The first success wins; the list is never re-ordered
//! or scored, and exhausting it is a hard failure.
//!
//! ```rust,no_run
//! use schemasync_core::discovery::Discoverer;
//!
//! # async fn example() -> schemasync_core::Result<()> {
//! let paths = ["/openapi.json".to_string(), "/api/v1/openapi.json".to_string()];
//! let endpoint = Discoverer::new("http://localhost:8000", &paths)?
//!     .discover()
//!     .await?;
//! println!("schema lives at {}", endpoint.url);
//! # Ok(())
//! # }
//! ```

mod probe;

pub use probe::{Discoverer, DiscoveredEndpoint, HttpProbe, Probe, ProbeCandidate};
