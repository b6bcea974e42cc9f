//! mac_vendor Library
//!
//! MAC address -> manufacturer lookup over a hosted OUI prefix dataset.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use mac_vendor::{SourceConfig, VendorIndex};
//!
//! let index = VendorIndex::new(SourceConfig::from_base("https://example.com/mac"))?;
//! let vendors = index.ready().await?;
//! if let Some(hit) = vendors.query("98:01:A7:A8:00:00") {
//!     println!("{}", hit.vendor);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discover;
pub mod error;
pub mod oui;

pub use config::{LocalizationPolicy, SourceConfig};
pub use discover::{base_from_script_src, discover_base};
pub use error::VendorError;
pub use oui::{Fetch, LoadStatus, ResourceFetcher, VendorIndex, VendorMatch, VendorQuery};
