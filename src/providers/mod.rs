pub mod traits;
pub mod types;

pub use traits::{CatalogProvider, IntentParser, TrackExplainer};
pub use types::{Provenance, TrustLevel};
