//! Onkyo eISCP command catalog
//!
//! The static command database for Onkyo/Integra receivers and the
//! model-aware input resolution built on top of it.
//!
//! # Features
//!
//! - **Command lookup**: by ISCP code, by verb name, by raw value token
//! - **Wire translation**: `(zone, verb, argument)` to ISCP message bodies and back
//! - **Model families**: which values a given receiver model supports
//! - **Input tables**: the ordered, 1-based input list for one model and zone
//!
//! # Quick Start
//!
//! ```rust
//! use onkyo_catalog::{resolve_inputs, Catalog, Zone};
//!
//! let catalog = Catalog::load().unwrap();
//!
//! assert_eq!(catalog.encode(Zone::Main, "master-volume", "42").unwrap(), "MVL2A");
//!
//! let inputs = resolve_inputs(&catalog, Zone::Main, "TX-NR686");
//! assert_eq!(inputs.get(2).unwrap().label, "video2");
//! ```

pub mod catalog;
pub mod error;
pub mod inputs;
pub mod zone;

pub use catalog::{
    is_meta_token, normalize_token, strip_qualifier, Catalog, CatalogEntry, CommandDef, Decoded,
    DecodedValue,
};
pub use error::{CatalogError, CatalogLoadError, InvalidInputIndexError, Result};
pub use inputs::{resolve_inputs, InputSource, InputTable};
pub use zone::{Verb, Zone, ZoneVerbs};
