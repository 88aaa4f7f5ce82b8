//! Flagday - country of the day flag client
//!
//! Features:
//! - Ranked country search for autocomplete lists and a full-text picker
//! - Keyboard-style selection state shared by both surfaces
//! - Mercator-style projection of country coordinates onto a map image
//! - Flag snapshot, country directory and extended facts loading over HTTP or
//!   from a local data directory

pub mod config;
pub mod country;
pub mod facts;
pub mod freshness;
pub mod gateway;
pub mod matcher;
pub mod projection;
pub mod selection;
pub mod source;

pub use crate::country::{Coordinates, CountryRecord, Directory, ExtendedFacts};
pub use crate::facts::FactSheet;
pub use crate::gateway::{DataGateway, FlagSnapshot, GatewayError, Today};
pub use crate::matcher::{full_text_matches, rank_matches, MatchRank, MatchResult};
pub use crate::projection::{project, MapFrame, MapMarker, PixelPoint, ProjectionError};
pub use crate::selection::{CommitPolicy, FocusObserver, SelectionController};
