//! Legacy document directory migration.
//!
//! Installers of older builds left the document directory outside the
//! content root. Before documents are preloaded, [`MigrationService`] looks a
//! configurable number of levels above the content root for directories named
//! like the document root and moves them into place.
//!
//! Progress is persisted in a versioned JSON [`Marker`] inside the content
//! root. A run that fails part-way leaves the marker `in_progress`, so the next
//! run picks up where it stopped instead of mistaking the half-filled target
//! for a finished migration.

pub mod config;
pub mod error;
pub mod marker;
pub mod service;

pub use config::MigrationConfig;
pub use error::{MigrationError, MigrationResult, MoveFailure};
pub use marker::{Marker, MarkerStatus, MARKER_VERSION};
pub use service::{MigrationOutcome, MigrationReport, MigrationService, MigrationState};
