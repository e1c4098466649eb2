//! Replay reconstruction for Reverie generative-agent simulations.
//!
//! Reads previously recorded simulation storage, either a completed
//! run's consolidated archive or an in-progress run's per-step files, and
//! re-presents it as paginated [`Replay`](reverie_types::Replay) payloads
//! and single-frame [`CurrentState`](reverie_types::CurrentState) views.
//! Nothing here mutates storage or computes agent behavior.
//!
//! # Modules
//!
//! - [`clock`] -- Step index to simulated calendar time
//! - [`action`] -- Display text for an agent's current activity
//! - [`persona`] -- Persona descriptions from recorded memory
//! - [`sampler`] -- Down-sampling and pagination of step lists
//! - [`storage`] -- Typed outcomes for individual file reads
//! - [`record`] -- On-disk schemas and snapshot conversion
//! - [`archive`] -- Archived (completed) run reader
//! - [`live`] -- Live (in-progress) run reader
//! - [`source`] -- Storage selection shared by the top-level builders
//! - [`assembler`] -- Paginated replay construction
//! - [`projector`] -- Latest-state projection
//! - [`config`] -- Storage configuration
//! - [`error`] -- Error types

pub mod action;
pub mod archive;
pub mod assembler;
pub mod clock;
pub mod config;
pub mod error;
pub mod live;
pub mod persona;
pub mod projector;
pub mod record;
pub mod sampler;
pub mod source;
pub mod storage;

pub use archive::ArchiveReader;
pub use assembler::{ReplayAssembler, ReplayRequest};
pub use clock::{ClockError, ClockProjector};
pub use config::{ConfigError, StorageConfig};
pub use error::ReplayError;
pub use live::LiveStepReader;
pub use persona::{PersonaDescriptionResolver, PersonaLayout};
pub use projector::StateProjector;
pub use source::{StepSource, StorageLocator};
