//! Execute-once workflow step for media packages.
//!
//! The step runs one external command against a media package, waits for it,
//! has a produced track inspected, and attaches the result to the package
//! with a new storage location, flavor, and tags.
//!
//! Control flow: [`step::ExecuteOnceStep`] → [`orchestrator::run_execution`]
//! → [`inspection::inspect_if_track`] → [`reconcile::attach`] →
//! [`tags::TagPatch`].
pub mod config;
pub mod error;
pub mod inspection;
pub mod job;
pub mod local;
pub mod mediapackage;
pub mod orchestrator;
pub mod reconcile;
pub mod step;
pub mod tags;

pub use config::StepConfig;
pub use error::{StepError, StepErrorKind, StepResult};
pub use mediapackage::{Element, ElementType, Flavor, MediaPackage};
pub use step::{ExecuteOnceStep, StepOutcome, StepServices};
pub use tags::TagPatch;
