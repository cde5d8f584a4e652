pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::*;
pub use errors::*;
pub use models::{
    AttemptResult, Candidate, CandidateStatus, ContactAttempt, DispatchOutcome, DispatchReport,
    DispatchRequest, GeoPoint, WorkerIdentity,
};
pub use traits::CandidateCatalog;
