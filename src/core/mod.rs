pub mod acquisition;
pub mod run;
pub mod session;

pub use crate::domain::exclusion::ExclusionSet;
pub use crate::domain::model::{AcquisitionOutcome, Breed, BreedProperty, Candidate, ExclusionRule, SearchHit};
pub use crate::domain::ports::{ConfigProvider, RecordSource};
pub use crate::utils::error::Result;
