//! Board description layer for Acorn SoC builds.
//!
//! A [`Board`] is the read-only collaborator the SoC core consults:
//! - **Variant table:** the closed set of board sub-revisions and their capabilities
//! - **Resource map:** named physical pin groups
//! - **Constraints:** timing/placement constraints accumulated during one assembly run
//! - **Programmer:** the JTAG loader used after a successful build

pub mod board;
pub mod command;
pub mod constraint;
pub mod error;
pub mod parse;
pub mod programmer;
pub mod resource;
pub mod variant;

pub use board::Board;
pub use constraint::{Constraint, ConstraintSet};
pub use error::{PlatformError, Result};
pub use programmer::{OpenOcd, Programmer};
pub use resource::{PhysicalResourceMap, PinGroup, ResourceClaims, Subsignal};
pub use variant::{BoardVariant, VariantInfo};
