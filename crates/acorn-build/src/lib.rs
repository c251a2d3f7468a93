//! Build pipeline for assembled Acorn SoCs.
//!
//! Takes an [`AssembledSoc`](acorn_soc::AssembledSoc) and offers three terminal
//! actions: build (emit artifacts and run the FPGA toolchain), load (volatile
//! configuration over JTAG) and flash (persistent, at an offset). Load and
//! flash are refused until a build has succeeded, and each action runs at
//! most once per pipeline.

pub mod emit;
pub mod error;
pub mod pipeline;
pub mod toolchain;

pub use emit::{render_json, render_tcl, render_xdc};
pub use error::{BuildError, Result};
pub use pipeline::{BuildAction, BuildArtifacts, BuildPipeline, DEFAULT_BUILD_NAME};
pub use toolchain::{Toolchain, Vivado};
