//! SoC assembly for Acorn board variants.
//!
//! Assembly runs through fixed stages: fail-fast configuration checks,
//! clock derivation, peripheral selection, then assembly against the board's
//! resource map. Every selected peripheral declares the clock domains it
//! needs and the assembler refuses to wire one whose domain is missing.

pub mod assemble;
pub mod config;
pub mod error;
pub mod gate;
pub mod intent;
pub mod peripheral;
pub mod pipeline;
pub mod report;
pub mod select;
pub mod stage;
pub mod transceiver;

pub use assemble::{assemble, AssembledSoc};
pub use config::{EthernetAddressing, EthernetConfig, EthernetMode, FeatureConfig};
pub use error::SocError;
pub use gate::{check_order, dependency_gate, gate_or_halt, GateDecision};
pub use intent::{IntentKind, IntentParams, NetworkBridge, PeripheralIntent};
pub use peripheral::{DramController, EthernetPhy, LedChaser, Peripheral, Uart};
pub use pipeline::{assemble_board, AssemblyOutput};
pub use report::AssemblyReport;
pub use select::PeripheralSelector;
pub use stage::{AssemblyStage, StageTracker};
pub use transceiver::QpllSettings;
