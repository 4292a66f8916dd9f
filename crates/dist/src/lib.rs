//! mcray-dist: build orchestration and artifact staging for the mcray engine
//!
//! This crate packages the natively-built `mcray` simulation engine together
//! with its accelerated numeric modules into one distributable tree:
//! - `matrix`: the feature-toggle configuration read once from the environment
//! - `invoke`: the configure/compile/verify driver for the external build tool
//! - `stage`: atomic copies of the build outputs into the package tree
//! - `registry`: target enumeration and the all-or-nothing dispatch loop

pub mod accel;
pub mod consts;
pub mod invoke;
pub mod matrix;
pub mod receipt;
pub mod registry;
pub mod stage;
pub mod util;
pub mod version;
pub mod workspace;
