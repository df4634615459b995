//! Installs the assets of *Jagged Alliance 2: Wildfire* into a loose file mod directory.
//!
//! An installation is described by an [`InstallationPlan`] and carried out by an [`Installer`]:
//!
//! ```no_run
//! use ja2_install::{InstallOptions, InstallationPlan, Installer};
//! use miette::IntoDiagnostic;
//!
//! # fn main() -> miette::Result<()> {
//! let json = std::fs::read_to_string("wildfire.json").into_diagnostic()?;
//! let plan = InstallationPlan::from_json(&json)?;
//! let options = InstallOptions::builder()
//!     .source_dir("/games/wildfire/Data")
//!     .destination_dir("./Data")
//!     .build();
//!
//! let report = Installer::new(plan, options).run()?;
//! println!("unpacked {} archives", report.unpacked.len());
//! # Ok(())
//! # }
//! ```
//!
//! The building blocks are usable on their own: [`path::resolve`] maps names onto an existing
//! directory tree without regard to case and [`overlay::Overlay`] copies archive entries into a
//! directory.

pub mod error;
pub mod overlay;
pub mod path;
pub mod pipeline;
pub mod plan;

pub use pipeline::{InstallOptions, InstallReport, Installer, Phase};
pub use plan::InstallationPlan;
