//! Report generation module.
//!
//! [`SplitReport`] is the validation report of a run: shapes at each
//! checkpoint, class proportions per partition and the actions taken. It is
//! suitable for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use credit_prep::reporting::ReportGenerator;
//!
//! let report =
//!     ReportGenerator::build_report("data/credit.csv", pipeline.config(), &result.summary);
//!
//! // Print as JSON
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! // Or write to file
//! let generator = ReportGenerator::new(PathBuf::from("outputs"));
//! generator.write_report_to_file(&report, "credit")?;
//! ```

mod generator;

pub use generator::{ClassBalanceReport, ReportGenerator, ShapeReport, SplitReport};
