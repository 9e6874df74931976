//! Chartify Convert - base/overlay manifests to a conditional Helm chart
//!
//! Given two snapshots of the same deployment, this crate produces one Helm
//! chart whose templates render the base snapshot when `.Values.<condition>`
//! is false and the overlay snapshot when it is true.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use chartify_convert::{ConvertOptions, convert_with_options};
//!
//! let options = ConvertOptions {
//!     chart_name: Some("my-app".to_string()),
//!     ..ConvertOptions::new("global.enablePrometheus")
//! };
//!
//! let result = convert_with_options(
//!     Path::new("./manifests/base"),
//!     Path::new("./manifests/overlay"),
//!     Path::new("./chart"),
//!     options,
//! ).unwrap();
//!
//! println!("{} ({} templates)", result.summary, result.templates.len());
//! ```
//!
//! # Output layout
//!
//! ```text
//! chart/
//! ├── Chart.yaml
//! ├── values.yaml        # base values + the condition default
//! ├── templates/         # one file per resource key
//! └── crds/              # CustomResourceDefinitions
//! ```

pub mod chart;
pub mod converter;
pub mod error;
pub mod template;

// Re-exports
pub use chart::{ChartMetadata, ChartSpec, ScaffoldedChart, scaffold_chart};
pub use converter::{
    ConversionResult, ConvertOptions, Converter, DEFAULT_CHART_NAME, WrittenTemplate,
    convert_with_options, derive_chart_name, validate_condition,
};
pub use error::{ConvertError, Result};
pub use template::{OutputFolder, RenderedTemplate, synthesize};
