//! Chart scaffolding: directory layout, Chart.yaml and values.yaml

use chartify_core::{Values, inject_dotted_path};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::template::OutputFolder;

/// Helm Chart.yaml structure (apiVersion v2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// Chart API version, always `v2`
    pub api_version: String,

    /// Chart name
    pub name: String,

    /// Chart description
    pub description: String,

    /// Chart type
    #[serde(rename = "type")]
    pub chart_type: String,

    /// Chart version (SemVer)
    pub version: String,

    /// Version of the packaged application
    pub app_version: String,
}

impl ChartMetadata {
    /// Build application chart metadata, checking that `version` is SemVer
    pub fn new(name: &str, version: &str, app_version: &str) -> Result<Self> {
        semver::Version::parse(version).map_err(|source| ConvertError::InvalidChartVersion {
            version: version.to_string(),
            source,
        })?;

        Ok(Self {
            api_version: "v2".to_string(),
            name: name.to_string(),
            description: format!("Helm chart for {name}"),
            chart_type: "application".to_string(),
            version: version.to_string(),
            app_version: app_version.to_string(),
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Everything needed to lay down the chart skeleton
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub name: String,
    /// Dotted values path of the condition
    pub condition: String,
    pub default_condition: bool,
    pub version: String,
    pub app_version: String,
    /// Values to start from; the condition is injected on top
    pub base_values: Option<Values>,
}

impl ChartSpec {
    /// Chart metadata and default values, without touching the filesystem
    pub fn plan(&self) -> Result<(ChartMetadata, Values)> {
        let metadata = ChartMetadata::new(&self.name, &self.version, &self.app_version)?;

        let mut values = self.base_values.clone().unwrap_or_default();
        inject_dotted_path(&mut values, &self.condition, self.default_condition);

        Ok((metadata, values))
    }
}

/// Files and content produced by [`scaffold_chart`]
#[derive(Debug, Clone)]
pub struct ScaffoldedChart {
    pub root: PathBuf,
    pub chart_file: PathBuf,
    pub values_file: PathBuf,
    pub metadata: ChartMetadata,
    pub values: Values,
}

/// Create the chart layout under `output`
///
/// Creates `templates/` and `crds/` (existing directories are fine), then
/// writes `Chart.yaml` and `values.yaml`.
pub fn scaffold_chart(output: &Path, spec: &ChartSpec) -> Result<ScaffoldedChart> {
    let (metadata, values) = spec.plan()?;

    for folder in [OutputFolder::Templates, OutputFolder::Crds] {
        let dir = output.join(folder.as_str());
        fs::create_dir_all(&dir).map_err(|source| ConvertError::Write { path: dir, source })?;
    }

    let chart_file = output.join("Chart.yaml");
    write_file(&chart_file, &metadata.to_yaml()?)?;

    let values_file = output.join("values.yaml");
    write_file(&values_file, &format!("{}\n", values.to_yaml()?))?;

    tracing::info!(
        "Scaffolded chart '{}' at {}",
        metadata.name,
        output.display()
    );

    Ok(ScaffoldedChart {
        root: output.to_path_buf(),
        chart_file,
        values_file,
        metadata,
        values,
    })
}

/// Write `content` to `path`, attaching the path to any IO error
pub(crate) fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    })
}
