//! Main converter logic
//!
//! Orchestrates load → diff → scaffold → synthesize → write. Any failure
//! aborts the whole run; there is no partial-success mode.

use chartify_core::{
    DiffSet, DiffSummary, KeyCollision, ManifestSet, Values, compute_diff, load_manifests,
};
use std::path::{Path, PathBuf};

use crate::chart::{ChartSpec, scaffold_chart, write_file};
use crate::error::{ConvertError, Result};
use crate::template::{RenderedTemplate, synthesize};

/// Chart name used when the output directory has no usable name
pub const DEFAULT_CHART_NAME: &str = "generated-chart";

/// Options for the converter
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Dotted values path switching between base and overlay
    pub condition: String,
    /// Chart name; derived from the output directory when unset
    pub chart_name: Option<String>,
    /// Default value of the condition in values.yaml
    pub default_condition: bool,
    /// Chart version written to Chart.yaml
    pub chart_version: String,
    /// appVersion written to Chart.yaml
    pub app_version: String,
    /// Values file to extend with the condition
    pub values_file: Option<PathBuf>,
    /// Only compute what would be written
    pub dry_run: bool,
}

impl ConvertOptions {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            ..Default::default()
        }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            condition: String::new(),
            chart_name: None,
            default_condition: true,
            chart_version: "0.1.0".to_string(),
            app_version: "1.0.0".to_string(),
            values_file: None,
            dry_run: false,
        }
    }
}

/// A template produced by a conversion
#[derive(Debug, Clone)]
pub struct WrittenTemplate {
    /// Absolute or output-relative path the template was (or would be) written to
    pub path: PathBuf,
    pub template: RenderedTemplate,
}

/// Result of a conversion
#[derive(Debug)]
pub struct ConversionResult {
    pub chart_name: String,
    pub output: PathBuf,
    /// Chart.yaml and values.yaml
    pub chart_files: Vec<PathBuf>,
    /// One template per diff entry, in key order
    pub templates: Vec<WrittenTemplate>,
    pub summary: DiffSummary,
    /// Keys overwritten within a snapshot
    pub collisions: Vec<KeyCollision>,
    pub dry_run: bool,
}

/// Convert a base/overlay pair into a conditional Helm chart
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Run the conversion, writing the chart under `output`
    pub fn convert(&self, base: &Path, overlay: &Path, output: &Path) -> Result<ConversionResult> {
        validate_condition(&self.options.condition)?;

        let chart_name = self
            .options
            .chart_name
            .clone()
            .unwrap_or_else(|| derive_chart_name(output));

        tracing::info!(
            "Chart '{}' will be generated from base {} and overlay {} (condition: .Values.{})",
            chart_name,
            base.display(),
            overlay.display(),
            self.options.condition
        );

        let base_set = load_manifests(base)?;
        let overlay_set = load_manifests(overlay)?;
        log_manifests("base", &base_set);
        log_manifests("overlay", &overlay_set);

        let diff = compute_diff(&base_set.resources, &overlay_set.resources);
        tracing::info!("Analyzed differences: {}", diff.summary());

        let templates = self.render(&diff)?;

        let base_values = match &self.options.values_file {
            Some(path) => {
                tracing::info!("Loading base values from: {}", path.display());
                let values = Values::from_file(path)?;
                tracing::info!("Base values loaded with {} top-level keys", values.len());
                Some(values)
            }
            None => None,
        };

        let spec = ChartSpec {
            name: chart_name.clone(),
            condition: self.options.condition.clone(),
            default_condition: self.options.default_condition,
            version: self.options.chart_version.clone(),
            app_version: self.options.app_version.clone(),
            base_values,
        };

        let chart_files = if self.options.dry_run {
            // Still validates the chart version and values
            spec.plan()?;
            vec![output.join("Chart.yaml"), output.join("values.yaml")]
        } else {
            let chart = scaffold_chart(output, &spec)?;
            vec![chart.chart_file, chart.values_file]
        };

        let mut written = Vec::with_capacity(templates.len());
        for template in templates {
            let path = output.join(template.relative_path());
            if !self.options.dry_run {
                write_file(&path, &template.content)?;
            }
            written.push(WrittenTemplate { path, template });
        }

        Ok(ConversionResult {
            chart_name,
            output: output.to_path_buf(),
            chart_files,
            templates: written,
            summary: diff.summary(),
            collisions: diff.collisions().to_vec(),
            dry_run: self.options.dry_run,
        })
    }

    fn render(&self, diff: &DiffSet) -> Result<Vec<RenderedTemplate>> {
        diff.iter()
            .map(|(_, entry)| synthesize(entry, &self.options.condition))
            .collect()
    }
}

/// Chart name from the output directory's last component
///
/// Falls back to [`DEFAULT_CHART_NAME`] for paths like `.` that have none.
pub fn derive_chart_name(output: &Path) -> String {
    output
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != ".")
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_CHART_NAME.to_string())
}

/// Reject condition paths that cannot be referenced as `.Values.<path>`
pub fn validate_condition(condition: &str) -> Result<()> {
    let invalid = |reason: &str| ConvertError::InvalidCondition {
        condition: condition.to_string(),
        reason: reason.to_string(),
    };

    if condition.is_empty() {
        return Err(invalid("condition must not be empty"));
    }

    for segment in condition.split('.') {
        if segment.is_empty() {
            return Err(invalid("path segments must not be empty"));
        }
        if segment
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '"' | '\''))
        {
            return Err(invalid(
                "path segments must not contain whitespace, braces or quotes",
            ));
        }
    }

    Ok(())
}

fn log_manifests(label: &str, set: &ManifestSet) {
    tracing::info!(
        "Loaded {} resources from {} ({} file(s)): {}",
        set.len(),
        label,
        set.files.len(),
        set.source.display()
    );
    for file in &set.files {
        tracing::debug!("  read {}", file.display());
    }
    for (i, resource) in set.resources.iter().enumerate() {
        tracing::info!("  {}. {}", i + 1, resource.display_name());
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Convert with options
pub fn convert_with_options(
    base: &Path,
    overlay: &Path,
    output: &Path,
    options: ConvertOptions,
) -> Result<ConversionResult> {
    Converter::new(options).convert(base, overlay, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartify_core::{CoreError, DiffKind};
    use std::fs;
    use tempfile::TempDir;

    const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: shop
spec:
  replicas: 2
"#;

    const SERVICE_STANDARD: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: web
  namespace: shop
  annotations:
    example.com/tier: standard
spec:
  ports:
    - port: 80
"#;

    const SERVICE_PREMIUM: &str = r#"apiVersion: v1
kind: Service
metadata:
  name: web
  namespace: shop
  annotations:
    example.com/tier: premium
spec:
  ports:
    - port: 80
"#;

    const CONFIG_MAP: &str = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
  namespace: shop
data:
  mode: fast
"#;

    const CRD: &str = r#"apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
"#;

    fn stream(docs: &[&str]) -> String {
        docs.join("---\n")
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_convert_annotation_difference() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let chart_dir = out.path().join("shop-chart");

        let base = write(
            input.path(),
            "base.yaml",
            &stream(&[DEPLOYMENT, SERVICE_STANDARD, CONFIG_MAP]),
        );
        let overlay = write(
            input.path(),
            "overlay.yaml",
            &stream(&[DEPLOYMENT, SERVICE_PREMIUM, CONFIG_MAP]),
        );

        let result =
            convert_with_options(&base, &overlay, &chart_dir, ConvertOptions::new("premium"))
                .unwrap();

        assert_eq!(result.chart_name, "shop-chart");
        assert_eq!(result.summary.modified, 1);
        assert_eq!(result.summary.unchanged, 2);
        assert_eq!(result.templates.len(), 3);

        let service =
            fs::read_to_string(chart_dir.join("templates/core_v1_service_shop_web.yaml")).unwrap();
        assert!(service.contains("{{- if .Values.premium }}"));
        assert!(service.contains("{{- else }}"));
        assert!(service.contains("{{- end }}"));
        assert!(
            service.find("premium\n").unwrap() < service.find("{{- else }}").unwrap(),
            "overlay content must come first"
        );

        for unchanged in [
            "templates/apps_v1_deployment_shop_web.yaml",
            "templates/core_v1_configmap_shop_settings.yaml",
        ] {
            let content = fs::read_to_string(chart_dir.join(unchanged)).unwrap();
            assert!(!content.contains("{{- if"));
            assert!(!content.contains("{{- else }}"));
            assert!(!content.contains("{{- end }}"));
        }

        let values = fs::read_to_string(chart_dir.join("values.yaml")).unwrap();
        assert_eq!(values, "premium: true\n");
        assert!(chart_dir.join("Chart.yaml").is_file());
    }

    #[test]
    fn test_convert_directories_with_added_and_crd() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let base_dir = input.path().join("base");
        let overlay_dir = input.path().join("overlay");
        fs::create_dir_all(&base_dir).unwrap();
        fs::create_dir_all(overlay_dir.join("extra")).unwrap();

        write(&base_dir, "app.yaml", &stream(&[DEPLOYMENT, CONFIG_MAP]));
        write(&overlay_dir, "app.yaml", &stream(&[DEPLOYMENT, CONFIG_MAP]));
        write(&overlay_dir.join("extra"), "crd.yml", CRD);

        let result = convert_with_options(
            &base_dir,
            &overlay_dir,
            out.path(),
            ConvertOptions::new("features.widgets"),
        )
        .unwrap();

        assert_eq!(result.summary.added, 1);
        assert_eq!(result.summary.unchanged, 2);

        let crd_path = out
            .path()
            .join("crds/apiextensions.k8s.io_v1_customresourcedefinition_widgets.example.com.yaml");
        let crd = fs::read_to_string(crd_path).unwrap();
        assert!(crd.starts_with(
            "# Resource: apiextensions.k8s.io_v1_customresourcedefinition_widgets.example.com\n---\n"
        ));
        assert!(crd.contains("{{- if .Values.features.widgets }}"));
    }

    #[test]
    fn test_convert_removed_with_values_file() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let base = write(input.path(), "base.yaml", &stream(&[DEPLOYMENT, CONFIG_MAP]));
        let overlay = write(input.path(), "overlay.yaml", DEPLOYMENT);
        let values = write(input.path(), "values.yaml", "global:\n  registry: quay.io\n");

        let options = ConvertOptions {
            chart_name: Some("lean".to_string()),
            default_condition: false,
            values_file: Some(values),
            ..ConvertOptions::new("global.lean")
        };
        let result = convert_with_options(&base, &overlay, out.path(), options).unwrap();

        assert_eq!(result.chart_name, "lean");
        assert_eq!(result.summary.removed, 1);

        let removed = result
            .templates
            .iter()
            .find(|t| t.template.kind == DiffKind::Removed)
            .unwrap();
        let content = fs::read_to_string(&removed.path).unwrap();
        assert!(content.contains("{{- if not .Values.global.lean }}"));

        let values: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(out.path().join("values.yaml")).unwrap())
                .unwrap();
        assert_eq!(values["global"]["registry"], "quay.io");
        assert_eq!(values["global"]["lean"], serde_yaml::Value::Bool(false));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let chart_dir = out.path().join("chart");

        let base = write(input.path(), "base.yaml", DEPLOYMENT);
        let overlay = write(input.path(), "overlay.yaml", &stream(&[DEPLOYMENT, CONFIG_MAP]));

        let options = ConvertOptions {
            dry_run: true,
            ..ConvertOptions::new("extra")
        };
        let result = convert_with_options(&base, &overlay, &chart_dir, options).unwrap();

        assert!(result.dry_run);
        assert_eq!(result.templates.len(), 2);
        assert!(!chart_dir.exists());
    }

    #[test]
    fn test_missing_input_aborts() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let base = write(input.path(), "base.yaml", DEPLOYMENT);

        let err = convert_with_options(
            &base,
            &input.path().join("missing"),
            &out.path().join("chart"),
            ConvertOptions::new("x"),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConvertError::Core(CoreError::InputPathMissing { .. })
        ));
        assert!(!out.path().join("chart").exists());
    }

    #[test]
    fn test_invalid_chart_version_aborts() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let base = write(input.path(), "base.yaml", DEPLOYMENT);

        let options = ConvertOptions {
            chart_version: "one".to_string(),
            ..ConvertOptions::new("x")
        };
        let err = convert_with_options(&base, &base, out.path(), options).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidChartVersion { .. }));
    }

    #[test]
    fn test_derive_chart_name() {
        assert_eq!(derive_chart_name(Path::new("./chart")), "chart");
        assert_eq!(derive_chart_name(Path::new("out/my-app")), "my-app");
        assert_eq!(derive_chart_name(Path::new(".")), DEFAULT_CHART_NAME);
        assert_eq!(derive_chart_name(Path::new("")), DEFAULT_CHART_NAME);
    }

    #[test]
    fn test_validate_condition() {
        assert!(validate_condition("enabled").is_ok());
        assert!(validate_condition("global.features.auth").is_ok());

        for bad in ["", "a..b", ".a", "a.", "has space", "a.{b}"] {
            assert!(
                matches!(
                    validate_condition(bad),
                    Err(ConvertError::InvalidCondition { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }
}
