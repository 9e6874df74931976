//! Conditional Helm template synthesis
//!
//! Each diff entry becomes one template file. The file body reproduces the
//! base or the overlay resource depending on `.Values.<condition>`:
//!
//! | entry     | body                                                     |
//! |-----------|----------------------------------------------------------|
//! | added     | `if .Values.c` overlay `end`                             |
//! | removed   | `if not .Values.c` base `end`                            |
//! | modified  | `if .Values.c` overlay `else` base `end`                 |
//! | unchanged | base, unconditionally                                    |

use chartify_core::{DiffEntry, DiffKind, Resource, ResourceKey};
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

/// Chart directory a template is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFolder {
    Templates,
    Crds,
}

impl OutputFolder {
    /// CustomResourceDefinitions go to `crds/`, everything else to `templates/`
    pub fn for_resource(resource: &Resource) -> Self {
        if resource.is_crd() {
            Self::Crds
        } else {
            Self::Templates
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Templates => "templates",
            Self::Crds => "crds",
        }
    }
}

impl fmt::Display for OutputFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated template, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    pub key: ResourceKey,
    pub kind: DiffKind,
    pub folder: OutputFolder,
    pub filename: String,
    pub content: String,
}

impl RenderedTemplate {
    /// Path relative to the chart root, e.g. `templates/apps_v1_deployment_web.yaml`
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.folder.as_str()).join(&self.filename)
    }
}

/// Build the template for one diff entry
pub fn synthesize(entry: &DiffEntry, condition: &str) -> Result<RenderedTemplate> {
    let representative = entry.representative();
    let key = representative.key();

    tracing::debug!("Generating template for {} ({})", key, entry.kind());

    let mut lines = vec![format!("# Resource: {key}"), "---".to_string()];

    match entry {
        DiffEntry::Added(overlay) => {
            lines.push(if_enabled(condition));
            lines.push(overlay.to_yaml()?);
            lines.push(END.to_string());
        }
        DiffEntry::Removed(base) => {
            lines.push(if_disabled(condition));
            lines.push(base.to_yaml()?);
            lines.push(END.to_string());
        }
        DiffEntry::Unchanged { base, .. } => {
            lines.push(base.to_yaml()?);
        }
        DiffEntry::Modified { base, overlay } => {
            lines.push(if_enabled(condition));
            lines.push(overlay.to_yaml()?);
            lines.push(ELSE.to_string());
            lines.push(base.to_yaml()?);
            lines.push(END.to_string());
        }
    }

    Ok(RenderedTemplate {
        folder: OutputFolder::for_resource(representative),
        filename: representative.template_filename(),
        kind: entry.kind(),
        key,
        content: lines.join("\n"),
    })
}

const ELSE: &str = "{{- else }}";
const END: &str = "{{- end }}";

fn if_enabled(condition: &str) -> String {
    format!("{{{{- if .Values.{condition} }}}}")
}

fn if_disabled(condition: &str) -> String {
    format!("{{{{- if not .Values.{condition} }}}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartify_core::compute_diff;

    fn resource(yaml: &str) -> Resource {
        Resource::from_yaml(yaml).unwrap()
    }

    fn settings(mode: &str) -> Resource {
        resource(&format!(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: settings\ndata:\n  mode: {mode}\n"
        ))
    }

    fn crd() -> Resource {
        resource(
            r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: widgets.example.com
spec:
  group: example.com
"#,
        )
    }

    #[test]
    fn test_modified_template() {
        let entry = DiffEntry::Modified {
            base: settings("base"),
            overlay: settings("overlay"),
        };

        let rendered = synthesize(&entry, "feature.enabled").unwrap();

        assert_eq!(rendered.folder, OutputFolder::Templates);
        assert_eq!(rendered.filename, "core_v1_configmap_settings.yaml");
        assert_eq!(rendered.kind, DiffKind::Modified);
        insta::assert_snapshot!(rendered.content, @r"
        # Resource: core_v1_configmap_settings
        ---
        {{- if .Values.feature.enabled }}
        apiVersion: v1
        data:
          mode: overlay
        kind: ConfigMap
        metadata:
          name: settings
        {{- else }}
        apiVersion: v1
        data:
          mode: base
        kind: ConfigMap
        metadata:
          name: settings
        {{- end }}
        ");
    }

    #[test]
    fn test_added_template() {
        let rendered = synthesize(&DiffEntry::Added(settings("new")), "X").unwrap();
        let lines: Vec<&str> = rendered.content.lines().collect();

        assert_eq!(lines[0], "# Resource: core_v1_configmap_settings");
        assert_eq!(lines[1], "---");
        assert_eq!(lines[2], "{{- if .Values.X }}");
        assert_eq!(*lines.last().unwrap(), "{{- end }}");
        assert!(!rendered.content.contains("{{- else }}"));
        assert!(rendered.content.contains("mode: new"));
    }

    #[test]
    fn test_removed_template() {
        let rendered = synthesize(&DiffEntry::Removed(settings("old")), "X").unwrap();

        assert!(rendered.content.contains("{{- if not .Values.X }}"));
        assert!(rendered.content.ends_with("{{- end }}"));
        assert!(!rendered.content.contains("{{- else }}"));
        assert!(rendered.content.contains("mode: old"));
    }

    #[test]
    fn test_unchanged_template_is_unconditional() {
        let entry = DiffEntry::Unchanged {
            base: settings("same"),
            overlay: settings("same"),
        };
        let rendered = synthesize(&entry, "X").unwrap();

        assert!(rendered.content.starts_with("# Resource: core_v1_configmap_settings\n---\n"));
        assert!(!rendered.content.contains("{{"));
        assert!(!rendered.content.ends_with('\n'));
    }

    #[test]
    fn test_added_uses_overlay_identity() {
        let overlay = resource("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: extra\n");
        let rendered = synthesize(&DiffEntry::Added(overlay), "X").unwrap();

        assert_eq!(rendered.key.as_str(), "apps_v1_deployment_extra");
        assert_eq!(
            rendered.relative_path(),
            PathBuf::from("templates/apps_v1_deployment_extra.yaml")
        );
    }

    #[test]
    fn test_crds_always_go_to_crds_folder() {
        let mut changed = crd().value().clone();
        changed["spec"]["group"] = "other.example.com".into();
        let changed = Resource::new(changed);

        let cases = [
            DiffEntry::Added(crd()),
            DiffEntry::Removed(crd()),
            DiffEntry::Unchanged {
                base: crd(),
                overlay: crd(),
            },
            DiffEntry::Modified {
                base: crd(),
                overlay: changed,
            },
        ];

        for entry in &cases {
            let rendered = synthesize(entry, "X").unwrap();
            assert_eq!(rendered.folder, OutputFolder::Crds, "{:?}", entry.kind());
            assert_eq!(
                rendered.filename,
                "apiextensions.k8s.io_v1_customresourcedefinition_widgets.example.com.yaml"
            );
        }
    }

    #[test]
    fn test_exactly_one_wrapper_shape_per_entry() {
        let base = vec![settings("a"), resource("apiVersion: v1\nkind: Secret\nmetadata:\n  name: gone\n")];
        let overlay = vec![settings("b"), resource("apiVersion: v1\nkind: Secret\nmetadata:\n  name: new\n")];

        for (_, entry) in &compute_diff(&base, &overlay) {
            let content = synthesize(entry, "X").unwrap().content;
            let ifs = content.matches("{{- if ").count();
            let ends = content.matches("{{- end }}").count();
            let elses = content.matches("{{- else }}").count();

            match entry.kind() {
                DiffKind::Modified => assert_eq!((ifs, elses, ends), (1, 1, 1)),
                DiffKind::Added | DiffKind::Removed => assert_eq!((ifs, elses, ends), (1, 0, 1)),
                DiffKind::Unchanged => assert_eq!((ifs, elses, ends), (0, 0, 0)),
            }
        }
    }
}
