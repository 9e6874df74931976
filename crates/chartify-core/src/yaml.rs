//! Block-style YAML emission with stable key order
//!
//! Scalars are formatted by `serde_yaml`; the block layout is written here so
//! that strings a YAML 1.1 reader (Helm) would resolve to booleans, numbers,
//! timestamps or null can be single-quoted.

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;

use crate::error::Result;

/// Plain scalars that YAML 1.1 resolves to something other than a string
static YAML11_IMPLICIT: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        // bool
        r"^(?i:y|n|yes|no|true|false|on|off)$",
        // null
        r"^(?i:~|null)?$",
        // int: binary, octal, decimal, hex, sexagesimal
        r"^[-+]?(0b[01_]+|0[0-7_]+|0|[1-9][0-9_]*|0x[0-9a-fA-F_]+|[1-9][0-9_]*(:[0-5]?[0-9])+)$",
        // float
        r"^[-+]?([0-9][0-9_]*\.[0-9_]*|\.[0-9_]+)([eE][-+]?[0-9]+)?$",
        r"^[-+]?[0-9][0-9_]*[eE][-+]?[0-9]+$",
        r"^[-+]?[0-9][0-9_]*(:[0-5]?[0-9])+\.[0-9_]*$",
        r"^[-+]?\.(inf|Inf|INF)$",
        r"^\.(nan|NaN|NAN)$",
        // timestamp
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$",
        r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}([Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}(\.[0-9]*)?([ \t]*(Z|[-+][0-9]{1,2}(:[0-9]{2})?))?$",
        // merge, value
        r"^(<<|=)$",
    ])
    .expect("valid regex set")
});

/// Serialize a YAML tree as block-style text
///
/// Mapping keys are sorted at every level so the same content always renders
/// the same way, independent of the key order in the source document.
/// Trailing whitespace (including the final newline) is removed.
pub fn to_block_yaml(value: &Value) -> Result<String> {
    let value = sorted(value);
    let mut out = String::new();

    match &value {
        Value::Mapping(map) if !map.is_empty() => write_mapping(&mut out, map, 0)?,
        Value::Sequence(items) if !items.is_empty() => write_sequence(&mut out, items, 0)?,
        other => out.push_str(&scalar(other)?),
    }

    Ok(out.trim_end().to_string())
}

/// Deep copy of `value` with every mapping's keys in sorted order
pub fn sorted(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| key_text(a).cmp(&key_text(b)));

            let mut out = Mapping::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k.clone(), sorted(v));
            }
            Value::Mapping(out)
        }
        Value::Sequence(items) => Value::Sequence(items.iter().map(sorted).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: sorted(&tagged.value),
        })),
        scalar => scalar.clone(),
    }
}

/// Whether a YAML 1.1 reader would load the plain scalar `s` as a non-string
pub fn is_ambiguous_plain(s: &str) -> bool {
    YAML11_IMPLICIT.is_match(s)
}

fn key_text(key: &Value) -> Cow<'_, str> {
    match key {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(serde_yaml::to_string(other).unwrap_or_default()),
    }
}

fn write_mapping(out: &mut String, map: &Mapping, indent: usize) -> Result<()> {
    for (key, value) in map {
        match simple_key(key)? {
            Some(key) => {
                push_indent(out, indent);
                out.push_str(&key);
                out.push(':');
                write_value(out, value, indent, true)?;
            }
            None => {
                write_item(out, "?", key, indent)?;
                write_item(out, ":", value, indent)?;
            }
        }
    }
    Ok(())
}

fn write_sequence(out: &mut String, items: &[Value], indent: usize) -> Result<()> {
    for item in items {
        write_item(out, "-", item, indent)?;
    }
    Ok(())
}

/// Write `value` after an indicator (`-`, `?` or `:`) placed at `indent`,
/// starting a nested collection on the indicator's line
fn write_item(out: &mut String, indicator: &str, value: &Value, indent: usize) -> Result<()> {
    push_indent(out, indent);
    out.push_str(indicator);

    let mut nested = String::new();
    match value {
        Value::Mapping(map) if !map.is_empty() => write_mapping(&mut nested, map, indent + 2)?,
        Value::Sequence(items) if !items.is_empty() => {
            write_sequence(&mut nested, items, indent + 2)?
        }
        other => return write_value(out, other, indent, false),
    }

    out.push(' ');
    out.push_str(&nested[indent + 2..]);
    Ok(())
}

/// Write the value that follows `key:` or an indicator at column `parent`
fn write_value(out: &mut String, value: &Value, parent: usize, compact_seq: bool) -> Result<()> {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            out.push('\n');
            write_mapping(out, map, parent + 2)
        }
        Value::Sequence(items) if !items.is_empty() => {
            out.push('\n');
            write_sequence(out, items, if compact_seq { parent } else { parent + 2 })
        }
        Value::Tagged(tagged) if is_collection(&tagged.value) => {
            out.push(' ');
            out.push_str(&tagged.tag.to_string());
            write_value(out, &tagged.value, parent, false)
        }
        other => {
            out.push(' ');
            let text = scalar(other)?;
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    out.push('\n');
                    if !line.is_empty() {
                        push_indent(out, parent);
                    }
                }
                out.push_str(line);
            }
            out.push('\n');
            Ok(())
        }
    }
}

/// Inline text for a mapping key, or `None` when it needs the explicit `?` form
fn simple_key(key: &Value) -> Result<Option<String>> {
    if is_collection(key) {
        return Ok(None);
    }
    let text = scalar(key)?;
    Ok((!text.contains('\n')).then_some(text))
}

/// Format a scalar (or empty collection) the way `serde_yaml` would,
/// quoting strings that are only strings under YAML 1.2
fn scalar(value: &Value) -> Result<String> {
    if let Value::String(s) = value
        && is_ambiguous_plain(s)
    {
        return Ok(format!("'{}'", s.replace('\'', "''")));
    }

    let text = serde_yaml::to_string(value)?;
    // keep-chomped block scalars are followed by an explicit document end
    let text = match text.strip_suffix("...\n") {
        Some(body) if body.ends_with('\n') => body,
        _ => text.as_str(),
    };
    Ok(text.strip_suffix('\n').unwrap_or(text).to_string())
}

fn is_collection(value: &Value) -> bool {
    match value {
        Value::Mapping(map) => !map.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Tagged(tagged) => is_collection(&tagged.value),
        _ => false,
    }
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}
