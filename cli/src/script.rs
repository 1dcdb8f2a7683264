//! Edit scripts: recorded editor gestures replayed against a session.
//!
//! A script is a YAML (or JSON) list of operations tagged by `op`. Each
//! operation maps onto one [`SchemaState`] call, so a script reproduces what
//! a user would do in the editor.
//!
//! # Example YAML
//!
//! ```yaml
//! - op: add
//! - op: update
//!   path: [0]
//!   set: { name: status, type: string }
//! - op: enum_toggle
//!   path: [0]
//!   enabled: true
//! - op: enum_add
//!   path: [0]
//!   value: open
//! - op: reorder
//!   from: 0
//!   to: 1
//! ```

use std::io::BufReader;
use std::path::Path;

use schema_builder_core::{EnumValue, PropertyPath, PropertyUpdate, SchemaState};
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;

/// One recorded editor gesture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Append a blank property under `parent` (root when omitted).
    Add {
        #[serde(default)]
        parent: PropertyPath,
    },
    Remove {
        path: PropertyPath,
    },
    /// Merge a partial property into the one at `path`.
    Update {
        path: PropertyPath,
        set: PropertyUpdate,
    },
    /// Move a child of `parent` (root when omitted).
    Reorder {
        #[serde(default)]
        parent: PropertyPath,
        from: usize,
        to: usize,
    },
    Strict {
        enabled: bool,
    },
    Name {
        name: String,
    },
    AdditionalProperties {
        allowed: bool,
    },
    EnumToggle {
        path: PropertyPath,
        enabled: bool,
    },
    /// Type an enum value into the input box; numbers may be written bare.
    EnumAdd {
        path: PropertyPath,
        value: EnumValue,
    },
    EnumRemove {
        path: PropertyPath,
        index: usize,
    },
}

impl EditOp {
    /// Applies the operation and reports whether the session accepted it.
    pub fn apply(&self, state: &mut SchemaState) -> bool {
        match self {
            Self::Add { parent } => state.add_nested_property(parent).is_some(),
            Self::Remove { path } => state.remove_property_at(path),
            Self::Update { path, set } => state.update_property_at(path, set.clone()),
            Self::Reorder { parent, from, to } => state.reorder_property_at(parent, *from, *to),
            Self::Strict { enabled } => {
                state.set_strict_mode(*enabled);
                true
            }
            Self::Name { name } => {
                state.set_schema_name(name.clone());
                true
            }
            Self::AdditionalProperties { allowed } => {
                state.set_additional_properties(*allowed);
                true
            }
            Self::EnumToggle { path, enabled } => state.set_enum_enabled(path, *enabled),
            Self::EnumAdd { path, value } => state.add_enum_value(path, &value.to_string()),
            Self::EnumRemove { path, index } => state.remove_enum_value(path, *index),
        }
    }
}

/// Outcome of replaying a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub ignored: usize,
}

pub fn load_script(path: &Path) -> Result<Vec<EditOp>> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    Ok(serde_yaml::from_reader(reader)?)
}

/// Replays `ops` in order; rejected operations are logged and skipped.
pub fn replay(state: &mut SchemaState, ops: &[EditOp]) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (step, op) in ops.iter().enumerate() {
        if op.apply(state) {
            summary.applied += 1;
        } else {
            warn!(step, ?op, "Edit had no effect");
            summary.ignored += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use schema_builder_core::{PropertyType, SchemaDefinition};

    use super::*;

    fn parse(yaml: &str) -> Vec<EditOp> {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_defaults_parent_to_root() {
        let ops = parse("- op: add\n- op: reorder\n  from: 1\n  to: 0\n");
        assert_eq!(
            ops,
            vec![
                EditOp::Add {
                    parent: PropertyPath::default()
                },
                EditOp::Reorder {
                    parent: PropertyPath::default(),
                    from: 1,
                    to: 0
                },
            ]
        );
    }

    #[test]
    fn test_replay_builds_nested_schema() {
        let ops = parse(
            r#"
- op: add
- op: update
  path: [0]
  set: { name: meta, type: object }
- op: add
  parent: [0]
- op: update
  path: [0, 0]
  set: { name: level, type: number }
- op: enum_toggle
  path: [0, 0]
  enabled: true
- op: enum_add
  path: [0, 0]
  value: 3
- op: enum_add
  path: [0, 0]
  value: "high"
"#,
        );

        let mut state = SchemaState::new(SchemaDefinition::new(), true);
        let summary = replay(&mut state, &ops);

        assert_eq!(summary, ReplaySummary { applied: 6, ignored: 1 });
        let level = state
            .schema()
            .property(&PropertyPath::from(vec![0, 0]))
            .unwrap();
        assert_eq!(level.property_type, PropertyType::Number);
        assert_eq!(level.enum_values(), &[EnumValue::Number(3.0)]);
        assert!(state.diagnostics().is_empty());
    }

    #[test]
    fn test_out_of_range_ops_are_counted_as_ignored() {
        let ops = parse("- op: remove\n  path: [4]\n- op: reorder\n  from: 0\n  to: 9\n");
        let mut state = SchemaState::default();
        assert_eq!(
            replay(&mut state, &ops),
            ReplaySummary { applied: 0, ignored: 2 }
        );
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        let result = serde_yaml::from_str::<Vec<EditOp>>(
            "- op: update\n  path: [0]\n  set: { colour: red }\n",
        );
        assert!(result.is_err());
    }
}
