//! Structural walk of a raw node tree against the tag registry.
//!
//! The walk normalizes as it goes: a tag with no body becomes a tag over an
//! empty mapping, and tags of fixed categories are dropped so the typed
//! schema sees plain mappings there. `!LoadSerialized` nodes are handed to
//! a [`LoadHandler`], which either records or resolves them.

use serde_yaml::{Mapping, Value};

use super::error::ConfigError;
use super::node::{find_tag, join, tag_name, untag_mut};
use super::registry::{fixed_spec, lookup, Category, Slot, TagSpec, LOAD_SERIALIZED};

/// Receives every `!LoadSerialized` node met during a walk.
pub(crate) trait LoadHandler {
    fn handle(&mut self, node: &mut Value, category: Category, path: &str)
        -> Result<(), ConfigError>;
}

/// Check the value in a parameter slot.
pub(crate) fn walk_slot(
    value: &mut Value,
    slot: Slot,
    path: &str,
    on_load: &mut dyn LoadHandler,
) -> Result<(), ConfigError> {
    match slot {
        Slot::Value => match find_tag(value) {
            Some(tag) => Err(ConfigError::TagInValue {
                tag,
                path: path.to_string(),
            }),
            None => Ok(()),
        },
        Slot::One(category) => walk_node(value, category, path, on_load),
        Slot::Many(category) => match value {
            Value::Null => Ok(()),
            Value::Sequence(items) => {
                for (i, item) in items.iter_mut().enumerate() {
                    walk_node(item, category, &join(path, &i.to_string()), on_load)?;
                }
                Ok(())
            }
            _ => Err(ConfigError::ExpectedSequence {
                path: path.to_string(),
            }),
        },
    }
}

/// Check a single node expected to be of `category`. Null means "absent".
pub(crate) fn walk_node(
    value: &mut Value,
    category: Category,
    path: &str,
    on_load: &mut dyn LoadHandler,
) -> Result<(), ConfigError> {
    let tag = match value {
        Value::Null => return Ok(()),
        Value::Tagged(t) => Some(tag_name(&t.tag)),
        Value::Mapping(_) => None,
        _ => {
            return Err(ConfigError::ExpectedTagged {
                path: path.to_string(),
                expected: category,
            })
        }
    };

    let spec = match tag {
        Some(name) if name == LOAD_SERIALIZED => return on_load.handle(value, category, path),
        Some(name) => {
            let spec = lookup(&name).ok_or_else(|| ConfigError::UnknownTag {
                tag: name.clone(),
                path: path.to_string(),
            })?;
            if spec.category != category {
                return Err(ConfigError::WrongCategory {
                    tag: name,
                    path: path.to_string(),
                    found: spec.category,
                    expected: category,
                });
            }
            spec
        }
        None => fixed_spec(category).ok_or_else(|| ConfigError::ExpectedTagged {
            path: path.to_string(),
            expected: category,
        })?,
    };

    let body = untag_mut(value);
    if body.is_null() || body.as_str() == Some("") {
        *body = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(params) = body else {
        return Err(ConfigError::ExpectedMapping {
            tag: spec.tag.to_string(),
            path: path.to_string(),
        });
    };
    check_params(params, spec, path, on_load)?;

    if category.fixed_tag().is_some() {
        let inner = match value {
            Value::Tagged(t) => Some(std::mem::take(&mut t.value)),
            _ => None,
        };
        if let Some(inner) = inner {
            *value = inner;
        }
    }
    Ok(())
}

fn check_params(
    params: &mut Mapping,
    spec: &TagSpec,
    path: &str,
    on_load: &mut dyn LoadHandler,
) -> Result<(), ConfigError> {
    for (key, val) in params.iter_mut() {
        let Some(name) = key.as_str() else {
            return Err(ConfigError::NonStringParam {
                tag: spec.tag.to_string(),
                path: path.to_string(),
            });
        };
        let param = spec.param(name).ok_or_else(|| ConfigError::UnknownParam {
            tag: spec.tag.to_string(),
            param: name.to_string(),
            path: path.to_string(),
        })?;
        walk_slot(val, param.slot, &join(path, name), on_load)?;
    }

    for param in spec.params.iter().filter(|p| p.required) {
        if matches!(params.get(param.name), None | Some(Value::Null)) {
            return Err(ConfigError::MissingParam {
                tag: spec.tag.to_string(),
                param: param.name.to_string(),
                path: path.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Handler that fails on any `!LoadSerialized`.
    struct Forbid;

    impl LoadHandler for Forbid {
        fn handle(&mut self, _: &mut Value, _: Category, path: &str) -> Result<(), ConfigError> {
            Err(ConfigError::InvalidLoadSerialized {
                path: path.to_string(),
                message: "not allowed here".to_string(),
            })
        }
    }

    fn check(yaml: &str, category: Category) -> Result<Value, ConfigError> {
        let mut v: Value = serde_yaml::from_str(yaml).unwrap();
        walk_node(&mut v, category, "root", &mut Forbid)?;
        Ok(v)
    }

    #[test]
    fn test_accepts_known_tag_in_matching_slot() {
        assert!(check("!BiLSTMSeqTransducer {layers: 2}", Category::Transducer).is_ok());
    }

    #[test]
    fn test_rejects_unknown_tag() {
        let err = check("!FancyTransducer {}", Category::Transducer).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTag { ref tag, .. } if tag == "FancyTransducer"));
    }

    #[test]
    fn test_rejects_wrong_category() {
        let err = check("!MlpAttender {}", Category::Transducer).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WrongCategory {
                found: Category::Attender,
                expected: Category::Transducer,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_param() {
        let err = check("!MlpAttender {hidden: 3}", Category::Attender).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownParam { ref param, .. } if param == "hidden"));
    }

    #[test]
    fn test_rejects_untagged_enum_slot() {
        let err = check("{layers: 2}", Category::Transducer).unwrap_err();
        assert!(matches!(err, ConfigError::ExpectedTagged { .. }));
    }

    #[test]
    fn test_fixed_category_tag_is_stripped() {
        let v = check("!Vocab {vocab_file: v.txt}", Category::Vocab).unwrap();
        assert!(matches!(v, Value::Mapping(_)));
    }

    #[test]
    fn test_fixed_category_accepts_untagged_mapping() {
        assert!(check("{vocab_file: v.txt}", Category::Vocab).is_ok());
    }

    #[test]
    fn test_bare_tag_becomes_empty_mapping() {
        let v = check("!MLELoss", Category::LossCalculator).unwrap();
        match v {
            Value::Tagged(t) => assert_eq!(t.value, Value::Mapping(Mapping::new())),
            other => panic!("expected tagged, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_sequence_paths_reported() {
        let err = check(
            "!ModularSeqTransducer\n  modules:\n    - !BiLSTMSeqTransducer {}\n    - !Nope {}\n",
            Category::Transducer,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTag { ref path, .. } if path == "root.modules.1"));
    }

    #[test]
    fn test_missing_required_param() {
        let err = check("!LossEvalTask {src_file: a}", Category::EvalTask).unwrap_err();
        assert!(matches!(err, ConfigError::MissingParam { ref param, .. } if param == "ref_file"));
    }

    #[test]
    fn test_tag_inside_plain_value_rejected() {
        let err = check("!Vocab {i2w: [a, !Weird b]}", Category::Vocab).unwrap_err();
        assert!(matches!(err, ConfigError::TagInValue { .. }));
    }

    #[test]
    fn test_load_serialized_goes_to_handler() {
        let err = check("!LoadSerialized {filename: a, path: b}", Category::Transducer).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLoadSerialized { .. }));
    }
}
