//! Helpers over raw `serde_yaml::Value` trees: tag access and dotted paths.

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value;

/// Tag name without the leading `!`.
pub fn tag_name(tag: &Tag) -> String {
    let rendered = tag.to_string();
    rendered
        .strip_prefix('!')
        .unwrap_or(&rendered)
        .to_string()
}

/// Wrap `value` in a `!name` tag.
pub fn tagged(name: &str, value: Value) -> Value {
    Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(name),
        value,
    }))
}

/// Strip any number of tags.
pub fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(t) => untag(&t.value),
        other => other,
    }
}

pub fn untag_mut(value: &mut Value) -> &mut Value {
    match value {
        Value::Tagged(t) => untag_mut(&mut t.value),
        other => other,
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|c| !c.is_empty())
}

fn child<'v>(node: &'v Value, key: &str) -> Option<&'v Value> {
    match node {
        Value::Mapping(m) => m.get(key),
        Value::Sequence(s) => key.parse::<usize>().ok().and_then(|i| s.get(i)),
        _ => None,
    }
}

fn child_mut<'v>(node: &'v mut Value, key: &str) -> Option<&'v mut Value> {
    match node {
        Value::Mapping(m) => m.get_mut(key),
        Value::Sequence(s) => key.parse::<usize>().ok().and_then(move |i| s.get_mut(i)),
        _ => None,
    }
}

/// Look up a dotted path (`model.encoder`, `train.dev_tasks.0`), seeing
/// through tags. The empty path is the root.
pub fn get_path<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = root;
    for key in components(path) {
        current = child(untag(current), key)?;
    }
    Some(current)
}

pub fn get_path_mut<'v>(root: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    let mut current = root;
    for key in components(path) {
        current = child_mut(untag_mut(current), key)?;
    }
    Some(current)
}

/// Replace the node at `path`. Mapping keys may be new; sequence indices
/// must already exist. Returns false when the parent does not exist.
pub fn set_path(root: &mut Value, path: &str, new_value: Value) -> bool {
    let Some((parent_path, last)) = split_last(path) else {
        *root = new_value;
        return true;
    };
    let Some(parent) = get_path_mut(root, parent_path) else {
        return false;
    };
    match untag_mut(parent) {
        Value::Mapping(m) => {
            m.insert(Value::String(last.to_string()), new_value);
            true
        }
        Value::Sequence(s) => match last.parse::<usize>().ok().and_then(|i| s.get_mut(i)) {
            Some(slot) => {
                *slot = new_value;
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn split_last(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('.') {
        Some(i) => Some((&trimmed[..i], &trimmed[i + 1..])),
        None => Some(("", trimmed)),
    }
}

/// First tag found anywhere inside `value`, depth first.
pub fn find_tag(value: &Value) -> Option<String> {
    match value {
        Value::Tagged(t) => Some(tag_name(&t.tag)),
        Value::Sequence(s) => s.iter().find_map(find_tag),
        Value::Mapping(m) => m.iter().find_map(|(k, v)| find_tag(k).or_else(|| find_tag(v))),
        _ => None,
    }
}

/// Visit every string scalar in value position (mapping keys are skipped).
pub fn for_each_string_mut(value: &mut Value, f: &mut dyn FnMut(&mut String)) {
    match value {
        Value::String(s) => f(s),
        Value::Tagged(t) => for_each_string_mut(&mut t.value, f),
        Value::Sequence(seq) => {
            for item in seq.iter_mut() {
                for_each_string_mut(item, f);
            }
        }
        Value::Mapping(m) => {
            for (_, v) in m.iter_mut() {
                for_each_string_mut(v, f);
            }
        }
        _ => {}
    }
}

/// Join a parent path and a child key.
pub(crate) fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_tag_name_strips_bang() {
        let v = doc("!Vocab {i2w: [a]}");
        match v {
            Value::Tagged(t) => assert_eq!(tag_name(&t.tag), "Vocab"),
            _ => panic!("expected tagged"),
        }
    }

    #[test]
    fn test_get_path_through_tags_and_sequences() {
        let v = doc(
            r#"
model: !DefaultTranslator
  encoder: !BiLSTMSeqTransducer
    layers: 2
train: !SimpleTrainingRegimen
  dev_tasks:
    - !LossEvalTask {src_file: a}
"#,
        );
        let layers = get_path(&v, "model.encoder.layers").unwrap();
        assert_eq!(layers.as_u64(), Some(2));
        let src = get_path(&v, "train.dev_tasks.0.src_file").unwrap();
        assert_eq!(src.as_str(), Some("a"));
        assert!(get_path(&v, "model.decoder").is_none());
        assert!(get_path(&v, "train.dev_tasks.3").is_none());
    }

    #[test]
    fn test_empty_path_is_root() {
        let v = doc("a: 1");
        assert_eq!(get_path(&v, ""), Some(&v));
    }

    #[test]
    fn test_set_path_existing_and_new_keys() {
        let mut v = doc("a: {b: 1}\nlist: [1, 2]");
        assert!(set_path(&mut v, "a.b", Value::from(5)));
        assert!(set_path(&mut v, "a.c", Value::from("x")));
        assert!(set_path(&mut v, "list.1", Value::from(9)));
        assert!(!set_path(&mut v, "list.7", Value::from(9)));
        assert!(!set_path(&mut v, "missing.key", Value::from(1)));
        assert_eq!(get_path(&v, "a.b").and_then(Value::as_u64), Some(5));
        assert_eq!(get_path(&v, "a.c").and_then(Value::as_str), Some("x"));
        assert_eq!(get_path(&v, "list.1").and_then(Value::as_u64), Some(9));
    }

    #[test]
    fn test_set_path_root() {
        let mut v = doc("a: 1");
        assert!(set_path(&mut v, "", Value::from(3)));
        assert_eq!(v.as_u64(), Some(3));
    }

    #[test]
    fn test_find_tag_nested() {
        assert_eq!(find_tag(&doc("a: [1, {b: !X 2}]")).as_deref(), Some("X"));
        assert_eq!(find_tag(&doc("a: [1, {b: 2}]")), None);
    }

    #[test]
    fn test_for_each_string_skips_keys() {
        let mut v = doc("key: value\nlist: [x, 1]");
        let mut seen = Vec::new();
        for_each_string_mut(&mut v, &mut |s| seen.push(s.clone()));
        assert_eq!(seen, vec!["value".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a", "b"), "a.b");
    }
}
