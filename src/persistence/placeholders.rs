//! `{NAME}` placeholder expansion in string values.
//!
//! Built-ins: `{EXP}` (experiment name), `{EXP_DIR}` (directory of the
//! configuration file) and `{PID}` (process id). Custom names come from
//! `exp_global.placeholders`. Expansion is a single left-to-right pass, so
//! replacement text is never scanned again and unknown names stay verbatim.

use regex::{Captures, Regex};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use super::node::for_each_string_mut;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("Invalid placeholder regex")
});

/// Placeholder table for one experiment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    values: BTreeMap<String, String>,
}

impl Placeholders {
    /// Built-in placeholders for experiment `exp_name` defined in a file
    /// living in `exp_dir`.
    pub fn for_experiment(exp_name: &str, exp_dir: &Path) -> Self {
        let mut values = BTreeMap::new();
        values.insert("EXP".to_string(), exp_name.to_string());
        values.insert("EXP_DIR".to_string(), exp_dir.display().to_string());
        values.insert("PID".to_string(), std::process::id().to_string());
        Self { values }
    }

    /// Add user placeholders. Built-ins win on a name clash.
    pub fn with_custom(mut self, custom: &BTreeMap<String, String>) -> Self {
        for (k, v) in custom {
            self.values.entry(k.clone()).or_insert_with(|| v.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Expand every known placeholder in `s`, each occurrence exactly once.
    pub fn expand(&self, s: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(s, |caps: &Captures<'_>| match self.values.get(&caps[1]) {
                Some(v) => v.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Expand in place every string value of a node tree.
    pub fn expand_tree(&self, value: &mut Value) {
        for_each_string_mut(value, &mut |s| {
            if s.contains('{') {
                *s = self.expand(s);
            }
        });
    }
}

/// Names of all `{NAME}` tokens in `s`, in order of appearance.
pub fn placeholder_names(s: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(s)
        .map(|c| c[1].to_string())
        .collect()
}

/// Read `exp_global.placeholders` from a raw experiment mapping. Non-string
/// scalars are rendered; anything else is ignored.
pub fn custom_placeholders(experiment: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let Some(Value::Mapping(m)) =
        super::node::get_path(experiment, "exp_global.placeholders").map(super::node::untag)
    else {
        return out;
    };
    for (k, v) in m {
        let (Some(key), Some(val)) = (k.as_str(), scalar_to_string(v)) else {
            continue;
        };
        out.insert(key.to_string(), val);
    }
    out
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn table(name: &str) -> Placeholders {
        Placeholders::for_experiment(name, &PathBuf::from("/cfg"))
    }

    #[test]
    fn test_expand_exp() {
        assert_eq!(table("en-ja").expand("out/{EXP}.mod"), "out/en-ja.mod");
    }

    #[test]
    fn test_expand_every_occurrence() {
        assert_eq!(table("x").expand("{EXP}/{EXP}.hyp"), "x/x.hyp");
    }

    #[test]
    fn test_expand_exp_dir() {
        assert_eq!(table("x").expand("{EXP_DIR}/logs/{EXP}.log"), "/cfg/logs/x.log");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(table("x").expand("{NOPE}/{EXP}"), "{NOPE}/x");
    }

    #[test]
    fn test_replacement_not_rescanned() {
        // An experiment whose name itself looks like a placeholder.
        assert_eq!(table("{EXP}").expand("a/{EXP}"), "a/{EXP}");
    }

    #[test]
    fn test_custom_placeholders_do_not_override_builtins() {
        let mut custom = BTreeMap::new();
        custom.insert("EXP".to_string(), "hijack".to_string());
        custom.insert("DATA".to_string(), "/data".to_string());
        let p = table("real").with_custom(&custom);
        assert_eq!(p.expand("{DATA}/{EXP}"), "/data/real");
    }

    #[test]
    fn test_custom_placeholders_read_from_tree() {
        let v: Value = serde_yaml::from_str(
            "exp_global: !ExpGlobal\n  placeholders:\n    DATA: /d\n    N: 3\n    BAD: [1]\n",
        )
        .unwrap();
        let custom = custom_placeholders(&v);
        assert_eq!(custom.get("DATA").map(String::as_str), Some("/d"));
        assert_eq!(custom.get("N").map(String::as_str), Some("3"));
        assert!(!custom.contains_key("BAD"));
    }

    #[test]
    fn test_expand_tree_values_only() {
        let mut v: Value =
            serde_yaml::from_str("'{EXP}': keep\nfile: '{EXP}.txt'\nlist: ['{EXP}']").unwrap();
        table("e").expand_tree(&mut v);
        assert_eq!(v.get("file").and_then(Value::as_str), Some("e.txt"));
        assert_eq!(v.get("{EXP}").and_then(Value::as_str), Some("keep"));
    }

    #[test]
    fn test_placeholder_names() {
        assert_eq!(
            placeholder_names("{A}/x/{EXP}.{b_1}"),
            vec!["A".to_string(), "EXP".to_string(), "b_1".to_string()]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_exp_expands_once_per_use(
            name in "[a-z][a-z0-9_-]{0,12}",
            prefix in "[a-z/]{0,8}",
            uses in 1usize..5,
        ) {
            let template = format!("{prefix}{}", "{EXP}/".repeat(uses));
            let out = table(&name).expand(&template);
            prop_assert!(!out.contains("{EXP}"), "placeholder left in {}", out);
            prop_assert_eq!(out, format!("{prefix}{}", format!("{name}/").repeat(uses)));
        }

        #[test]
        fn prop_strings_without_braces_unchanged(s in "[^{}]{0,40}") {
            prop_assert_eq!(table("x").expand(&s), s);
        }
    }
}
