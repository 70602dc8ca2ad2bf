use serde_json::Value;

use super::binding::{Binding, Captured};
use super::match_set::MatchSet;
use super::{child_path, index_path, PatternNode};
use crate::error::MatchError;

/// Matches one level of the pattern tree against the input at `path`.
pub(crate) fn match_node(
    node: &PatternNode,
    input: &Value,
    path: &str,
    ignore_case: bool,
) -> Result<Option<MatchSet>, MatchError> {
    // Explicit nulls are treated like absent values.
    if input.is_null() {
        return Ok(None);
    }

    match node {
        PatternNode::Wildcard => Ok(Some(MatchSet::Unit)),
        PatternNode::Placeholder(name) => {
            let value = Captured::from_json(input, path)?;
            Ok(Some(MatchSet::Bind {
                name: name.clone(),
                binding: Binding {
                    value,
                    path: path.to_string(),
                },
            }))
        }
        PatternNode::Literal(expected) => {
            let matched = textual(input)
                .map(|actual| text_equals(expected, &actual, ignore_case))
                .unwrap_or(false);
            Ok(matched.then_some(MatchSet::Unit))
        }
        PatternNode::Integer(expected) => {
            Ok((input.as_i64() == Some(*expected)).then_some(MatchSet::Unit))
        }
        PatternNode::Boolean(expected) => {
            Ok((input.as_bool() == Some(*expected)).then_some(MatchSet::Unit))
        }
        PatternNode::Object(properties) => match_object(properties, input, path, ignore_case),
        PatternNode::Array(items) => match input {
            Value::Array(elements) => match_exists(items, elements, path, ignore_case),
            _ => match_alternatives(items, input, path, ignore_case),
        },
    }
}

fn match_object(
    properties: &[(String, PatternNode)],
    input: &Value,
    path: &str,
    ignore_case: bool,
) -> Result<Option<MatchSet>, MatchError> {
    let Some(object) = input.as_object() else {
        return Ok(None);
    };

    let mut factors = Vec::with_capacity(properties.len());
    for (key, child) in properties {
        let Some(value) = object.get(key) else {
            return Ok(None);
        };
        match match_node(child, value, &child_path(path, key), ignore_case)? {
            Some(set) => factors.push(set),
            None => return Ok(None),
        }
    }

    Ok(Some(MatchSet::product(factors)))
}

/// A single-element array pattern matches every element of the input array
/// independently; the successful per-element sets are unioned.
fn match_exists(
    items: &[PatternNode],
    elements: &[Value],
    path: &str,
    ignore_case: bool,
) -> Result<Option<MatchSet>, MatchError> {
    let [item] = items else {
        return Err(MatchError::ArrayToArrayUnsupported {
            path: path.to_string(),
            len: items.len(),
        });
    };

    let mut alternatives = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        if let Some(set) = match_node(item, element, &index_path(path, index), ignore_case)? {
            alternatives.push(set);
        }
    }

    Ok(Some(MatchSet::union(alternatives)))
}

/// Against a non-array input the pattern elements are alternatives.
fn match_alternatives(
    items: &[PatternNode],
    input: &Value,
    path: &str,
    ignore_case: bool,
) -> Result<Option<MatchSet>, MatchError> {
    let mut alternatives = Vec::new();
    for item in items {
        if let Some(set) = match_node(item, input, path, ignore_case)? {
            alternatives.push(set);
        }
    }

    Ok(Some(MatchSet::union(alternatives)))
}

fn textual(input: &Value) -> Option<String> {
    match input {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn text_equals(expected: &str, actual: &str, ignore_case: bool) -> bool {
    if ignore_case {
        expected.to_lowercase() == actual.to_lowercase()
    } else {
        expected == actual
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MatchError;
    use crate::pattern::{Captured, Match, Pattern};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn run(pattern: Value, input: Value) -> Option<Vec<Match>> {
        Pattern::compile(&pattern, true)
            .unwrap()
            .matches(&input)
            .unwrap()
            .map(|set| set.iter().collect())
    }

    #[test_case(json!("eastus"); "string")]
    #[test_case(json!(42); "integer")]
    #[test_case(json!(false); "boolean")]
    fn wildcard_matches_any_primitive(input: Value) {
        let matches = run(json!("*"), input).expect("structural match");
        assert_eq!(matches.len(), 1);
        assert!(matches[0].is_empty());
    }

    #[test_case(json!("Standard_LRS"), Captured::String("Standard_LRS".into()); "string")]
    #[test_case(json!(7), Captured::Long(7); "integer")]
    #[test_case(json!(true), Captured::Bool(true); "boolean")]
    fn placeholder_binds_input(input: Value, expected: Captured) {
        let pattern = Pattern::compile(&json!("{x}"), true).unwrap();
        for _ in 0..2 {
            let set = pattern.matches(&input).unwrap().expect("structural match");
            let matches: Vec<Match> = set.iter().collect();
            assert_eq!(matches.len(), 1);
            assert_eq!(matches[0].value("x"), Some(&expected));
            assert_eq!(matches[0].get("x").unwrap().path, "");
        }
    }

    #[test]
    fn literal_respects_case_setting() {
        let insensitive = Pattern::compile(&json!({"location": "ChinaNorth"}), true).unwrap();
        let sensitive = Pattern::compile(&json!({"location": "ChinaNorth"}), false).unwrap();
        let input = json!({"location": "chinanorth"});

        assert!(insensitive.matches(&input).unwrap().is_some());
        assert!(sensitive.matches(&input).unwrap().is_none());
    }

    #[test]
    fn escaped_literal_matches_braced_text() {
        let matches = run(json!({"name": "{{vm}}"}), json!({"name": "{vm}"}));
        assert_eq!(matches.map(|m| m.len()), Some(1));
    }

    #[test]
    fn integer_and_boolean_require_equality() {
        assert!(run(json!({"count": 2}), json!({"count": 2})).is_some());
        assert!(run(json!({"count": 2}), json!({"count": 3})).is_none());
        assert!(run(json!({"enabled": true}), json!({"enabled": false})).is_none());
        assert!(run(json!({"enabled": true}), json!({"enabled": "true"})).is_none());
    }

    #[test]
    fn missing_or_null_property_fails_structurally() {
        assert!(run(json!({"sku": "*"}), json!({"location": "x"})).is_none());
        assert!(run(json!({"sku": "*"}), json!({"sku": null})).is_none());
    }

    #[test]
    fn object_properties_combine_into_one_match() {
        let matches = run(
            json!({"type": "{t}", "location": "{l}"}),
            json!({"type": "Microsoft.Storage/storageAccounts", "location": "chinaeast", "kind": "x"}),
        )
        .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value("l"), Some(&Captured::String("chinaeast".into())));
        assert_eq!(matches[0].get("l").unwrap().path, "location");
    }

    #[test]
    fn empty_object_pattern_matches_without_bindings() {
        let matches = run(json!({}), json!({"type": "x"})).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].is_empty());
    }

    #[test]
    fn single_element_array_matches_each_item() {
        let input = json!({"disks": [
            {"sku": "Premium_LRS"},
            {"size": 5},
            {"sku": "UltraSSD_LRS"}
        ]});
        let matches = run(json!({"disks": [{"sku": "{sku}"}]}), input).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].get("sku").unwrap().path, "disks[2].sku");
    }

    #[test]
    fn array_with_no_satisfying_items_yields_zero_matches() {
        let matches = run(json!({"disks": [{"sku": "{sku}"}]}), json!({"disks": [{"size": 1}]}));
        assert_eq!(matches.map(|m| m.len()), Some(0));
    }

    #[test]
    fn multi_element_array_against_array_is_unsupported() {
        let pattern = Pattern::compile(&json!({"zones": ["1", "2"]}), true).unwrap();
        let err = pattern.matches(&json!({"zones": ["1"]})).unwrap_err();
        assert_eq!(
            err,
            MatchError::ArrayToArrayUnsupported {
                path: "zones".into(),
                len: 2
            }
        );
    }

    #[test]
    fn array_pattern_against_scalar_is_alternatives() {
        let pattern = json!({"kind": ["StorageV2", "BlobStorage"]});
        assert_eq!(run(pattern.clone(), json!({"kind": "BlobStorage"})).map(|m| m.len()), Some(1));
        assert_eq!(run(pattern, json!({"kind": "FileStorage"})).map(|m| m.len()), Some(0));
    }

    #[test]
    fn nested_arrays_produce_cartesian_combinations() {
        let pattern = json!({"nics": [{"ip": "{ip}"}], "disks": [{"sku": "{sku}"}]});
        let input = json!({
            "nics": [{"ip": "10.0.0.4"}, {"ip": "10.0.0.5"}],
            "disks": [{"sku": "a"}, {"sku": "b"}, {"sku": "c"}]
        });
        let set = Pattern::compile(&pattern, true)
            .unwrap()
            .matches(&input)
            .unwrap()
            .unwrap();
        assert_eq!(set.count(), 6);
        assert_eq!(set.iter().filter(|m| m.len() == 2).count(), 6);
    }

    #[test]
    fn placeholder_on_float_or_container_is_an_error() {
        let pattern = Pattern::compile(&json!({"properties": "{p}"}), true).unwrap();
        let err = pattern.matches(&json!({"properties": {"a": 1}})).unwrap_err();
        assert!(matches!(err, MatchError::UnsupportedToken { kind: "object", .. }));

        let pattern = Pattern::compile(&json!({"ratio": "{r}"}), true).unwrap();
        assert!(pattern.matches(&json!({"ratio": 0.25})).is_err());
    }

    #[test]
    fn literal_matches_textual_form_of_numbers() {
        assert!(run(json!({"port": "443"}), json!({"port": 443})).is_some());
        assert!(run(json!({"enabled": "True"}), json!({"enabled": true})).is_some());
    }

    #[test]
    fn matching_leaves_input_untouched() {
        let input = json!({"type": "x", "location": "y"});
        let before = input.clone();
        let _ = run(json!({"type": "{t}"}), input.clone());
        assert_eq!(input, before);
    }
}
