use serde_json::Value;

/// Resolves a dotted key path such as `entities.hashtags[].text`.
///
/// Returns `None` if a key outside any iterated array is missing or null. Inside an iterated array,
/// elements lacking the key are skipped.
pub(crate) fn resolve<'a>(root: &'a Value, path: &str) -> Option<Vec<&'a Value>> {
    let mut current = vec![root];
    let mut iterated = false;

    for segment in path.split('.') {
        let (key, iterate) = match segment.strip_suffix("[]") {
            Some(key) => (key, true),
            None => (segment, false),
        };
        let mut next = Vec::with_capacity(current.len());

        for value in current {
            let selected = if key.is_empty() {
                Some(value)
            } else {
                value.get(key).filter(|selected| !selected.is_null())
            };

            match selected {
                Some(selected) if iterate => match selected.as_array() {
                    Some(items) => next.extend(items.iter()),
                    None if iterated => {}
                    None => return None,
                },
                Some(selected) => next.push(selected),
                None if iterated => {}
                None => return None,
            }
        }

        iterated |= iterate;
        current = next;
    }

    Some(current)
}

pub(crate) fn resolve_string(root: &Value, path: &str) -> Option<String> {
    resolve(root, path)?
        .into_iter()
        .next()
        .and_then(value_to_string)
}

pub(crate) fn resolve_strings(root: &Value, path: &str) -> Option<Vec<String>> {
    resolve(root, path).map(|values| values.into_iter().filter_map(value_to_string).collect())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_nested_paths() {
        let doc = json!({
            "user": {"screen_name": "Alice", "id": 12},
            "entities": {"hashtags": [{"text": "a"}, {"other": 1}, {"text": "b"}]},
            "extended_tweet": null
        });

        assert_eq!(resolve_string(&doc, "user.screen_name"), Some("Alice".to_string()));
        assert_eq!(resolve_string(&doc, "user.id"), Some("12".to_string()));
        assert_eq!(
            resolve_strings(&doc, "entities.hashtags[].text"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(resolve_string(&doc, "extended_tweet.full_text"), None);
        assert_eq!(resolve_strings(&doc, "entities.urls[].url"), None);
    }

    #[test]
    fn resolve_top_level_array() {
        let doc = json!({"tags": ["x", "y"]});

        assert_eq!(
            resolve_strings(&doc, "tags[]"),
            Some(vec!["x".to_string(), "y".to_string()])
        );
    }
}
