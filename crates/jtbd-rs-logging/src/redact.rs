//! Redaction of sensitive context fields.

use serde_json::Value;

/// Policy that replaces values stored under sensitive keys.
#[derive(Debug, Clone)]
pub struct RedactionPolicy {
    /// Key fragments whose values should be redacted.
    pub sensitive_fields: Vec<String>,
    /// Replacement text for redacted values.
    pub replacement: String,
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            sensitive_fields: Vec::new(),
            replacement: "[REDACTED]".to_string(),
        }
    }
}

impl RedactionPolicy {
    /// Build a policy for the given key fragments.
    pub fn new(sensitive_fields: Vec<String>) -> Self {
        Self {
            sensitive_fields,
            ..Self::default()
        }
    }

    /// Apply the policy to a JSON value, descending into objects and arrays.
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::Array(values) => {
                Value::Array(values.into_iter().map(|value| self.apply(value)).collect())
            }
            Value::Object(values) => {
                let mut redacted = serde_json::Map::with_capacity(values.len());
                for (key, value) in values {
                    let value = if self.is_sensitive(&key) {
                        Value::String(self.replacement.clone())
                    } else {
                        self.apply(value)
                    };
                    redacted.insert(key, value);
                }
                Value::Object(redacted)
            }
            value => value,
        }
    }

    /// Keys match when, ignoring case and `_`/`-` separators, they contain a
    /// configured fragment: `userPassword` and `X-Api-Key` both match.
    pub fn is_sensitive(&self, key: &str) -> bool {
        let key = normalize_key(key);
        self.sensitive_fields.iter().any(|field| {
            let field = normalize_key(field);
            !field.is_empty() && key.contains(&field)
        })
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|ch| *ch != '_' && *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::RedactionPolicy;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn policy() -> RedactionPolicy {
        RedactionPolicy {
            sensitive_fields: vec!["password".to_string(), "api_key".to_string()],
            replacement: "[X]".to_string(),
        }
    }

    #[test]
    fn apply_redacts_nested_keys() {
        let input = json!({
            "owner": "u-1",
            "userPassword": "hunter2",
            "request": { "X-Api-Key": "abc", "items": [{ "password": "p" }] },
        });

        let output = policy().apply(input);

        let expected = json!({
            "owner": "u-1",
            "userPassword": "[X]",
            "request": { "X-Api-Key": "[X]", "items": [{ "password": "[X]" }] },
        });
        assert_eq!(output, expected);
    }

    #[test]
    fn empty_fragments_never_match() {
        let policy = RedactionPolicy::new(vec!["".to_string(), "_".to_string()]);
        assert!(!policy.is_sensitive("statement"));
    }
}
