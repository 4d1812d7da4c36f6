use nucleo_matcher::{
    Config, Matcher, Utf32Str,
    pattern::{CaseMatching, Normalization, Pattern},
};
use serde_json::Value;

use crate::entity::Resource;

/// Unpaginated lists used to fill selection fields. Each is cached under a
/// fixed key and fetched once per form mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKey {
    Categories,
    Artists,
    Songs,
    Permissions,
}

impl ReferenceKey {
    pub fn resource(&self) -> Resource {
        match self {
            ReferenceKey::Categories => Resource::Categories,
            ReferenceKey::Artists => Resource::Artists,
            ReferenceKey::Songs => Resource::Songs,
            ReferenceKey::Permissions => Resource::Permissions,
        }
    }

    pub fn cache_key(&self) -> &'static str {
        match self {
            ReferenceKey::Categories => "categories",
            ReferenceKey::Artists => "artists",
            ReferenceKey::Songs => "songs",
            ReferenceKey::Permissions => "permission",
        }
    }

    /// Query sent to the list endpoint: one large page.
    pub fn request_params(&self) -> Vec<(String, String)> {
        let limit = match self {
            ReferenceKey::Songs => 100_000,
            _ => 1_000,
        };

        let mut params = vec![("limit".to_string(), limit.to_string())];
        if *self != ReferenceKey::Permissions {
            params.push(("isActive".to_string(), "true".to_string()));
        }
        params
    }

    fn value_field(&self) -> &'static str {
        match self {
            ReferenceKey::Permissions => "code",
            _ => "_id",
        }
    }

    fn label_field(&self) -> &'static str {
        match self {
            ReferenceKey::Artists => "fullName",
            _ => "name",
        }
    }

    pub fn options(&self, rows: &[Value]) -> Vec<RefOption> {
        rows.iter()
            .filter_map(|row| {
                let value = match row.get(self.value_field())? {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                let label = row
                    .get(self.label_field())
                    .and_then(|v| v.as_str())
                    .unwrap_or(&value)
                    .to_string();
                Some(RefOption { value, label })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefOption {
    pub value: String,
    pub label: String,
}

/// Options whose label fuzzily matches `input`, best first. An empty input
/// keeps every option in its original order.
pub fn search_options<'a>(options: &'a [RefOption], input: &str) -> Vec<&'a RefOption> {
    let input = input.trim();
    if input.is_empty() {
        return options.iter().collect();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(input, CaseMatching::Ignore, Normalization::Smart);
    let mut buf = Vec::new();

    let mut scored: Vec<(u32, &RefOption)> = options
        .iter()
        .filter_map(|option| {
            let haystack = Utf32Str::new(&option.label, &mut buf);
            pattern
                .score(haystack, &mut matcher)
                .map(|score| (score, option))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, option)| option).collect()
}

/// Label of `value`, or the raw value when the option is unknown.
pub fn label_for<'a>(options: &'a [RefOption], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label.as_str())
        .unwrap_or(value)
}
