use std::collections::BTreeMap;

use crate::pattern::Match;

/// Text rendered for a placeholder that has no value.
pub const NULL_REPLACEMENT: &str = "<null>";

/// Substitutes `{name}` tokens in `template`.
///
/// Additional replacements win over captured bindings with the same name.
/// `{{` and `}}` render literal braces; an unterminated `{` is kept as is.
pub fn render_message(
    template: &str,
    captured: &Match,
    additional: &BTreeMap<String, String>,
) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(index) = rest.find(['{', '}']) {
        rendered.push_str(&rest[..index]);
        let tail = &rest[index..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            rendered.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            rendered.push('}');
            rest = &tail[1..];
            continue;
        }

        match tail[1..].find(['{', '}']) {
            Some(end) if tail[1..].as_bytes()[end] == b'}' => {
                let name = &tail[1..1 + end];
                rendered.push_str(&lookup(name, captured, additional));
                rest = &tail[end + 2..];
            }
            _ => {
                rendered.push('{');
                rest = &tail[1..];
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

fn lookup(name: &str, captured: &Match, additional: &BTreeMap<String, String>) -> String {
    if let Some(value) = additional.get(name) {
        return value.clone();
    }
    captured
        .value(name)
        .map(ToString::to_string)
        .unwrap_or_else(|| NULL_REPLACEMENT.to_string())
}
