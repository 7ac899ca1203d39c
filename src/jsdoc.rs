//! Parses a raw JSDoc token body into a description + tag map (spec §3).
//!
//! Recognized tags get dedicated emitter handling (§4.5.8); unknown tags are
//! preserved in the map but ignored at emission. Tag values are kept as raw
//! strings here — numeric/JSON coercion happens in the emitter, not here,
//! since the tag value's destination (number vs. string vs. JSON) is an
//! emission-time concern.

use crate::ast::JsDoc;

pub fn parse(body: &str) -> JsDoc {
    let mut description_lines = Vec::new();
    let mut tags = std::collections::HashMap::new();

    for raw_line in body.lines() {
        let line = raw_line.trim().trim_start_matches('*').trim();
        if let Some(rest) = line.strip_prefix('@') {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let tag_name = parts.next().unwrap_or("").to_lowercase();
            let value = parts.next().unwrap_or("").trim().to_string();
            if !tag_name.is_empty() {
                tags.entry(tag_name)
                    .and_modify(|existing: &mut String| {
                        existing.push('\n');
                        existing.push_str(&value);
                    })
                    .or_insert(value);
            }
        } else if !line.is_empty() {
            description_lines.push(line.to_string());
        }
    }

    JsDoc {
        description: (!description_lines.is_empty()).then(|| description_lines.join(" ")),
        tags,
    }
}
