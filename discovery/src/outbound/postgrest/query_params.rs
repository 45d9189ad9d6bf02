//! Rendering compiled queries as PostgREST filter parameters.

use crate::domain::query::{Clause, ClauseValue, CompiledQuery, TextPattern};

/// Render every clause as `(column, operator.value)` query parameters.
///
/// Text patterns become `ilike` filters using PostgREST's `*` wildcard. A
/// clause with several alternatives is rendered as one `or=(...)` group.
/// Needles arrive without `*` or `%`; the remaining `_` wildcard and the
/// backslash are escaped so the store matches them literally.
///
/// # Examples
/// ```
/// use discovery::domain::{FilterPatch, FilterState};
/// use discovery::domain::query::compile;
/// use discovery::outbound::postgrest::render_filters;
///
/// let filters = FilterPatch::default().location("Ocean").apply_to(&FilterState::default());
/// let params = render_filters(&compile(&filters));
/// assert_eq!(params[0], ("location".to_owned(), "ilike.*Ocean*".to_owned()));
/// ```
pub fn render_filters(query: &CompiledQuery) -> Vec<(String, String)> {
    query.clauses().iter().map(render_clause).collect()
}

fn render_clause(clause: &Clause) -> (String, String) {
    let column = clause.field().column();
    match clause {
        Clause::TextMatch { patterns, .. } => {
            let expressions: Vec<String> = patterns.iter().flat_map(ilike_patterns).collect();
            match expressions.as_slice() {
                [single] => (column.to_owned(), format!("ilike.{single}")),
                _ => {
                    let alternatives = expressions
                        .iter()
                        .map(|pattern| format!("{column}.ilike.{}", quote(pattern)))
                        .collect::<Vec<_>>()
                        .join(",");
                    ("or".to_owned(), format!("({alternatives})"))
                }
            }
        }
        Clause::AtLeast { value, .. } => (column.to_owned(), format!("gte.{value}")),
        Clause::AtMost { value, .. } => (column.to_owned(), format!("lte.{value}")),
        Clause::Equals { value, .. } => {
            let rendered = match value {
                ClauseValue::Text(text) => text.clone(),
                ClauseValue::Bool(flag) => flag.to_string(),
            };
            (column.to_owned(), format!("eq.{rendered}"))
        }
    }
}

fn ilike_patterns(pattern: &TextPattern) -> Vec<String> {
    let needle = escape_literal(pattern.needle());
    match pattern {
        TextPattern::Contains(_) => vec![format!("*{needle}*")],
        TextPattern::BeforeComma(_) => vec![format!("*{needle},*")],
    }
}

fn escape_literal(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        match ch {
            '*' | '%' => {}
            '\\' | '_' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', r"\\").replace('"', "\\\""))
}
