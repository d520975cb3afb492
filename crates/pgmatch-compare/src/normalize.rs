//! Schema-qualifier rewriting for definition text.
//!
//! Only a schema name that starts at an identifier boundary and is
//! immediately followed by `.` counts as a qualifier, in bare (`sales.`) or
//! quoted (`"Sales".`) form. `big_sales.orders` is left alone when the
//! schema is `sales`.

use pgmatch_core::display_ident;

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn quoted(schema: &str) -> String {
    format!("\"{}\"", schema.replace('"', "\"\""))
}

/// Qualifier spellings of `schema`: quoted first, then bare.
fn qualifier_needles(schema: &str) -> [String; 2] {
    [format!("{}.", quoted(schema)), format!("{schema}.")]
}

fn replace_at_boundary(text: &str, needles: &[String], replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut idx = 0;

    while idx < text.len() {
        let at_boundary = text[..idx]
            .chars()
            .next_back()
            .is_none_or(|prev| !is_ident_char(prev) && prev != '"');
        let tail = &text[idx..];
        if at_boundary
            && let Some(needle) = needles.iter().find(|needle| tail.starts_with(needle.as_str()))
        {
            out.push_str(&text[last..idx]);
            out.push_str(replacement);
            idx += needle.len();
            last = idx;
            continue;
        }
        idx += tail.chars().next().map_or(1, char::len_utf8);
    }

    out.push_str(&text[last..]);
    out
}

/// Rewrite every `from.` qualifier in `text`, bare or quoted, to `to.`
/// spelled the way Postgres prints it.
pub fn rewrite_qualifier(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() || from == to {
        return text.to_string();
    }

    replace_at_boundary(
        text,
        &qualifier_needles(from),
        &format!("{}.", display_ident(to)),
    )
}

/// Drop every `schema.` qualifier from `text`.
pub fn strip_qualifier(text: &str, schema: &str) -> String {
    if schema.is_empty() {
        return text.to_string();
    }

    replace_at_boundary(text, &qualifier_needles(schema), "")
}

/// Compare definitions verbatim, then again with the target's qualifier
/// rewritten to the source's.
pub fn definitions_match(
    source_def: &str,
    target_def: &str,
    source_schema: &str,
    target_schema: &str,
) -> bool {
    source_def == target_def
        || source_def == rewrite_qualifier(target_def, target_schema, source_schema)
}
