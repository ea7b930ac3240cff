//! YAML subset for resource documents: parsing for edit payloads and seed
//! files, emitting for the raw-document editor. Emitted documents carry a
//! `---` document-start marker and deterministically sorted keys, and parse
//! back to the same JSON value.

use std::fmt::Write as _;

use anyhow::{Result, anyhow, bail};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

struct Line<'a> {
    indent: usize,
    content: &'a str,
}

fn preprocess(input: &str) -> Vec<Line<'_>> {
    input
        .lines()
        .filter_map(|raw| {
            let stripped = strip_comment(raw).trim_end();
            let trimmed = stripped.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('%') || trimmed == "---" {
                return None;
            }
            let indent = stripped.len() - trimmed.len();
            Some(Line {
                indent,
                content: trimmed,
            })
        })
        .collect()
}

// A `#` only opens a comment at line start or after whitespace, and never
// inside a quoted scalar, so URLs with fragments survive.
fn strip_comment(raw: &str) -> &str {
    let mut chars = raw.char_indices();
    let mut quote: Option<char> = None;
    let mut prev_ws = true;
    while let Some((pos, ch)) = chars.next() {
        match quote {
            Some('"') if ch == '\\' => {
                chars.next();
            }
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '#' if prev_ws => return &raw[..pos],
                _ => {}
            },
        }
        prev_ws = ch.is_whitespace();
    }
    raw
}

/// Parse a document into a JSON value.
pub fn parse_document(input: &str) -> Result<JsonValue> {
    let lines = preprocess(input);
    if lines.is_empty() {
        return Ok(JsonValue::Null);
    }
    let mut idx = 0;
    let value = parse_node(&lines, &mut idx, 0)?;
    if idx < lines.len() {
        bail!("trailing content at line {}", idx + 1);
    }
    Ok(value)
}

fn parse_node(lines: &[Line<'_>], idx: &mut usize, indent: usize) -> Result<JsonValue> {
    if *idx >= lines.len() {
        bail!("unexpected end of document");
    }
    let line = &lines[*idx];
    if line.indent < indent {
        bail!("invalid indentation at line {}", *idx + 1);
    }
    if is_sequence_entry(line.content) {
        parse_sequence(lines, idx, line.indent)
    } else if mapping_key(line.content).is_some() {
        parse_mapping(lines, idx, line.indent)
    } else {
        let content = line.content;
        *idx += 1;
        parse_scalar(content)
    }
}

fn is_sequence_entry(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

// Split `key: value` / `key:` headings; `://` and the like keep URLs scalar.
fn mapping_key(content: &str) -> Option<(&str, &str)> {
    let pos = content.find(':')?;
    let (key, remainder) = content.split_at(pos);
    let rest = &remainder[1..];
    if rest.is_empty() {
        Some((key, ""))
    } else if let Some(stripped) = rest.strip_prefix(' ') {
        Some((key, stripped.trim_start()))
    } else {
        None
    }
}

fn parse_sequence(lines: &[Line<'_>], idx: &mut usize, indent: usize) -> Result<JsonValue> {
    let mut items = Vec::new();
    while *idx < lines.len() {
        let line = &lines[*idx];
        if line.indent != indent || !is_sequence_entry(line.content) {
            break;
        }
        let remainder = line.content[1..].trim_start();
        *idx += 1;
        let item = if remainder.is_empty() {
            parse_node(lines, idx, indent + 1)?
        } else if let Some((key, rest)) = mapping_key(remainder) {
            // `- key: value` opens a mapping whose remaining entries sit two
            // columns past the dash.
            parse_mapping_from(key, rest, lines, idx, indent + 2)?
        } else {
            parse_scalar(remainder)?
        };
        items.push(item);
    }
    Ok(JsonValue::Array(items))
}

fn parse_mapping(lines: &[Line<'_>], idx: &mut usize, indent: usize) -> Result<JsonValue> {
    let line = &lines[*idx];
    let (key, rest) =
        mapping_key(line.content).ok_or_else(|| anyhow!("expected mapping at line {}", *idx + 1))?;
    *idx += 1;
    parse_mapping_from(key, rest, lines, idx, indent)
}

fn parse_mapping_from(
    first_key: &str,
    first_rest: &str,
    lines: &[Line<'_>],
    idx: &mut usize,
    indent: usize,
) -> Result<JsonValue> {
    let mut map = JsonMap::new();
    let mut pending = Some((first_key.to_string(), first_rest.to_string()));
    loop {
        let (key, rest) = match pending.take() {
            Some(entry) => entry,
            None => match lines.get(*idx) {
                Some(line) if line.indent == indent && !is_sequence_entry(line.content) => {
                    let (key, rest) = mapping_key(line.content)
                        .ok_or_else(|| anyhow!("expected mapping entry at line {}", *idx + 1))?;
                    *idx += 1;
                    (key.to_string(), rest.to_string())
                }
                _ => break,
            },
        };
        let value = if rest.is_empty() {
            parse_nested_value(lines, idx, indent)?
        } else {
            parse_scalar(&rest)?
        };
        let key = decode_key(&key)?;
        if map.insert(key.clone(), value).is_some() {
            bail!("duplicate key `{key}` in mapping");
        }
    }
    Ok(JsonValue::Object(map))
}

// Value of a bare `key:` heading: a deeper block, a sequence at the same
// indent, or null when nothing is nested.
fn parse_nested_value(lines: &[Line<'_>], idx: &mut usize, indent: usize) -> Result<JsonValue> {
    match lines.get(*idx) {
        Some(line) if line.indent == indent && is_sequence_entry(line.content) => {
            parse_sequence(lines, idx, indent)
        }
        Some(line) if line.indent > indent => parse_node(lines, idx, line.indent),
        _ => Ok(JsonValue::Null),
    }
}

fn parse_scalar(text: &str) -> Result<JsonValue> {
    let trimmed = text.trim();
    if let Some(flow) = parse_flow(trimmed)? {
        return Ok(flow);
    }
    if trimmed.starts_with('"') || trimmed.starts_with('\'') {
        return Ok(JsonValue::String(decode_string(trimmed)?));
    }
    if trimmed == "~" || trimmed.eq_ignore_ascii_case("null") {
        return Ok(JsonValue::Null);
    }
    if trimmed == "true" {
        return Ok(JsonValue::Bool(true));
    }
    if trimmed == "false" {
        return Ok(JsonValue::Bool(false));
    }
    if is_canonical_int(trimmed) {
        if let Ok(number) = trimmed.parse::<i64>() {
            return Ok(JsonValue::Number(number.into()));
        }
    }
    if looks_numeric(trimmed) {
        if let Ok(number) = trimmed.parse::<f64>() {
            if let Some(number) = Number::from_f64(number) {
                return Ok(JsonValue::Number(number));
            }
        }
    }
    Ok(JsonValue::String(trimmed.to_string()))
}

// Leading zeros stay strings: `00001` is a name, not the number one.
fn is_canonical_int(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
}

fn looks_numeric(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    body.chars().next().is_some_and(|c| c.is_ascii_digit())
}

// Flow forms: `{}`, `[]`, and single-level `[a, b]` sequences.
fn parse_flow(text: &str) -> Result<Option<JsonValue>> {
    if text == "{}" {
        return Ok(Some(JsonValue::Object(JsonMap::new())));
    }
    if !text.starts_with('[') {
        return Ok(None);
    }
    if !text.ends_with(']') {
        bail!("unterminated flow sequence `{text}`");
    }
    let inner = text[1..text.len() - 1].trim();
    let mut items = Vec::new();
    if !inner.is_empty() {
        for entry in inner.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            items.push(parse_scalar(entry)?);
        }
    }
    Ok(Some(JsonValue::Array(items)))
}

fn decode_key(raw: &str) -> Result<String> {
    if raw.starts_with('"') || raw.starts_with('\'') {
        decode_string(raw)
    } else {
        Ok(raw.to_string())
    }
}

fn decode_string(raw: &str) -> Result<String> {
    let (quote, body) = match raw.chars().next() {
        Some(c @ ('"' | '\'')) => (c, &raw[1..]),
        _ => return Ok(raw.to_string()),
    };
    let Some(body) = body.strip_suffix(quote) else {
        bail!("unterminated string literal `{raw}`");
    };
    if quote == '\'' {
        return Ok(body.replace("''", "'"));
    }
    let mut result = String::new();
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            let next = chars.next().ok_or_else(|| anyhow!("incomplete escape"))?;
            match next {
                'n' => result.push('\n'),
                'r' => result.push('\r'),
                't' => result.push('\t'),
                '"' => result.push('"'),
                '\\' => result.push('\\'),
                other => bail!("unsupported escape `\\{other}`"),
            }
        } else {
            result.push(ch);
        }
    }
    Ok(result)
}

/// Emit a document with a `---` start marker and sorted keys.
pub fn emit_document(value: &JsonValue) -> String {
    let mut out = String::from("---\n");
    match inline_form(value) {
        Some(inline) => {
            out.push_str(&inline);
            out.push('\n');
        }
        None => emit_block(&mut out, value, 0),
    }
    out
}

fn emit_block(out: &mut String, value: &JsonValue, indent: usize) {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                emit_entry(out, &" ".repeat(indent), key, &map[key], indent + 2);
            }
        }
        JsonValue::Array(items) => emit_array(out, items, indent),
        scalar => {
            let _ = writeln!(out, "{}{}", " ".repeat(indent), emit_scalar(scalar));
        }
    }
}

fn emit_entry(out: &mut String, prefix: &str, key: &str, value: &JsonValue, child_indent: usize) {
    let key = quote_if_needed(key);
    match inline_form(value) {
        Some(inline) => {
            let _ = writeln!(out, "{prefix}{key}: {inline}");
        }
        None => {
            let _ = writeln!(out, "{prefix}{key}:");
            emit_block(out, value, child_indent);
        }
    }
}

fn emit_array(out: &mut String, items: &[JsonValue], indent: usize) {
    let pad = " ".repeat(indent);
    for item in items {
        match inline_form(item) {
            Some(inline) => {
                let _ = writeln!(out, "{pad}- {inline}");
            }
            None => match item {
                JsonValue::Object(map) => {
                    let mut keys: Vec<&String> = map.keys().collect();
                    keys.sort();
                    let mut first = true;
                    for key in keys {
                        let prefix = if first {
                            format!("{pad}- ")
                        } else {
                            " ".repeat(indent + 2)
                        };
                        first = false;
                        emit_entry(out, &prefix, key, &map[key], indent + 4);
                    }
                }
                JsonValue::Array(inner) => {
                    let _ = writeln!(out, "{pad}-");
                    emit_array(out, inner, indent + 2);
                }
                _ => unreachable!("scalars always have an inline form"),
            },
        }
    }
}

fn inline_form(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Object(map) if map.is_empty() => Some("{}".to_string()),
        JsonValue::Array(items) if items.is_empty() => Some("[]".to_string()),
        JsonValue::Object(_) | JsonValue::Array(_) => None,
        scalar => Some(emit_scalar(scalar)),
    }
}

fn emit_scalar(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(true) => "true".to_string(),
        JsonValue::Bool(false) => "false".to_string(),
        JsonValue::Number(number) => number.to_string(),
        JsonValue::String(text) => quote_if_needed(text),
        JsonValue::Object(_) | JsonValue::Array(_) => unreachable!("containers are not scalars"),
    }
}

fn quote_if_needed(text: &str) -> String {
    if !needs_quoting(text) {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

fn needs_quoting(text: &str) -> bool {
    if text.is_empty()
        || text.starts_with(char::is_whitespace)
        || text.ends_with(char::is_whitespace)
    {
        return true;
    }
    if text.contains('\n') || text.contains(" #") {
        return true;
    }
    if mapping_key(text).is_some() || text.ends_with(':') {
        return true;
    }
    if is_sequence_entry(text) {
        return true;
    }
    if matches!(
        text.chars().next(),
        Some('"' | '\'' | '[' | '{' | '#' | '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`')
    ) {
        return true;
    }
    if text == "~" || text.eq_ignore_ascii_case("null") || text == "true" || text == "false" {
        return true;
    }
    // anything a reparse would read back as a number
    text.parse::<i64>().is_ok() || text.parse::<f64>().is_ok()
}
