//! Writes a JSON structure as a PHP source file returning the equivalent array.

use serde_json::Value;

const INDENT: &str = "    ";

/// `<?php\nreturn [...];\n`
pub fn php_document(value: &Value) -> String {
    let mut output = String::from("<?php\nreturn ");
    write_value(&mut output, value, 0);
    output.push_str(";\n");
    output
}

fn write_value(output: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => output.push_str("null"),
        Value::Bool(value) => output.push_str(if *value { "true" } else { "false" }),
        Value::Number(number) => output.push_str(&number.to_string()),
        Value::String(string) => write_string(output, string),
        Value::Array(items) => write_array(
            output,
            items.iter().map(|item| (None, item)),
            items.is_empty(),
            depth,
        ),
        Value::Object(entries) => write_array(
            output,
            entries.iter().map(|(key, item)| (Some(key.as_str()), item)),
            entries.is_empty(),
            depth,
        ),
    }
}

/// Lists are written without their implicit keys.
fn write_array<'a>(
    output: &mut String,
    entries: impl Iterator<Item = (Option<&'a str>, &'a Value)>,
    is_empty: bool,
    depth: usize,
) {
    if is_empty {
        output.push_str("[]");
        return;
    }
    output.push_str("[\n");
    for (key, value) in entries {
        for _ in 0..=depth {
            output.push_str(INDENT);
        }
        if let Some(key) = key {
            write_string(output, key);
            output.push_str(" => ");
        }
        write_value(output, value, depth + 1);
        output.push_str(",\n");
    }
    for _ in 0..depth {
        output.push_str(INDENT);
    }
    output.push(']');
}

/// Single quoted: only `\` and `'` are escaped.
fn write_string(output: &mut String, value: &str) {
    output.push('\'');
    for c in value.chars() {
        if matches!(c, '\\' | '\'') {
            output.push('\\');
        }
        output.push(c);
    }
    output.push('\'');
}
