//! Content based format guessing.

/// Only the beginning of the content is inspected.
pub const SNIFF_LENGTH: usize = 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Guesses the registry name of a format from the first bytes of some content.
///
/// Returns `None` if no known signature is found.
///
/// ```
/// use rdf_convert_format::sniff;
///
/// assert_eq!(sniff(br#"{"@context": {}}"#), Some("jsonld"));
/// assert_eq!(sniff(b"<?xml version=\"1.0\"?>"), Some("rdfxml"));
/// assert_eq!(sniff(b"\x00\x01"), None);
/// ```
pub fn sniff(data: &[u8]) -> Option<&'static str> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let head = String::from_utf8_lossy(&data[..data.len().min(SNIFF_LENGTH)]);
    let trimmed = head.trim_start();

    if trimmed.starts_with('{') {
        return if ["\"@context\"", "\"@id\"", "\"@graph\""]
            .iter()
            .any(|keyword| head.contains(keyword))
        {
            Some("jsonld")
        } else {
            Some("json")
        };
    }
    if trimmed.starts_with('[') && (head.contains("\"@id\"") || head.contains("\"@context\"")) {
        return Some("jsonld");
    }
    if trimmed.starts_with("<?xml") || head.contains("<rdf:") {
        return Some("rdfxml");
    }
    if head.contains("@prefix")
        || head.contains("@base")
        || lines(&head).any(is_sparql_directive)
    {
        return Some("turtle");
    }
    if lines(&head).any(is_ntriples_statement) {
        return Some("ntriples");
    }
    None
}

/// Non-empty, non-comment lines with their leading whitespace removed.
fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn is_sparql_directive(line: &str) -> bool {
    ["PREFIX", "BASE"].iter().any(|keyword| {
        line.get(..keyword.len())
            .is_some_and(|start| start.eq_ignore_ascii_case(keyword))
            && line[keyword.len()..].starts_with(char::is_whitespace)
    })
}

/// `<iri> <iri>` or `_:label <iri>` at the start of the line.
fn is_ntriples_statement(line: &str) -> bool {
    let rest = if let Some(rest) = line.strip_prefix('<') {
        match rest.split_once('>') {
            Some((iri, rest))
                if !iri.is_empty()
                    && !iri.contains(char::is_whitespace)
                    && rest.starts_with(char::is_whitespace) =>
            {
                rest
            }
            _ => return false,
        }
    } else if let Some(rest) = line.strip_prefix("_:") {
        match rest.split_once(char::is_whitespace) {
            Some((label, rest)) if !label.is_empty() => rest,
            _ => return false,
        }
    } else {
        return false;
    };
    rest.trim_start()
        .strip_prefix('<')
        .is_some_and(|rest| rest.contains('>'))
}
