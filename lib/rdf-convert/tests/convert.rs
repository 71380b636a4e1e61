#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use rdf_convert::error::ConvertError;
use rdf_convert::format::FormatHint;
use rdf_convert::io::{parse, serialize, ParseOptions};
use rdf_convert::model::vocab::{rdf, xsd};
use rdf_convert::model::{BlankNode, Graph, Literal, NamedNode, Subject, Term, Triple};
use rdf_convert::{convert, default_registry, Converter};
use std::collections::HashSet;
use std::error::Error;

#[allow(clippy::non_ascii_literal)]
const DATA: &str = r#"
@prefix schema: <http://schema.org/> .
@prefix wd: <http://www.wikidata.org/entity/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

wd:Q90 a schema:City ;
    schema:name "Paris"@fr , "la ville lumière"@fr ;
    schema:country wd:Q142 ;
    schema:population 2000000 ;
    schema:startDate "-300"^^xsd:gYear ;
    schema:url "https://www.paris.fr/"^^xsd:anyURI ;
    schema:address [ schema:postalCode "75001" ] .
"#;
const NUMBER_OF_TRIPLES: usize = 9;

fn triples() -> Vec<Triple> {
    let paris = NamedNode::new_unchecked("http://www.wikidata.org/entity/Q90");
    let france = NamedNode::new_unchecked("http://www.wikidata.org/entity/Q142");
    let schema = |name: &str| NamedNode::new_unchecked(format!("http://schema.org/{name}"));
    let address = BlankNode::new_unchecked("address");
    vec![
        Triple::new(paris.clone(), rdf::TYPE, schema("City")),
        Triple::new(
            paris.clone(),
            schema("name"),
            Literal::new_language_tagged_literal_unchecked("Paris", "fr"),
        ),
        Triple::new(
            paris.clone(),
            schema("name"),
            Literal::new_language_tagged_literal_unchecked("la ville lumi\u{E8}re", "fr"),
        ),
        Triple::new(paris.clone(), schema("country"), france),
        Triple::new(
            paris.clone(),
            schema("population"),
            Literal::new_typed_literal("2000000", xsd::INTEGER),
        ),
        Triple::new(
            paris.clone(),
            schema("startDate"),
            Literal::new_typed_literal("-300", xsd::G_YEAR),
        ),
        Triple::new(
            paris.clone(),
            schema("url"),
            Literal::new_typed_literal("https://www.paris.fr/", xsd::ANY_URI),
        ),
        Triple::new(paris, schema("address"), address.clone()),
        Triple::new(
            address,
            schema("postalCode"),
            Literal::new_simple_literal("75001"),
        ),
    ]
}

fn expected_graph() -> Graph {
    triples().into_iter().collect()
}

fn load_data() -> Result<Graph, Box<dyn Error>> {
    Ok(parse(
        default_registry(),
        DATA.as_bytes(),
        "turtle",
        &ParseOptions::new(),
    )?)
}

#[test]
fn test_load_graph() -> Result<(), Box<dyn Error>> {
    let graph = load_data()?;
    assert_eq!(graph.len(), NUMBER_OF_TRIPLES);
    assert!(graph.is_isomorphic(&expected_graph()));
    assert_eq!(
        graph.prefixes().get("wd").map(String::as_str),
        Some("http://www.wikidata.org/entity/")
    );
    Ok(())
}

#[test]
fn test_round_trip_between_all_formats() -> Result<(), Box<dyn Error>> {
    let registry = default_registry();
    let graph = load_data()?;
    let formats = registry
        .iter()
        .filter(|f| f.has_parser() && f.has_serializer())
        .map(|f| f.name())
        .collect::<Vec<_>>();
    assert_eq!(formats.len(), 8);

    for from in &formats {
        let written = serialize(registry, &graph, from)?;
        let read = parse(registry, &written, from, &ParseOptions::new())?;
        assert!(
            read.is_isomorphic(&graph),
            "{from} round trip changed the graph:\n{}",
            String::from_utf8_lossy(&written)
        );
        for to in &formats {
            let converted = convert(registry, &written, &FormatHint::from(*from), to, None)?;
            let result = parse(registry, &converted, to, &ParseOptions::new())?;
            assert_eq!(result.len(), NUMBER_OF_TRIPLES, "{from} to {to}");
            assert!(result.is_isomorphic(&graph), "{from} to {to}");
        }
    }
    Ok(())
}

#[test]
fn test_serialization_is_deterministic() -> Result<(), Box<dyn Error>> {
    let registry = default_registry();
    let graph = load_data()?;
    for format in registry.list_serializable() {
        let first = serialize(registry, &graph, format.name())?;
        let second = serialize(registry, &graph.clone(), format.name())?;
        assert_eq!(first, second, "{} output is not deterministic", format.name());
    }
    Ok(())
}

#[test]
fn test_duplicates_are_kept() -> Result<(), Box<dyn Error>> {
    let statement = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .\n";
    let output = convert(
        default_registry(),
        statement.repeat(2).as_bytes(),
        &FormatHint::from("ntriples"),
        "nquads",
        None,
    )?;
    assert_eq!(output, statement.repeat(2).as_bytes());
    Ok(())
}

#[test]
fn test_guess_json_ld() -> Result<(), Box<dyn Error>> {
    let output = convert(
        default_registry(),
        br#"{"@context": {"ex": "http://example.com/"}, "@id": "ex:s", "ex:p": "o"}"#,
        &FormatHint::Guess,
        "ntriples",
        None,
    )?;
    assert_eq!(output, b"<http://example.com/s> <http://example.com/p> \"o\" .\n");
    Ok(())
}

#[test]
fn test_guess_rdf_xml() -> Result<(), Box<dyn Error>> {
    let output = convert(
        default_registry(),
        br#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.com/">
  <rdf:Description rdf:about="http://example.com/s">
    <ex:p>o</ex:p>
  </rdf:Description>
</rdf:RDF>"#,
        &FormatHint::Guess,
        "ntriples",
        None,
    )?;
    assert_eq!(output, b"<http://example.com/s> <http://example.com/p> \"o\" .\n");
    Ok(())
}

#[test]
fn test_guess_from_file_name() -> Result<(), Box<dyn Error>> {
    let output = convert(
        default_registry(),
        b"<s> <p> <o> .",
        &FormatHint::Guess,
        "nt",
        Some("http://example.com/data.ttl"),
    )?;
    assert_eq!(
        output,
        b"<http://example.com/s> <http://example.com/p> <http://example.com/o> .\n"
    );
    Ok(())
}

#[test]
fn test_guess_failure() {
    let result = convert(
        default_registry(),
        b"hello world",
        &FormatHint::Guess,
        "jsonld",
        Some("data.bin"),
    );
    assert!(matches!(
        result,
        Err(ConvertError::FormatGuessFailed { source_name: Some(name) }) if name == "data.bin"
    ));
}

#[test]
fn test_explicit_hint_is_never_overridden() {
    let result = convert(
        default_registry(),
        br#"{"@context": {}, "@id": "http://example.com/s"}"#,
        &FormatHint::from("turtle"),
        "ntriples",
        None,
    );
    assert!(matches!(result, Err(ConvertError::MalformedInput(e)) if e.format() == "turtle"));
}

#[test]
fn test_unknown_output_format_fails_before_parsing() {
    let result = convert(
        default_registry(),
        b"this is not turtle",
        &FormatHint::from("turtle"),
        "yaml",
        None,
    );
    assert!(matches!(result, Err(ConvertError::UnknownFormat(name)) if name == "yaml"));
}

#[test]
fn test_graphviz_is_output_only() {
    let result = convert(
        default_registry(),
        b"digraph {}",
        &FormatHint::from("dot"),
        "ntriples",
        None,
    );
    assert!(matches!(result, Err(ConvertError::NoParserForFormat(name)) if name == "dot"));
}

fn blank_nodes(triples: &[Triple]) -> HashSet<BlankNode> {
    triples
        .iter()
        .flat_map(|t| {
            let subject = match &t.subject {
                Subject::BlankNode(node) => Some(node.clone()),
                _ => None,
            };
            let object = match &t.object {
                Term::BlankNode(node) => Some(node.clone()),
                _ => None,
            };
            subject.into_iter().chain(object)
        })
        .collect()
}

#[test]
fn test_load_generates_new_blank_nodes() -> Result<(), Box<dyn Error>> {
    for (format, snippet, blank_node_count) in [
        (
            "ntriples",
            "_:b1 <http://example.com/p> <http://example.com/o> .",
            1,
        ),
        (
            "turtle",
            "@prefix ex: <http://example.com/> .\n_:b1 ex:p ex:o ; ex:q [ ex:r _:b1 ] .",
            2,
        ),
    ] {
        let mut converter = Converter::new(default_registry());
        let hint = FormatHint::from(format);
        for _ in 0..2 {
            converter.load(snippet.as_bytes(), &hint, None, &ParseOptions::new())?;
        }
        let graph = converter.into_graph();
        let (first, second) = graph.triples().split_at(graph.len() / 2);
        let first = blank_nodes(first);
        let second = blank_nodes(second);
        assert_eq!(first.len(), blank_node_count, "{format}");
        assert_eq!(second.len(), blank_node_count, "{format}");
        assert!(first.is_disjoint(&second), "{format} loads share blank nodes");
    }
    Ok(())
}

#[test]
fn test_json_ld_keeps_iris_whose_scheme_is_a_prefix() -> Result<(), Box<dyn Error>> {
    let registry = default_registry();
    let graph = parse(
        registry,
        br#"@prefix urn: <http://example.com/> .
<urn:isbn:1> <http://example.com/p> "o" ."#,
        "turtle",
        &ParseOptions::new(),
    )?;
    let written = serialize(registry, &graph, "jsonld")?;
    let read = parse(registry, &written, "jsonld", &ParseOptions::new())?;
    assert!(
        read.is_isomorphic(&graph),
        "JSON-LD round trip changed the graph:\n{}",
        String::from_utf8_lossy(&written)
    );
    assert_eq!(
        read.triples()[0].subject,
        Subject::NamedNode(NamedNode::new_unchecked("urn:isbn:1"))
    );
    Ok(())
}

#[test]
fn test_failed_load_leaves_graph_untouched() -> Result<(), Box<dyn Error>> {
    let mut converter = Converter::new(default_registry());
    let hint = FormatHint::from("ntriples");
    converter.load(
        b"<http://example.com/s> <http://example.com/p> <http://example.com/o> .",
        &hint,
        None,
        &ParseOptions::new(),
    )?;
    assert!(converter
        .load(
            b"<http://example.com/s> <http://example.com/p> <http://example.com/o> .\nbroken",
            &hint,
            None,
            &ParseOptions::new(),
        )
        .is_err());
    assert_eq!(converter.graph().len(), 1);
    Ok(())
}

#[test]
fn test_empty_input() -> Result<(), Box<dyn Error>> {
    for format in ["json", "jsonld", "turtle", "rdfxml"] {
        let output = convert(
            default_registry(),
            b"",
            &FormatHint::from(format),
            "ntriples",
            None,
        )?;
        assert!(output.is_empty(), "{format}");
    }
    Ok(())
}
