//! [RDF 1.1 JSON Alternate Serialization](https://www.w3.org/TR/rdf-json/), also known as
//! RDF/JSON resource-centric.
//!
//! ```json
//! {"http://example.com/s": {"http://example.com/p": [{"type": "literal", "value": "o"}]}}
//! ```

use crate::dispatch::{GraphParser, GraphSerializer};
use crate::iri::IriResolver;
use crate::json::read_json;
use crate::options::ParseOptions;
use crate::sink::TripleSink;
use rdf_convert_common::{ConvertError, ConvertResult, MalformedInputError};
use rdf_convert_model::vocab::xsd;
use rdf_convert_model::{
    BlankNode, Graph, Literal, NamedNode, Subject, SubjectRef, Term, TermRef, Triple,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Write;

const FORMAT: &str = "json";

pub(crate) struct RdfJsonParser;

impl GraphParser for RdfJsonParser {
    fn parse(&self, input: &[u8], options: &ParseOptions) -> ConvertResult<Graph> {
        let Value::Object(subjects) = read_json(FORMAT, input)? else {
            return Err(malformed("The root of a RDF/JSON document must be an object"));
        };
        let mut reader = RdfJsonReader {
            iris: IriResolver::new(options.base_iri())?,
            sink: TripleSink::new(options.budget()),
            blank_nodes: HashMap::new(),
        };
        for (subject, predicates) in &subjects {
            let subject = reader.subject(subject)?;
            let Value::Object(predicates) = predicates else {
                return Err(malformed(format!(
                    "The description of {subject} must be an object"
                )));
            };
            for (predicate, objects) in predicates {
                let predicate = reader.iri(predicate)?;
                let Value::Array(objects) = objects else {
                    return Err(malformed(format!(
                        "The values of {subject} {predicate} must be an array"
                    )));
                };
                for object in objects {
                    let object = reader.object(object)?;
                    reader
                        .sink
                        .push(Triple::new(subject.clone(), predicate.clone(), object))?;
                }
            }
        }
        Ok(reader.sink.finish())
    }
}

struct RdfJsonReader<'a> {
    iris: IriResolver,
    sink: TripleSink<'a>,
    blank_nodes: HashMap<String, BlankNode>,
}

impl RdfJsonReader<'_> {
    fn subject(&mut self, value: &str) -> ConvertResult<Subject> {
        Ok(match value.strip_prefix("_:") {
            Some(label) => self.blank_node(label).into(),
            None => self.iri(value)?.into(),
        })
    }

    fn iri(&self, value: &str) -> ConvertResult<NamedNode> {
        self.iris.resolve(value).map_err(malformed)
    }

    fn blank_node(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.blank_nodes.get(label) {
            return node.clone();
        }
        let node = self.sink.graph_mut().fresh_blank_node();
        self.blank_nodes.insert(label.to_owned(), node.clone());
        node
    }

    fn object(&mut self, object: &Value) -> ConvertResult<Term> {
        let Value::Object(object) = object else {
            return Err(malformed(format!("Invalid RDF/JSON value: {object}")));
        };
        let value = string_entry(object, "value")?
            .ok_or_else(|| malformed("A RDF/JSON value must have a 'value' key"))?;
        match string_entry(object, "type")? {
            Some("uri") => Ok(self.iri(value)?.into()),
            Some("bnode") => Ok(self
                .blank_node(value.strip_prefix("_:").unwrap_or(value))
                .into()),
            Some("literal") => {
                if let Some(language) = string_entry(object, "lang")? {
                    return Literal::new_language_tagged_literal(value, language)
                        .map(Term::from)
                        .map_err(|error| {
                            malformed(format!("Invalid language tag '{language}': {error}"))
                        });
                }
                Ok(match string_entry(object, "datatype")? {
                    Some(datatype) => {
                        Literal::new_typed_literal(value, self.iri(datatype)?).into()
                    }
                    None => Literal::new_simple_literal(value).into(),
                })
            }
            Some(kind) => Err(malformed(format!("Unknown RDF/JSON value type '{kind}'"))),
            None => Err(malformed("A RDF/JSON value must have a 'type' key")),
        }
    }
}

fn string_entry<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> ConvertResult<Option<&'a str>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(value) => Err(malformed(format!(
            "The '{key}' entry must be a string, found {value}"
        ))),
    }
}

fn malformed(message: impl Into<String>) -> ConvertError {
    MalformedInputError::msg(FORMAT, message).into()
}

pub(crate) struct RdfJsonSerializer;

impl GraphSerializer for RdfJsonSerializer {
    fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> ConvertResult<()> {
        serde_json::to_writer_pretty(&mut *writer, &rdf_json_value(graph))
            .map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Builds the RDF/JSON structure of `graph`.
///
/// Statements are grouped by subject then predicate, both in first-occurrence order.
pub fn rdf_json_value(graph: &Graph) -> Value {
    let mut subjects = Map::new();
    for triple in graph {
        let predicates = subjects
            .entry(subject_key(triple.subject.as_ref()))
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(predicates) = predicates else {
            continue;
        };
        let objects = predicates
            .entry(triple.predicate.as_str())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(objects) = objects {
            objects.push(object_to_json(triple.object.as_ref()));
        }
    }
    Value::Object(subjects)
}

fn subject_key(subject: SubjectRef<'_>) -> String {
    match subject {
        SubjectRef::BlankNode(node) => format!("_:{}", node.as_str()),
        SubjectRef::NamedNode(node) => node.as_str().to_owned(),
        #[allow(unreachable_patterns, reason = "RDF-star triple terms")]
        subject => subject.to_string(),
    }
}

fn object_to_json(object: TermRef<'_>) -> Value {
    let mut value = Map::new();
    match object {
        TermRef::NamedNode(node) => {
            value.insert("type".to_owned(), "uri".into());
            value.insert("value".to_owned(), node.as_str().into());
        }
        TermRef::BlankNode(node) => {
            value.insert("type".to_owned(), "bnode".into());
            value.insert("value".to_owned(), format!("_:{}", node.as_str()).into());
        }
        TermRef::Literal(literal) => {
            value.insert("type".to_owned(), "literal".into());
            value.insert("value".to_owned(), literal.value().into());
            if let Some(language) = literal.language() {
                value.insert("lang".to_owned(), language.into());
            } else if literal.datatype() != xsd::STRING {
                value.insert("datatype".to_owned(), literal.datatype().as_str().into());
            }
        }
        #[allow(unreachable_patterns, reason = "RDF-star triple terms")]
        object => {
            value.insert("type".to_owned(), "uri".into());
            value.insert("value".to_owned(), object.to_string().into());
        }
    }
    Value::Object(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resource_centric_document() -> ConvertResult<()> {
        let graph = RdfJsonParser.parse(
            br#"{
                "http://example.com/alice": {
                    "http://example.com/name": [
                        {"type": "literal", "value": "Alice", "lang": "en"},
                        {"type": "literal", "value": "42", "datatype": "http://www.w3.org/2001/XMLSchema#integer"}
                    ],
                    "http://example.com/knows": [{"type": "bnode", "value": "_:b0"}]
                },
                "_:b0": {"http://example.com/knows": [{"type": "uri", "value": "http://example.com/alice"}]}
            }"#,
            &ParseOptions::new(),
        )?;
        assert_eq!(graph.len(), 4);
        assert_eq!(
            graph.triples()[0].object,
            Term::from(Literal::new_language_tagged_literal_unchecked("Alice", "en"))
        );
        assert_eq!(
            graph.triples()[2].object,
            Term::from(graph.triples()[3].subject.clone())
        );
        Ok(())
    }

    #[test]
    fn invalid_value_type() {
        let result = RdfJsonParser.parse(
            br#"{"http://example.com/s": {"http://example.com/p": [{"type": "thing", "value": "x"}]}}"#,
            &ParseOptions::new(),
        );
        assert!(matches!(result, Err(ConvertError::MalformedInput(_))));
    }

    #[test]
    fn serialize_groups_by_subject() -> ConvertResult<()> {
        let s = NamedNode::new_unchecked("http://example.com/s");
        let p = NamedNode::new_unchecked("http://example.com/p");
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            s.clone(),
            p.clone(),
            Literal::new_simple_literal("a"),
        ));
        graph.insert(Triple::new(
            BlankNode::new_unchecked("x"),
            p.clone(),
            s.clone(),
        ));
        graph.insert(Triple::new(
            s,
            p,
            Literal::new_typed_literal("1", xsd::INTEGER),
        ));

        let mut output = Vec::new();
        RdfJsonSerializer.serialize_to(&graph, &mut output)?;
        let expected = r#"{
  "http://example.com/s": {
    "http://example.com/p": [
      {
        "type": "literal",
        "value": "a"
      },
      {
        "type": "literal",
        "value": "1",
        "datatype": "http://www.w3.org/2001/XMLSchema#integer"
      }
    ]
  },
  "_:x": {
    "http://example.com/p": [
      {
        "type": "uri",
        "value": "http://example.com/s"
      }
    ]
  }
}
"#;
        assert_eq!(String::from_utf8_lossy(&output), expected);
        Ok(())
    }
}
