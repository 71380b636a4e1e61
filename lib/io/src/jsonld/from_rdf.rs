//! Writes a graph as a flat JSON-LD document.

use crate::compact::PrefixCompactor;
use rdf_convert_model::vocab::{rdf, xsd};
use rdf_convert_model::{Graph, NamedNodeRef, Subject, SubjectRef, Term, TermRef};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// The statements of one subject, grouped by predicate in first-occurrence order.
#[derive(Default)]
struct NodeObject<'a> {
    types: Vec<TermRef<'a>>,
    properties: Vec<(NamedNodeRef<'a>, Vec<TermRef<'a>>)>,
}

impl<'a> NodeObject<'a> {
    fn add(&mut self, predicate: NamedNodeRef<'a>, object: TermRef<'a>) {
        if predicate == rdf::TYPE && !object.is_literal() {
            self.types.push(object);
            return;
        }
        match self.properties.iter_mut().find(|(p, _)| *p == predicate) {
            Some((_, objects)) => objects.push(object),
            None => self.properties.push((predicate, vec![object])),
        }
    }
}

/// Builds `{"@context": {...}, "@graph": [...]}`, the context only holding the graph prefixes
/// that are used for compaction.
pub(super) fn graph_to_json(graph: &Graph) -> Value {
    let compactor = PrefixCompactor::new(graph.prefixes()).without_schemes_of(iris(graph));

    let mut subjects = HashMap::<SubjectRef<'_>, usize>::new();
    let mut nodes = Vec::<(SubjectRef<'_>, NodeObject<'_>)>::new();
    for triple in graph {
        let subject = triple.subject.as_ref();
        let index = *subjects.entry(subject).or_insert_with(|| {
            nodes.push((subject, NodeObject::default()));
            nodes.len() - 1
        });
        nodes[index]
            .1
            .add(triple.predicate.as_ref(), triple.object.as_ref());
    }

    let node_objects = nodes
        .into_iter()
        .map(|(subject, node)| node_to_json(subject, node, &compactor))
        .collect();

    let mut document = Map::new();
    let context = compactor
        .prefixes()
        .map(|(prefix, iri)| (prefix.to_owned(), Value::String(iri.to_owned())))
        .collect::<Map<_, _>>();
    if !context.is_empty() {
        document.insert("@context".to_owned(), Value::Object(context));
    }
    document.insert("@graph".to_owned(), Value::Array(node_objects));
    Value::Object(document)
}

/// Every IRI of the graph, datatypes included.
fn iris(graph: &Graph) -> impl Iterator<Item = &str> {
    graph.iter().flat_map(|triple| {
        let subject = match &triple.subject {
            Subject::NamedNode(node) => Some(node.as_str()),
            _ => None,
        };
        let object = match &triple.object {
            Term::NamedNode(node) => Some(node.as_str()),
            Term::Literal(literal) => Some(literal.datatype().as_str()),
            _ => None,
        };
        subject
            .into_iter()
            .chain([triple.predicate.as_str()])
            .chain(object)
    })
}

fn node_to_json(
    subject: SubjectRef<'_>,
    node: NodeObject<'_>,
    compactor: &PrefixCompactor<'_>,
) -> Value {
    let mut object = Map::new();
    let id = match subject {
        SubjectRef::NamedNode(node) => compactor.compact_or_full(node.as_str()),
        SubjectRef::BlankNode(node) => format!("_:{}", node.as_str()),
        #[allow(unreachable_patterns, reason = "RDF-star triple terms")]
        subject => subject.to_string(),
    };
    object.insert("@id".to_owned(), Value::String(id));
    if !node.types.is_empty() {
        let types = node
            .types
            .into_iter()
            .map(|class| Value::String(reference(class, compactor)))
            .collect();
        object.insert("@type".to_owned(), Value::Array(types));
    }
    for (predicate, objects) in node.properties {
        let values = objects
            .into_iter()
            .map(|value| value_to_json(value, compactor))
            .collect();
        object.insert(
            compactor.compact_or_full(predicate.as_str()),
            Value::Array(values),
        );
    }
    Value::Object(object)
}

fn value_to_json(term: TermRef<'_>, compactor: &PrefixCompactor<'_>) -> Value {
    let TermRef::Literal(literal) = term else {
        let mut object = Map::new();
        object.insert("@id".to_owned(), Value::String(reference(term, compactor)));
        return Value::Object(object);
    };
    if let Some(language) = literal.language() {
        let mut object = Map::new();
        object.insert("@value".to_owned(), Value::String(literal.value().to_owned()));
        object.insert("@language".to_owned(), Value::String(language.to_owned()));
        return Value::Object(object);
    }
    if literal.datatype() == xsd::STRING {
        return Value::String(literal.value().to_owned());
    }
    let mut object = Map::new();
    object.insert("@value".to_owned(), Value::String(literal.value().to_owned()));
    object.insert(
        "@type".to_owned(),
        Value::String(compactor.compact_or_full(literal.datatype().as_str())),
    );
    Value::Object(object)
}

fn reference(term: TermRef<'_>, compactor: &PrefixCompactor<'_>) -> String {
    match term {
        TermRef::NamedNode(node) => compactor.compact_or_full(node.as_str()),
        TermRef::BlankNode(node) => format!("_:{}", node.as_str()),
        term => Term::from(term).to_string(),
    }
}
