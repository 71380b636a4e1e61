//! Turns an expanded walk of a JSON-LD document into triples.

use super::context::{is_keyword, Container, Context, TermDefinition, TypeMapping};
use crate::sink::TripleSink;
use rdf_convert_common::{ConvertError, ConvertResult, MalformedInputError};
use rdf_convert_model::vocab::{rdf, xsd};
use rdf_convert_model::{BlankNode, Graph, Literal, NamedNode, Subject, Term, Triple};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

const FORMAT: &str = "jsonld";

pub(super) struct RdfEmitter<'a> {
    sink: TripleSink<'a>,
    blank_nodes: HashMap<String, BlankNode>,
}

impl<'a> RdfEmitter<'a> {
    pub(super) fn new(sink: TripleSink<'a>) -> Self {
        Self {
            sink,
            blank_nodes: HashMap::new(),
        }
    }

    pub(super) fn finish(self) -> Graph {
        self.sink.finish()
    }

    pub(super) fn document(&mut self, document: &Value, context: &Context) -> ConvertResult<()> {
        match document {
            Value::Object(node) => self.top_level_node(node, context),
            Value::Array(nodes) => {
                for node in nodes {
                    if let Value::Object(node) = node {
                        self.top_level_node(node, context)?;
                    }
                }
                Ok(())
            }
            _ => Err(malformed("A JSON-LD document must be an object or an array")),
        }
    }

    fn top_level_node(
        &mut self,
        node: &Map<String, Value>,
        context: &Context,
    ) -> ConvertResult<()> {
        let local = local_context(node, context)?;
        // Free floating values and lists do not produce any triple
        let is_value = node.keys().any(|key| {
            matches!(
                local.expand_iri(key, true, false).as_deref(),
                Some("@value" | "@list")
            )
        });
        if !is_value {
            self.node(node, context)?;
        }
        Ok(())
    }

    /// Emits the triples of a node object and returns its identifier.
    ///
    /// Returns `None` if the node `@id` does not resolve to an absolute IRI.
    fn node(
        &mut self,
        node: &Map<String, Value>,
        context: &Context,
    ) -> ConvertResult<Option<Subject>> {
        let local;
        let context = if node.contains_key("@context") {
            local = local_context(node, context)?;
            &local
        } else {
            context
        };

        let mut id = None;
        let mut properties = Vec::new();
        for (key, value) in node {
            let Some(expanded) = context.expand_iri(key, true, false) else {
                continue;
            };
            if expanded == "@id" {
                id = Some(value);
            } else {
                properties.push((key.as_str(), expanded, value));
            }
        }

        let subject = match id {
            None => Subject::from(self.fresh_blank_node()),
            Some(Value::String(id)) => match self.reference(id, context, false) {
                Some(subject) => subject,
                None => return Ok(None),
            },
            Some(id) => return Err(malformed(format!("Invalid @id value: {id}"))),
        };

        for (key, expanded, value) in properties {
            match expanded.as_str() {
                "@type" => {
                    for class in as_array(value) {
                        let Value::String(class) = class else {
                            return Err(malformed(format!("Invalid @type value: {class}")));
                        };
                        if let Some(class) = self.reference(class, context, true) {
                            self.emit(subject.clone(), rdf::TYPE.into_owned(), class)?;
                        }
                    }
                }
                "@reverse" => {
                    let Value::Object(reverse) = value else {
                        return Err(malformed(format!("Invalid @reverse value: {value}")));
                    };
                    self.reverse_properties(&subject, reverse, context)?;
                }
                "@graph" | "@included" => {
                    for node in as_array(value) {
                        if let Value::Object(node) = node {
                            self.node(node, context)?;
                        }
                    }
                }
                keyword if is_keyword(keyword) => (),
                iri => {
                    let Some(predicate) = iri_node(iri) else {
                        continue;
                    };
                    let definition = context.term(key).cloned().unwrap_or_default();
                    if definition.reverse {
                        for object in self.objects(value, &TermDefinition::default(), context)? {
                            if let Some(object) = as_subject(object) {
                                self.emit(object, predicate.clone(), subject.clone())?;
                            }
                        }
                    } else {
                        for object in self.property_objects(value, &definition, context)? {
                            self.emit(subject.clone(), predicate.clone(), object)?;
                        }
                    }
                }
            }
        }
        Ok(Some(subject))
    }

    fn reverse_properties(
        &mut self,
        subject: &Subject,
        reverse: &Map<String, Value>,
        context: &Context,
    ) -> ConvertResult<()> {
        for (key, value) in reverse {
            let Some(predicate) = context
                .expand_iri(key, true, false)
                .as_deref()
                .and_then(iri_node)
            else {
                continue;
            };
            for object in self.objects(value, &TermDefinition::default(), context)? {
                if let Some(object) = as_subject(object) {
                    self.emit(object, predicate.clone(), subject.clone())?;
                }
            }
        }
        Ok(())
    }

    /// The objects of a property value, taking the container of the property into account.
    fn property_objects(
        &mut self,
        value: &Value,
        definition: &TermDefinition,
        context: &Context,
    ) -> ConvertResult<Vec<Term>> {
        match (definition.container, value) {
            (Some(Container::List), value) if !is_list_object(value, context) => {
                let items = as_array(value).cloned().collect::<Vec<_>>();
                Ok(vec![self.list(&items, definition, context)?])
            }
            (Some(Container::Language), Value::Object(languages)) => {
                let mut objects = Vec::new();
                for (language, values) in languages {
                    for value in as_array(values) {
                        match value {
                            Value::Null => (),
                            Value::String(value) if language == "@none" => {
                                objects.push(Literal::new_simple_literal(value).into());
                            }
                            Value::String(value) => {
                                objects.push(language_literal(value, language)?);
                            }
                            value => {
                                return Err(malformed(format!(
                                    "Invalid language map value: {value}"
                                )))
                            }
                        }
                    }
                }
                Ok(objects)
            }
            _ => self.objects(value, definition, context),
        }
    }

    fn objects(
        &mut self,
        value: &Value,
        definition: &TermDefinition,
        context: &Context,
    ) -> ConvertResult<Vec<Term>> {
        let mut objects = Vec::new();
        self.collect_objects(value, definition, context, &mut objects)?;
        Ok(objects)
    }

    fn collect_objects(
        &mut self,
        value: &Value,
        definition: &TermDefinition,
        context: &Context,
        objects: &mut Vec<Term>,
    ) -> ConvertResult<()> {
        match value {
            Value::Null => (),
            Value::Array(values) => {
                for value in values {
                    self.collect_objects(value, definition, context, objects)?;
                }
            }
            Value::String(value) => {
                objects.extend(self.string_object(value, definition, context)?);
            }
            Value::Bool(value) => objects.push(native_literal(
                if *value { "true" } else { "false" },
                xsd::BOOLEAN,
                definition,
            )),
            Value::Number(number) => objects.push(number_literal(number, definition)),
            Value::Object(object) => {
                let keys = object
                    .keys()
                    .filter_map(|key| Some((context.expand_iri(key, true, false)?, key)))
                    .collect::<HashMap<_, _>>();
                if keys.contains_key("@value") {
                    objects.extend(self.value_object(object, &keys, context)?);
                } else if let Some(list) = keys.get("@list") {
                    let items = as_array(&object[*list]).cloned().collect::<Vec<_>>();
                    objects.push(self.list(&items, definition, context)?);
                } else if let Some(set) = keys.get("@set") {
                    self.collect_objects(&object[*set], definition, context, objects)?;
                } else if let Some(subject) = self.node(object, context)? {
                    objects.push(subject.into());
                }
            }
        }
        Ok(())
    }

    fn string_object(
        &mut self,
        value: &str,
        definition: &TermDefinition,
        context: &Context,
    ) -> ConvertResult<Option<Term>> {
        Ok(match &definition.type_mapping {
            Some(TypeMapping::Id) => self.reference(value, context, false).map(Term::from),
            Some(TypeMapping::Vocab) => self.reference(value, context, true).map(Term::from),
            Some(TypeMapping::Datatype(datatype)) => {
                Some(Literal::new_typed_literal(value, datatype.clone()).into())
            }
            None => {
                let language = match &definition.language {
                    Some(language) => language.as_deref(),
                    None => context.language(),
                };
                Some(match language {
                    Some(language) => language_literal(value, language)?,
                    None => Literal::new_simple_literal(value).into(),
                })
            }
        })
    }

    fn value_object(
        &mut self,
        object: &Map<String, Value>,
        keys: &HashMap<String, &String>,
        context: &Context,
    ) -> ConvertResult<Option<Term>> {
        let entry = |keyword: &str| keys.get(keyword).map(|key| &object[key.as_str()]);
        let datatype = match entry("@type") {
            Some(Value::String(datatype)) => Some(
                context
                    .expand_iri(datatype, true, true)
                    .filter(|iri| !is_keyword(iri) && !iri.starts_with("_:"))
                    .and_then(|iri| NamedNode::new(iri).ok())
                    .ok_or_else(|| malformed(format!("Invalid @type value: {datatype}")))?,
            ),
            Some(datatype) => return Err(malformed(format!("Invalid @type value: {datatype}"))),
            None => None,
        };
        let language = match entry("@language") {
            Some(Value::String(language)) => Some(language.as_str()),
            Some(Value::Null) | None => None,
            Some(language) => {
                return Err(malformed(format!("Invalid @language value: {language}")))
            }
        };
        let lexical = match entry("@value") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(value)) => value.clone(),
            Some(Value::Bool(value)) if datatype.is_some() => value.to_string(),
            Some(Value::Number(number)) if datatype.is_some() => number.to_string(),
            Some(Value::Bool(value)) => {
                return Ok(Some(
                    Literal::new_typed_literal(value.to_string(), xsd::BOOLEAN).into(),
                ))
            }
            Some(Value::Number(number)) => {
                return Ok(Some(number_literal(number, &TermDefinition::default())))
            }
            Some(value) => return Err(malformed(format!("Invalid @value value: {value}"))),
        };
        Ok(Some(match (datatype, language) {
            (Some(datatype), _) => Literal::new_typed_literal(lexical, datatype).into(),
            (None, Some(language)) => language_literal(&lexical, language)?,
            (None, None) => Literal::new_simple_literal(lexical).into(),
        }))
    }

    /// Emits an RDF collection and returns its head.
    fn list(
        &mut self,
        items: &[Value],
        definition: &TermDefinition,
        context: &Context,
    ) -> ConvertResult<Term> {
        let mut objects = Vec::new();
        for item in items {
            if is_list_object(item, context) || !item.is_array() {
                self.collect_objects(item, definition, context, &mut objects)?;
            } else {
                // A nested array is a list of lists
                let nested = as_array(item).cloned().collect::<Vec<_>>();
                objects.push(self.list(&nested, definition, context)?);
            }
        }

        let nodes = objects
            .iter()
            .map(|_| self.fresh_blank_node())
            .collect::<Vec<_>>();
        for (i, object) in objects.into_iter().enumerate() {
            let rest: Term = nodes
                .get(i + 1)
                .map_or_else(|| rdf::NIL.into_owned().into(), |node| node.clone().into());
            self.emit(nodes[i].clone().into(), rdf::FIRST.into_owned(), object)?;
            self.emit(nodes[i].clone().into(), rdf::REST.into_owned(), rest)?;
        }
        Ok(nodes
            .first()
            .map_or_else(|| rdf::NIL.into_owned().into(), |node| node.clone().into()))
    }

    /// Resolves a node reference: `_:` blank node identifiers or IRIs.
    fn reference(&mut self, value: &str, context: &Context, vocab: bool) -> Option<Subject> {
        if let Some(label) = value.strip_prefix("_:") {
            return Some(self.blank_node(label).into());
        }
        let iri = context.expand_iri(value, vocab, true)?;
        if let Some(label) = iri.strip_prefix("_:") {
            return Some(self.blank_node(label).into());
        }
        iri_node(&iri).map(Subject::from)
    }

    /// Document blank node labels are all renamed, so they never clash with generated ones.
    fn blank_node(&mut self, label: &str) -> BlankNode {
        if let Some(node) = self.blank_nodes.get(label) {
            return node.clone();
        }
        let node = self.fresh_blank_node();
        self.blank_nodes.insert(label.to_owned(), node.clone());
        node
    }

    fn fresh_blank_node(&mut self) -> BlankNode {
        self.sink.graph_mut().fresh_blank_node()
    }

    fn emit(
        &mut self,
        subject: Subject,
        predicate: NamedNode,
        object: impl Into<Term>,
    ) -> ConvertResult<()> {
        self.sink.push(Triple::new(subject, predicate, object))
    }
}

fn local_context(node: &Map<String, Value>, context: &Context) -> ConvertResult<Context> {
    match node.get("@context") {
        Some(local) => context.process(local).map_err(malformed),
        None => Ok(context.clone()),
    }
}

/// Only absolute IRIs are kept as predicates and node identifiers.
fn iri_node(iri: &str) -> Option<NamedNode> {
    if is_keyword(iri) || iri.starts_with("_:") || !super::context::is_absolute_iri(iri) {
        return None;
    }
    NamedNode::new(iri).ok()
}

fn as_subject(term: Term) -> Option<Subject> {
    match term {
        Term::NamedNode(node) => Some(node.into()),
        Term::BlankNode(node) => Some(node.into()),
        _ => None,
    }
}

fn as_array(value: &Value) -> impl Iterator<Item = &Value> {
    match value {
        Value::Array(values) => values.iter(),
        value => std::slice::from_ref(value).iter(),
    }
}

fn is_list_object(value: &Value, context: &Context) -> bool {
    value.as_object().is_some_and(|object| {
        object
            .keys()
            .any(|key| context.expand_iri(key, true, false).as_deref() == Some("@list"))
    })
}

fn language_literal(value: &str, language: &str) -> ConvertResult<Term> {
    Literal::new_language_tagged_literal(value, language)
        .map(Term::from)
        .map_err(|error| malformed(format!("Invalid language tag '{language}': {error}")))
}

fn native_literal(
    lexical: &str,
    datatype: rdf_convert_model::NamedNodeRef<'_>,
    definition: &TermDefinition,
) -> Term {
    match &definition.type_mapping {
        Some(TypeMapping::Datatype(coerced)) => {
            Literal::new_typed_literal(lexical, coerced.clone()).into()
        }
        _ => Literal::new_typed_literal(lexical, datatype).into(),
    }
}

/// Integers become `xsd:integer`, other numbers `xsd:double` in their canonical form.
fn number_literal(number: &Number, definition: &TermDefinition) -> Term {
    let coerced_double = matches!(
        &definition.type_mapping,
        Some(TypeMapping::Datatype(datatype)) if datatype.as_ref() == xsd::DOUBLE
    );
    if (number.is_i64() || number.is_u64()) && !coerced_double {
        return native_literal(&number.to_string(), xsd::INTEGER, definition);
    }
    let value = number.as_f64().unwrap_or_default();
    native_literal(&canonical_double(value), xsd::DOUBLE, definition)
}

/// Formats a double like `1.1E0`, `1.0E10` or `-2.5E-3`.
pub(super) fn canonical_double(value: f64) -> String {
    let formatted = format!("{value:E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => formatted,
    }
}

fn malformed(message: impl Into<String>) -> ConvertError {
    MalformedInputError::msg(FORMAT, message).into()
}
