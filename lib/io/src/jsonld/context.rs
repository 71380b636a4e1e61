//! Processing of local JSON-LD contexts.

use crate::iri::IriResolver;
use rdf_convert_model::NamedNode;
use serde_json::{Map, Value};
use std::collections::HashMap;

const KEYWORDS: [&str; 20] = [
    "@base",
    "@container",
    "@context",
    "@direction",
    "@graph",
    "@id",
    "@import",
    "@included",
    "@index",
    "@json",
    "@language",
    "@list",
    "@nest",
    "@none",
    "@prefix",
    "@propagate",
    "@protected",
    "@reverse",
    "@set",
    "@type",
];
const EXTRA_KEYWORDS: [&str; 3] = ["@value", "@version", "@vocab"];

pub(super) fn is_keyword(value: &str) -> bool {
    KEYWORDS.contains(&value) || EXTRA_KEYWORDS.contains(&value)
}

/// Checks for an IRI with a scheme, like `http://example.com` or `urn:isbn:0451450523`.
pub(super) fn is_absolute_iri(value: &str) -> bool {
    value.split_once(':').is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Container {
    List,
    Set,
    Language,
}

/// How string values of a term are turned into RDF terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TypeMapping {
    /// `"@type": "@id"`, values are IRIs resolved against the base.
    Id,
    /// `"@type": "@vocab"`, values are terms or IRIs resolved against the vocabulary.
    Vocab,
    Datatype(NamedNode),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TermDefinition {
    /// An absolute IRI, a blank node identifier or a keyword. `None` if the term is mapped to
    /// `null`, which drops it.
    pub(super) id: Option<String>,
    pub(super) reverse: bool,
    pub(super) type_mapping: Option<TypeMapping>,
    /// `Some(None)` when the term explicitly has no language.
    pub(super) language: Option<Option<String>>,
    pub(super) container: Option<Container>,
}

/// The active context of a JSON-LD document.
#[derive(Debug, Clone, Default)]
pub(super) struct Context {
    initial_base: IriResolver,
    base: IriResolver,
    vocab: Option<String>,
    language: Option<String>,
    terms: HashMap<String, TermDefinition>,
}

impl Context {
    pub(super) fn new(base: IriResolver) -> Self {
        Self {
            initial_base: base.clone(),
            base,
            ..Self::default()
        }
    }

    pub(super) fn base(&self) -> &IriResolver {
        &self.base
    }

    pub(super) fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub(super) fn term(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term)
    }

    /// The term definitions that can be used as prefixes.
    pub(super) fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms.iter().filter_map(|(term, definition)| {
            let id = definition.id.as_deref()?;
            (!definition.reverse
                && !term.contains(':')
                && !is_keyword(id)
                && id.ends_with(['/', '#']))
            .then_some((term.as_str(), id))
        })
    }

    /// Returns the context resulting of applying the `@context` value `local` on this one.
    pub(super) fn process(&self, local: &Value) -> Result<Self, String> {
        match local {
            Value::Null => Ok(Self::new(self.initial_base.clone())),
            Value::Array(contexts) => contexts
                .iter()
                .try_fold(self.clone(), |context, local| context.process(local)),
            Value::Object(definitions) => {
                let mut result = self.clone();
                result.process_definitions(definitions)?;
                Ok(result)
            }
            Value::String(iri) => Err(format!(
                "The remote context '{iri}' can not be loaded, only local contexts are supported"
            )),
            _ => Err(format!("Invalid @context value: {local}")),
        }
    }

    fn process_definitions(&mut self, definitions: &Map<String, Value>) -> Result<(), String> {
        if let Some(base) = definitions.get("@base") {
            match base {
                Value::Null => self.base = IriResolver::default(),
                Value::String(iri) => self.base = self.base.rebase(iri)?,
                _ => return Err(format!("Invalid @base value: {base}")),
            }
        }
        if let Some(vocab) = definitions.get("@vocab") {
            self.vocab = match vocab {
                Value::Null => None,
                Value::String(vocab) => Some(
                    self.expand_iri(vocab, true, true)
                        .ok_or_else(|| format!("Invalid @vocab value: {vocab}"))?,
                ),
                _ => return Err(format!("Invalid @vocab value: {vocab}")),
            }
        }
        if let Some(language) = definitions.get("@language") {
            self.language = match language {
                Value::Null => None,
                Value::String(language) => Some(language.clone()),
                _ => return Err(format!("Invalid @language value: {language}")),
            }
        }

        let mut defined = HashMap::new();
        for term in definitions.keys() {
            if !term.starts_with('@') {
                self.define_term(definitions, term, &mut defined)?;
            }
        }
        Ok(())
    }

    /// Creates the definition of `term`, first defining the terms of the same local context it
    /// depends on.
    fn define_term(
        &mut self,
        definitions: &Map<String, Value>,
        term: &str,
        defined: &mut HashMap<String, bool>,
    ) -> Result<(), String> {
        match defined.get(term) {
            Some(true) => return Ok(()),
            Some(false) => return Err(format!("Cyclic IRI mapping for the term '{term}'")),
            None => (),
        }
        let Some(value) = definitions.get(term) else {
            return Ok(());
        };
        defined.insert(term.to_owned(), false);

        let definition = match value {
            Value::Null => TermDefinition::default(),
            Value::String(id) => TermDefinition {
                id: self.expand_dependency(definitions, id, defined)?,
                ..TermDefinition::default()
            },
            Value::Object(map) => self.expanded_definition(definitions, term, map, defined)?,
            _ => return Err(format!("Invalid definition for the term '{term}': {value}")),
        };
        self.terms.insert(term.to_owned(), definition);
        defined.insert(term.to_owned(), true);
        Ok(())
    }

    fn expanded_definition(
        &mut self,
        definitions: &Map<String, Value>,
        term: &str,
        map: &Map<String, Value>,
        defined: &mut HashMap<String, bool>,
    ) -> Result<TermDefinition, String> {
        let mut definition = TermDefinition::default();

        if let Some(reverse) = map.get("@reverse") {
            let Value::String(reverse) = reverse else {
                return Err(format!("Invalid @reverse value for the term '{term}'"));
            };
            definition.id = self.expand_dependency(definitions, reverse, defined)?;
            definition.reverse = true;
        } else {
            match map.get("@id") {
                Some(Value::Null) => (),
                Some(Value::String(id)) => {
                    definition.id = self.expand_dependency(definitions, id, defined)?;
                }
                Some(id) => return Err(format!("Invalid @id value for the term '{term}': {id}")),
                None if term.contains(':') => {
                    definition.id = self.expand_dependency(definitions, term, defined)?;
                }
                None => definition.id = self.vocab.as_ref().map(|vocab| format!("{vocab}{term}")),
            }
        }

        if let Some(type_mapping) = map.get("@type") {
            let Value::String(type_mapping) = type_mapping else {
                return Err(format!("Invalid @type value for the term '{term}'"));
            };
            definition.type_mapping = Some(match type_mapping.as_str() {
                "@id" => TypeMapping::Id,
                "@vocab" => TypeMapping::Vocab,
                datatype => TypeMapping::Datatype(
                    self.expand_dependency(definitions, datatype, defined)?
                        .filter(|iri| is_absolute_iri(iri))
                        .and_then(|iri| NamedNode::new(iri).ok())
                        .ok_or_else(|| {
                            format!("Invalid @type value for the term '{term}': {datatype}")
                        })?,
                ),
            });
        }

        match map.get("@language") {
            Some(Value::Null) => definition.language = Some(None),
            Some(Value::String(language)) => definition.language = Some(Some(language.clone())),
            Some(language) => {
                return Err(format!(
                    "Invalid @language value for the term '{term}': {language}"
                ))
            }
            None => (),
        }

        if let Some(container) = map.get("@container") {
            definition.container = parse_container(container)
                .ok_or_else(|| format!("Unsupported @container for the term '{term}'"))?;
        }
        Ok(definition)
    }

    /// Expands a value of a term definition, making sure that the term of the local context it
    /// refers to are defined first.
    fn expand_dependency(
        &mut self,
        definitions: &Map<String, Value>,
        value: &str,
        defined: &mut HashMap<String, bool>,
    ) -> Result<Option<String>, String> {
        let dependency = match value.split_once(':') {
            Some((prefix, suffix)) if !suffix.starts_with("//") => prefix,
            Some(_) => "",
            None => value,
        };
        if definitions.contains_key(dependency) && defined.get(dependency) != Some(&true) {
            self.define_term(definitions, dependency, defined)?;
        }
        Ok(self.expand_iri(value, true, false))
    }

    /// Expands a key or a value into an absolute IRI, a blank node identifier or a keyword.
    ///
    /// `vocab` allows terms and the `@vocab` mapping to be used, `document_relative` allows
    /// resolution against the base IRI. Returns `None` if `value` has no such expansion.
    pub(super) fn expand_iri(
        &self,
        value: &str,
        vocab: bool,
        document_relative: bool,
    ) -> Option<String> {
        if value.starts_with('@') {
            return is_keyword(value).then(|| value.to_owned());
        }
        if vocab {
            if let Some(definition) = self.terms.get(value) {
                return definition.id.clone();
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Some(value.to_owned());
            }
            if let Some(TermDefinition {
                id: Some(id),
                reverse: false,
                ..
            }) = self.terms.get(prefix)
            {
                if !is_keyword(id) {
                    return Some(format!("{id}{suffix}"));
                }
            }
            if is_absolute_iri(value) {
                return Some(value.to_owned());
            }
        }
        if vocab {
            if let Some(vocab) = &self.vocab {
                return Some(format!("{vocab}{value}"));
            }
        }
        if document_relative {
            return self.base.resolve(value).ok().map(|iri| iri.into_string());
        }
        None
    }
}

fn parse_container(value: &Value) -> Option<Option<Container>> {
    let container = |value: &Value| match value.as_str()? {
        "@list" => Some(Container::List),
        "@set" => Some(Container::Set),
        "@language" => Some(Container::Language),
        _ => None,
    };
    match value {
        Value::Null => Some(None),
        Value::Array(values) => match values.as_slice() {
            [] => Some(None),
            [value] => container(value).map(Some),
            _ => None,
        },
        value => container(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(local: Value) -> Context {
        Context::new(IriResolver::new(Some("http://example.com/doc")).unwrap())
            .process(&local)
            .unwrap()
    }

    #[test]
    fn terms_and_compact_iris() {
        let context = context(json!({
            "schema": "http://schema.org/",
            "name": "schema:name",
            "knows": {"@id": "schema:knows", "@type": "@id"},
            "age": {"@id": "schema:age", "@type": "xsd:integer"},
            "xsd": "http://www.w3.org/2001/XMLSchema#"
        }));
        assert_eq!(
            context.expand_iri("name", true, false).as_deref(),
            Some("http://schema.org/name")
        );
        assert_eq!(
            context.expand_iri("schema:email", true, false).as_deref(),
            Some("http://schema.org/email")
        );
        assert_eq!(
            context.term("knows").and_then(|d| d.type_mapping.clone()),
            Some(TypeMapping::Id)
        );
        assert_eq!(
            context.term("age").and_then(|d| d.type_mapping.clone()),
            Some(TypeMapping::Datatype(NamedNode::new_unchecked(
                "http://www.w3.org/2001/XMLSchema#integer"
            )))
        );
        assert_eq!(context.expand_iri("unknown", true, false), None);
        assert_eq!(
            context.expand_iri("other", false, true).as_deref(),
            Some("http://example.com/other")
        );
    }

    #[test]
    fn vocab_base_and_aliases() {
        let context = context(json!([
            {"@vocab": "http://example.org/vocab#", "@base": "http://example.org/data/"},
            {"id": "@id", "type": "@type", "@language": "en"}
        ]));
        assert_eq!(
            context.expand_iri("title", true, false).as_deref(),
            Some("http://example.org/vocab#title")
        );
        assert_eq!(context.expand_iri("id", true, false).as_deref(), Some("@id"));
        assert_eq!(
            context.expand_iri("alice", false, true).as_deref(),
            Some("http://example.org/data/alice")
        );
        assert_eq!(context.language(), Some("en"));
    }

    #[test]
    fn null_resets_the_context() {
        let context = context(json!([{"@vocab": "http://example.org/"}, null]));
        assert_eq!(context.expand_iri("title", true, false), None);
    }

    #[test]
    fn remote_and_cyclic_contexts_are_rejected() {
        let initial = Context::default();
        assert!(initial
            .process(&json!("http://schema.org/"))
            .unwrap_err()
            .contains("remote context"));
        assert!(initial
            .process(&json!({"a": "b:x", "b": "a:y"}))
            .unwrap_err()
            .contains("Cyclic"));
    }

    #[test]
    fn containers() {
        let context = context(json!({
            "items": {"@id": "http://example.com/items", "@container": "@list"},
            "label": {"@id": "http://example.com/label", "@container": ["@language"]}
        }));
        assert_eq!(
            context.term("items").and_then(|d| d.container),
            Some(Container::List)
        );
        assert_eq!(
            context.term("label").and_then(|d| d.container),
            Some(Container::Language)
        );
        assert!(Context::default()
            .process(&json!({"x": {"@id": "http://example.com/x", "@container": "@index"}}))
            .is_err());
    }
}
