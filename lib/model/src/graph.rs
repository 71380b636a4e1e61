//! The in-memory triple graph a conversion works on.
//!
//! A [`Graph`] is a bag of triples: insertion order and duplicates are preserved, so that a
//! conversion passes statements through exactly as the source contained them.

use crate::blank_node::BlankNodeNamespace;
use oxrdf::dataset::CanonicalizationAlgorithm;
use oxrdf::{BlankNode, Dataset, GraphNameRef, Subject, Term, Triple};
use std::collections::{BTreeMap, HashMap};

/// An insertion-ordered sequence of triples.
///
/// Besides the triples, a graph records the prefixes and the base IRI declared by the documents it
/// was parsed from, and the blank node identifiers it has handed out.
///
/// ```
/// use rdf_convert_model::{Graph, NamedNode, Triple};
///
/// let ex = NamedNode::new("http://example.com/s")?;
/// let mut graph = Graph::new();
/// graph.insert(Triple::new(ex.clone(), ex.clone(), ex.clone()));
/// graph.insert(Triple::new(ex.clone(), ex.clone(), ex));
/// assert_eq!(graph.len(), 2);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    prefixes: BTreeMap<String, String>,
    base_iri: Option<String>,
    blank_nodes: BlankNodeNamespace,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }

    /// Appends a triple as is.
    ///
    /// Blank nodes of the triple are recorded in the graph namespace, so that later merges never
    /// reuse their identifiers.
    pub fn insert(&mut self, triple: Triple) {
        if let Subject::BlankNode(node) = &triple.subject {
            self.blank_nodes.reserve(node.as_str());
        }
        if let Term::BlankNode(node) = &triple.object {
            self.blank_nodes.reserve(node.as_str());
        }
        self.triples.push(triple);
    }

    /// Returns a blank node that is not used anywhere in this graph.
    pub fn fresh_blank_node(&mut self) -> BlankNode {
        self.blank_nodes.fresh()
    }

    /// The prefix mappings, ordered by prefix.
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// Binds `prefix` to `iri`, replacing any previous binding.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    pub fn set_base_iri(&mut self, base_iri: impl Into<String>) {
        self.base_iri = Some(base_iri.into());
    }

    /// Moves all the triples of `other` at the end of this graph.
    ///
    /// Every blank node of `other` is renamed through a substitution table local to this call to
    /// an identifier freshly issued by this graph. Two blank nodes sharing a label in `other` stay
    /// the same node, but none of them can be confused with a blank node already in `self`.
    ///
    /// Prefixes of `other` are only added if `self` does not bind them yet and the base IRI of
    /// `other` is only kept if `self` has none.
    ///
    /// ```
    /// use rdf_convert_model::{BlankNode, Graph, NamedNode, Triple};
    ///
    /// let p = NamedNode::new("http://example.com/p")?;
    /// let mut first = Graph::new();
    /// first.insert(Triple::new(BlankNode::new("b1")?, p.clone(), p.clone()));
    /// let mut second = Graph::new();
    /// second.insert(Triple::new(BlankNode::new("b1")?, p.clone(), p));
    ///
    /// let mut merged = Graph::new();
    /// merged.merge(first);
    /// merged.merge(second);
    /// assert_ne!(merged.triples()[0].subject, merged.triples()[1].subject);
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn merge(&mut self, other: Self) {
        let Self {
            triples,
            prefixes,
            base_iri,
            ..
        } = other;

        let mut renaming = HashMap::new();
        self.triples.reserve(triples.len());
        for triple in triples {
            let subject = match triple.subject {
                Subject::BlankNode(node) => {
                    Subject::BlankNode(rename(&mut self.blank_nodes, &mut renaming, node))
                }
                subject => subject,
            };
            let object = match triple.object {
                Term::BlankNode(node) => {
                    Term::BlankNode(rename(&mut self.blank_nodes, &mut renaming, node))
                }
                object => object,
            };
            self.triples
                .push(Triple::new(subject, triple.predicate, object));
        }

        for (prefix, iri) in prefixes {
            self.prefixes.entry(prefix).or_insert(iri);
        }
        if self.base_iri.is_none() {
            self.base_iri = base_iri;
        }
    }

    /// Checks if the two graphs contain the same triples, up to blank node renaming.
    ///
    /// Graphs are compared as bags: each triple must occur the same number of times in both.
    pub fn is_isomorphic(&self, other: &Self) -> bool {
        self.len() == other.len() && canonical_counts(self) == canonical_counts(other)
    }
}

fn rename(
    namespace: &mut BlankNodeNamespace,
    renaming: &mut HashMap<BlankNode, BlankNode>,
    node: BlankNode,
) -> BlankNode {
    renaming
        .entry(node)
        .or_insert_with(|| namespace.fresh())
        .clone()
}

/// Counts the occurrences of each triple once blank nodes are given canonical labels.
fn canonical_counts(graph: &Graph) -> HashMap<Triple, usize> {
    let mut dataset = Dataset::new();
    for triple in graph {
        dataset.insert(triple.as_ref().in_graph(GraphNameRef::DefaultGraph));
    }
    let mapping = dataset.canonicalize_blank_nodes(CanonicalizationAlgorithm::Unstable);
    let relabel = |node: &BlankNode| {
        mapping
            .get(&node.as_ref())
            .cloned()
            .unwrap_or_else(|| node.clone())
    };

    let mut counts = HashMap::new();
    for triple in graph {
        let subject = match &triple.subject {
            Subject::BlankNode(node) => Subject::from(relabel(node)),
            subject => subject.clone(),
        };
        let object = match &triple.object {
            Term::BlankNode(node) => Term::from(relabel(node)),
            object => object.clone(),
        };
        *counts
            .entry(Triple::new(subject, triple.predicate.clone(), object))
            .or_insert(0_usize) += 1;
    }
    counts
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.extend(iter);
        graph
    }
}
