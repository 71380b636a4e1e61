//! Graphviz DOT output, to draw a graph with `dot -Tsvg`.

use crate::compact::PrefixCompactor;
use crate::dispatch::GraphSerializer;
use rdf_convert_common::ConvertResult;
use rdf_convert_model::vocab::xsd;
use rdf_convert_model::{Graph, Term, TermRef};
use std::collections::HashMap;
use std::io::Write;

pub(crate) struct GraphvizSerializer;

impl GraphSerializer for GraphvizSerializer {
    fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> ConvertResult<()> {
        let compactor = PrefixCompactor::new(graph.prefixes());
        let mut nodes = HashMap::<Term, usize>::new();
        let mut declarations = Vec::new();
        let mut edges = Vec::with_capacity(graph.len());
        for triple in graph {
            let subject = Term::from(triple.subject.clone());
            let mut node_id = |term: Term| {
                let next = nodes.len();
                *nodes.entry(term.clone()).or_insert_with(|| {
                    declarations.push((next, term));
                    next
                })
            };
            let from = node_id(subject);
            let to = node_id(triple.object.clone());
            edges.push((from, to, compactor.compact_or_full(triple.predicate.as_str())));
        }

        writeln!(writer, "digraph {{")?;
        writeln!(writer, "  rankdir=LR;")?;
        writeln!(writer, "  charset=\"utf-8\";")?;
        writeln!(writer)?;
        for (id, term) in &declarations {
            let (label, shape, color) = match term.as_ref() {
                TermRef::NamedNode(node) => {
                    (compactor.compact_or_full(node.as_str()), "ellipse", "blue")
                }
                TermRef::BlankNode(node) => (format!("_:{}", node.as_str()), "circle", "green"),
                TermRef::Literal(literal) => {
                    let mut label = format!("\"{}\"", literal.value());
                    if let Some(language) = literal.language() {
                        label.push('@');
                        label.push_str(language);
                    } else if literal.datatype() != xsd::STRING {
                        label.push_str("^^");
                        label.push_str(&compactor.compact_or_full(literal.datatype().as_str()));
                    }
                    (label, "box", "black")
                }
                #[allow(unreachable_patterns, reason = "RDF-star triple terms")]
                term => (term.to_string(), "box", "black"),
            };
            writeln!(
                writer,
                "  n{id} [label=\"{}\", shape={shape}, color={color}];",
                escape(&label)
            )?;
        }
        if !declarations.is_empty() {
            writeln!(writer)?;
        }
        for (from, to, label) in &edges {
            writeln!(writer, "  n{from} -> n{to} [label=\"{}\"];", escape(label))?;
        }
        writeln!(writer, "}}")?;
        Ok(())
    }
}

/// Escapes a DOT double-quoted string.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => (),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_convert_model::{BlankNode, Literal, NamedNode, Triple};

    #[test]
    fn nodes_in_first_occurrence_order() -> ConvertResult<()> {
        let alice = NamedNode::new_unchecked("http://example.com/alice");
        let knows = NamedNode::new_unchecked("http://example.com/knows");
        let name = NamedNode::new_unchecked("http://example.com/name");
        let mut graph = Graph::new();
        graph.add_prefix("ex", "http://example.com/");
        graph.insert(Triple::new(
            alice.clone(),
            knows,
            BlankNode::new_unchecked("b"),
        ));
        graph.insert(Triple::new(
            alice,
            name,
            Literal::new_simple_literal("Alice \"Al\""),
        ));

        let mut output = Vec::new();
        GraphvizSerializer.serialize_to(&graph, &mut output)?;
        let expected = r#"digraph {
  rankdir=LR;
  charset="utf-8";

  n0 [label="ex:alice", shape=ellipse, color=blue];
  n1 [label="_:b", shape=circle, color=green];
  n2 [label="\"Alice \"Al\"\"", shape=box, color=black];

  n0 -> n1 [label="ex:knows"];
  n0 -> n2 [label="ex:name"];
}
"#;
        assert_eq!(String::from_utf8_lossy(&output), expected);
        Ok(())
    }

    #[test]
    fn empty_graph() -> ConvertResult<()> {
        let mut output = Vec::new();
        GraphvizSerializer.serialize_to(&Graph::new(), &mut output)?;
        assert_eq!(
            String::from_utf8_lossy(&output),
            "digraph {\n  rankdir=LR;\n  charset=\"utf-8\";\n\n}\n"
        );
        Ok(())
    }
}
