//! The text and XML syntaxes, delegated to [`oxrdfio`].

use crate::compact::is_valid_prefix_name;
use crate::dispatch::{GraphParser, GraphSerializer};
use crate::options::ParseOptions;
use crate::sink::TripleSink;
use oxrdfio::{RdfParseError, RdfParser, RdfSerializer};
use rdf_convert_common::{ConvertError, ConvertResult, MalformedInputError, TextPosition};
use rdf_convert_format::RdfFormat;
use rdf_convert_model::Graph;
use std::io::{self, Write};

/// A parser and serializer backed by [`oxrdfio`].
///
/// Quads are read into the default graph, so named graphs of N-Quads and TriG documents are
/// flattened.
pub(crate) struct OxRdfCodec {
    format: RdfFormat,
}

impl OxRdfCodec {
    pub(crate) const fn new(format: RdfFormat) -> Self {
        Self { format }
    }

    fn parser_format(&self) -> oxrdfio::RdfFormat {
        match self.format {
            RdfFormat::Turtle => oxrdfio::RdfFormat::Turtle,
            RdfFormat::RdfXml => oxrdfio::RdfFormat::RdfXml,
            RdfFormat::N3 => oxrdfio::RdfFormat::N3,
            RdfFormat::NQuads => oxrdfio::RdfFormat::NQuads,
            RdfFormat::TriG => oxrdfio::RdfFormat::TriG,
            _ => oxrdfio::RdfFormat::NTriples,
        }
    }

    /// N3 documents are written with the Turtle subset of the language.
    fn serializer_format(&self) -> oxrdfio::RdfFormat {
        match self.format {
            RdfFormat::N3 => oxrdfio::RdfFormat::Turtle,
            _ => self.parser_format(),
        }
    }

    fn parse_error(&self, error: RdfParseError) -> ConvertError {
        match error {
            RdfParseError::Syntax(error) => {
                let position = error.location().map(|location| TextPosition {
                    line: location.start.line,
                    column: location.start.column,
                    offset: Some(location.start.offset),
                });
                MalformedInputError::new(self.format.name(), position, error.to_string()).into()
            }
            error => ConvertError::Io(error.into()),
        }
    }
}

impl GraphParser for OxRdfCodec {
    fn parse(&self, input: &[u8], options: &ParseOptions) -> ConvertResult<Graph> {
        let mut parser = RdfParser::from_format(self.parser_format());
        if let Some(base_iri) = options.base_iri() {
            parser = parser
                .with_base_iri(base_iri)
                .map_err(|error| ConvertError::InvalidBaseIri {
                    iri: base_iri.to_owned(),
                    error,
                })?;
        }

        let mut sink = TripleSink::new(options.budget());
        let mut reader = parser.for_reader(input);
        for quad in &mut reader {
            sink.push(quad.map_err(|error| self.parse_error(error))?)?;
        }

        let graph = sink.graph_mut();
        for (prefix, iri) in reader.prefixes() {
            graph.add_prefix(prefix, iri);
        }
        if let Some(base_iri) = reader.base_iri() {
            graph.set_base_iri(base_iri);
        }
        Ok(sink.finish())
    }
}

impl GraphSerializer for OxRdfCodec {
    fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> ConvertResult<()> {
        let mut serializer = RdfSerializer::from_format(self.serializer_format());
        for (prefix, iri) in graph.prefixes() {
            if !prefix.is_empty() && !is_valid_prefix_name(prefix) {
                tracing::debug!("Skipping the prefix '{prefix}', it is not a valid prefix name");
                continue;
            }
            serializer = serializer
                .with_prefix(prefix, iri)
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;
        }

        let mut writer = serializer.for_writer(writer);
        for triple in graph {
            writer.serialize_triple(triple.as_ref())?;
        }
        writer.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_convert_model::{NamedNode, Triple};

    #[test]
    fn reads_prefixes_and_flattens_named_graphs() -> ConvertResult<()> {
        let turtle = OxRdfCodec::new(RdfFormat::Turtle);
        let graph = turtle.parse(
            b"@prefix ex: <http://example.com/> .\nex:s ex:p ex:o, ex:o2 .",
            &ParseOptions::new(),
        )?;
        assert_eq!(graph.len(), 2);
        assert_eq!(
            graph.prefixes().get("ex").map(String::as_str),
            Some("http://example.com/")
        );

        let trig = OxRdfCodec::new(RdfFormat::TriG);
        let graph = trig.parse(
            b"<http://example.com/g> { <http://example.com/s> <http://example.com/p> <http://example.com/o> }",
            &ParseOptions::new(),
        )?;
        assert_eq!(graph.len(), 1);
        Ok(())
    }

    #[test]
    fn resolves_against_base() -> ConvertResult<()> {
        let graph = OxRdfCodec::new(RdfFormat::Turtle).parse(
            b"<s> <p> <o> .",
            &ParseOptions::new().with_base_iri("http://example.com/dir/"),
        )?;
        assert_eq!(
            graph.triples()[0].subject.to_string(),
            "<http://example.com/dir/s>"
        );
        Ok(())
    }

    #[test]
    fn syntax_error_has_position() {
        let result = OxRdfCodec::new(RdfFormat::NTriples).parse(
            b"<http://example.com/s> <http://example.com/p> <http://example.com/o> .\n<http://example.com/s> oops",
            &ParseOptions::new(),
        );
        let Err(ConvertError::MalformedInput(error)) = result else {
            panic!("expected a syntax error, got {result:?}");
        };
        assert_eq!(error.format(), "ntriples");
        assert_eq!(error.position().map(|p| p.line), Some(1));
    }

    #[test]
    fn writes_prefixes() -> ConvertResult<()> {
        let ex = NamedNode::new_unchecked("http://example.com/s");
        let mut graph = Graph::new();
        graph.add_prefix("ex", "http://example.com/");
        graph.add_prefix("not valid", "http://example.org/");
        graph.insert(Triple::new(ex.clone(), ex.clone(), ex));

        let mut output = Vec::new();
        OxRdfCodec::new(RdfFormat::Turtle).serialize_to(&graph, &mut output)?;
        let output = String::from_utf8_lossy(&output);
        assert!(output.contains("@prefix ex: <http://example.com/> ."));
        assert!(output.contains("ex:s ex:s ex:s"));
        assert!(!output.contains("not valid"));
        Ok(())
    }
}
