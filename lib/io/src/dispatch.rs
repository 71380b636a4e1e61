use crate::dot::GraphvizSerializer;
use crate::iri::IriResolver;
use crate::jsonld::{JsonLdParser, JsonLdSerializer};
use crate::options::ParseOptions;
use crate::rdf_json::{RdfJsonParser, RdfJsonSerializer};
use crate::rdfio::OxRdfCodec;
use rdf_convert_common::{ConvertError, ConvertResult};
use rdf_convert_format::{FormatDescriptor, FormatRegistry, RdfFormat};
use rdf_convert_model::Graph;
use std::io::Write;

/// Reads a whole document into a [`Graph`].
pub trait GraphParser: Send + Sync {
    /// Parses `input`.
    ///
    /// Blank node labels of the returned graph are not meaningful, [`parse`] renames them.
    fn parse(&self, input: &[u8], options: &ParseOptions) -> ConvertResult<Graph>;
}

/// Writes a [`Graph`] in some syntax.
pub trait GraphSerializer: Send + Sync {
    /// Writes all the statements of `graph`, in order, to `writer`.
    fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> ConvertResult<()>;
}

static NTRIPLES: OxRdfCodec = OxRdfCodec::new(RdfFormat::NTriples);
static TURTLE: OxRdfCodec = OxRdfCodec::new(RdfFormat::Turtle);
static RDF_XML: OxRdfCodec = OxRdfCodec::new(RdfFormat::RdfXml);
static N3: OxRdfCodec = OxRdfCodec::new(RdfFormat::N3);
static NQUADS: OxRdfCodec = OxRdfCodec::new(RdfFormat::NQuads);
static TRIG: OxRdfCodec = OxRdfCodec::new(RdfFormat::TriG);

/// The parser bound to `format`, if any.
pub fn parser_for(format: RdfFormat) -> Option<&'static dyn GraphParser> {
    let parser: &'static dyn GraphParser = match format {
        RdfFormat::RdfJson => &RdfJsonParser,
        RdfFormat::JsonLd => &JsonLdParser,
        RdfFormat::NTriples => &NTRIPLES,
        RdfFormat::Turtle => &TURTLE,
        RdfFormat::RdfXml => &RDF_XML,
        RdfFormat::Graphviz => return None,
        RdfFormat::N3 => &N3,
        RdfFormat::NQuads => &NQUADS,
        RdfFormat::TriG => &TRIG,
    };
    Some(parser)
}

/// The serializer bound to `format`.
pub fn serializer_for(format: RdfFormat) -> Option<&'static dyn GraphSerializer> {
    let serializer: &'static dyn GraphSerializer = match format {
        RdfFormat::RdfJson => &RdfJsonSerializer,
        RdfFormat::JsonLd => &JsonLdSerializer,
        RdfFormat::NTriples => &NTRIPLES,
        RdfFormat::Turtle => &TURTLE,
        RdfFormat::RdfXml => &RDF_XML,
        RdfFormat::Graphviz => &GraphvizSerializer,
        RdfFormat::N3 => &N3,
        RdfFormat::NQuads => &NQUADS,
        RdfFormat::TriG => &TRIG,
    };
    Some(serializer)
}

/// Parses `input` in the registered format named `format`.
///
/// ```
/// use rdf_convert_format::FormatRegistry;
/// use rdf_convert_io::{parse, ParseOptions};
///
/// let registry = FormatRegistry::with_builtin_formats();
/// let graph = parse(
///     &registry,
///     b"<http://example.com/s> <http://example.com/p> \"o\" .",
///     "ntriples",
///     &ParseOptions::new(),
/// )?;
/// assert_eq!(graph.len(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn parse(
    registry: &FormatRegistry,
    input: &[u8],
    format: &str,
    options: &ParseOptions,
) -> ConvertResult<Graph> {
    parse_as(registry.lookup(format)?, input, options)
}

/// Parses `input` with the parser bound to `descriptor`.
///
/// The blank nodes of the result are labelled `genid1`, `genid2`... in order of appearance.
pub fn parse_as(
    descriptor: &FormatDescriptor,
    input: &[u8],
    options: &ParseOptions,
) -> ConvertResult<Graph> {
    let parser = descriptor
        .has_parser()
        .then(|| parser_for(descriptor.format()))
        .flatten()
        .ok_or_else(|| ConvertError::NoParserForFormat(descriptor.name().to_owned()))?;
    IriResolver::new(options.base_iri())?;

    let mut graph = Graph::new();
    if input.iter().all(u8::is_ascii_whitespace) {
        tracing::debug!("Empty {} input", descriptor.name());
        return Ok(graph);
    }
    graph.merge(parser.parse(input, options)?);
    tracing::debug!(
        "Parsed {} statements of {} input",
        graph.len(),
        descriptor.name()
    );
    Ok(graph)
}

/// Serializes `graph` in the registered format named `format`.
pub fn serialize(
    registry: &FormatRegistry,
    graph: &Graph,
    format: &str,
) -> ConvertResult<Vec<u8>> {
    serialize_as(registry.lookup(format)?, graph)
}

/// Serializes `graph` with the serializer bound to `descriptor`.
pub fn serialize_as(descriptor: &FormatDescriptor, graph: &Graph) -> ConvertResult<Vec<u8>> {
    let serializer = descriptor
        .has_serializer()
        .then(|| serializer_for(descriptor.format()))
        .flatten()
        .ok_or_else(|| ConvertError::NoSerializerForFormat(descriptor.name().to_owned()))?;
    let mut output = Vec::new();
    serializer.serialize_to(graph, &mut output)?;
    tracing::debug!(
        "Serialized {} statements as {} ({} bytes)",
        graph.len(),
        descriptor.name(),
        output.len()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseBudget;
    use rdf_convert_common::BudgetExceeded;

    #[test]
    fn empty_input_for_every_parser() -> ConvertResult<()> {
        let registry = FormatRegistry::with_builtin_formats();
        for descriptor in registry.list_parseable() {
            let graph = parse_as(descriptor, b"  \n\t", &ParseOptions::new())?;
            assert!(graph.is_empty(), "{} input is not empty", descriptor.name());
        }
        Ok(())
    }

    #[test]
    fn graphviz_can_not_be_parsed() {
        let registry = FormatRegistry::with_builtin_formats();
        assert!(matches!(
            parse(&registry, b"digraph {}", "dot", &ParseOptions::new()),
            Err(ConvertError::NoParserForFormat(name)) if name == "dot"
        ));
    }

    #[test]
    fn blank_nodes_are_renamed() -> ConvertResult<()> {
        let registry = FormatRegistry::with_builtin_formats();
        let graph = parse(
            &registry,
            b"_:x <http://example.com/p> _:y .\n_:y <http://example.com/p> _:x .",
            "ntriples",
            &ParseOptions::new(),
        )?;
        let output = String::from_utf8_lossy(&serialize(&registry, &graph, "ntriples")?)
            .into_owned();
        assert_eq!(
            output,
            "_:genid1 <http://example.com/p> _:genid2 .\n_:genid2 <http://example.com/p> _:genid1 .\n"
        );
        Ok(())
    }

    #[test]
    fn statement_budget() {
        let registry = FormatRegistry::with_builtin_formats();
        let options =
            ParseOptions::new().with_budget(ParseBudget::default().with_max_statements(1));
        let result = parse(
            &registry,
            b"<http://example.com/s> <http://example.com/p> \"1\", \"2\" .",
            "turtle",
            &options,
        );
        assert!(matches!(
            result,
            Err(ConvertError::BudgetExceeded(BudgetExceeded::Statements(1)))
        ));
    }

    #[test]
    fn invalid_base_iri() {
        let registry = FormatRegistry::with_builtin_formats();
        let result = parse(
            &registry,
            b"",
            "turtle",
            &ParseOptions::new().with_base_iri("not an iri"),
        );
        assert!(matches!(result, Err(ConvertError::InvalidBaseIri { .. })));
    }
}
