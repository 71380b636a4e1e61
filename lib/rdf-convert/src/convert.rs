use oxiri::Iri;
use rdf_convert_common::ConvertResult;
use rdf_convert_format::{FormatDescriptor, FormatHint, FormatRegistry, FormatResolver};
use rdf_convert_io::{parse_as, serialize_as, ParseOptions};
use rdf_convert_model::Graph;
use std::sync::LazyLock;
use tracing::debug;

static DEFAULT_REGISTRY: LazyLock<FormatRegistry> =
    LazyLock::new(FormatRegistry::with_builtin_formats);

/// The registry of all the built-in formats.
pub fn default_registry() -> &'static FormatRegistry {
    &DEFAULT_REGISTRY
}

/// Converts a whole document from one format to another.
///
/// The output format is resolved first, so that an unknown output format fails before any parsing.
/// The input format is resolved from `from`, then guessed from `base_name` and the content.
/// `base_name` is also used as base IRI when it is an absolute IRI.
///
/// Either the full output or an error is returned.
pub fn convert(
    registry: &FormatRegistry,
    input: &[u8],
    from: &FormatHint,
    to: &str,
    base_name: Option<&str>,
) -> ConvertResult<Vec<u8>> {
    let resolver = FormatResolver::new(registry);
    let output_format = resolver.resolve_for_serialize(to)?;
    let input_format = resolver.resolve_for_parse(from, base_name, Some(input))?;
    debug!(
        "Converting from {} to {}",
        input_format.name(),
        output_format.name()
    );

    let mut options = ParseOptions::new();
    if let Some(base_iri) = base_name.filter(|name| Iri::parse(*name).is_ok()) {
        options = options.with_base_iri(base_iri);
    }
    let graph = parse_as(input_format, input, &options)?;
    serialize_as(output_format, &graph)
}

/// Accumulates the documents it loads into a single [`Graph`].
///
/// Each [`load`](Self::load) renames the blank nodes of the loaded document, so that two
/// documents using the same blank node label never share a node.
///
/// ```
/// use rdf_convert::format::FormatHint;
/// use rdf_convert::io::ParseOptions;
/// use rdf_convert::{default_registry, Converter};
///
/// let mut converter = Converter::new(default_registry());
/// let hint = FormatHint::from("ntriples");
/// for _ in 0..2 {
///     converter.load(b"_:b1 <http://example.com/p> \"o\" .", &hint, None, &ParseOptions::new())?;
/// }
/// assert_eq!(
///     converter.serialize("ntriples")?,
///     b"_:genid1 <http://example.com/p> \"o\" .\n_:genid2 <http://example.com/p> \"o\" .\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct Converter<'r> {
    registry: &'r FormatRegistry,
    graph: Graph,
}

impl<'r> Converter<'r> {
    pub fn new(registry: &'r FormatRegistry) -> Self {
        Self {
            registry,
            graph: Graph::new(),
        }
    }

    pub fn registry(&self) -> &'r FormatRegistry {
        self.registry
    }

    /// Parses `input` and adds its statements to the graph.
    ///
    /// Returns the format the input has been read with. The graph is left untouched on failure.
    pub fn load(
        &mut self,
        input: &[u8],
        hint: &FormatHint,
        source_name: Option<&str>,
        options: &ParseOptions,
    ) -> ConvertResult<&'r FormatDescriptor> {
        let format =
            FormatResolver::new(self.registry).resolve_for_parse(hint, source_name, Some(input))?;
        let parsed = parse_as(format, input, options)?;
        debug!(
            "Loaded {} statements from {}",
            parsed.len(),
            source_name.unwrap_or("the input")
        );
        self.graph.merge(parsed);
        Ok(format)
    }

    /// Serializes the accumulated graph.
    ///
    /// `to` may be a format name, a MIME type or a file extension.
    pub fn serialize(&self, to: &str) -> ConvertResult<Vec<u8>> {
        let format = FormatResolver::new(self.registry).resolve_for_serialize(to)?;
        serialize_as(format, &self.graph)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}
