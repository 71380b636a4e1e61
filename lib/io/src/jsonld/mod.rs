//! A JSON-LD 1.1 subset working on local contexts only.
//!
//! Parsing expands the document on the fly into triples: named graphs are flattened into the
//! default graph and keys that do not expand to absolute IRIs are dropped. Serialization writes
//! one flat node object per subject.

mod context;
mod from_rdf;
mod to_rdf;

use crate::dispatch::{GraphParser, GraphSerializer};
use crate::iri::IriResolver;
use crate::json::read_json;
use crate::options::ParseOptions;
use crate::sink::TripleSink;
use context::Context;
use rdf_convert_common::{ConvertResult, MalformedInputError};
use rdf_convert_model::Graph;
use std::io::Write;
use to_rdf::RdfEmitter;

const FORMAT: &str = "jsonld";

pub(crate) struct JsonLdParser;

impl GraphParser for JsonLdParser {
    fn parse(&self, input: &[u8], options: &ParseOptions) -> ConvertResult<Graph> {
        let document = read_json(FORMAT, input)?;
        let base = IriResolver::new(options.base_iri())?;
        let initial = Context::new(base);

        // Prefixes are taken from the top-level context
        let top_level = match document.get("@context") {
            Some(local) => Some(
                initial
                    .process(local)
                    .map_err(|message| MalformedInputError::msg(FORMAT, message))?,
            ),
            None => None,
        };

        let mut emitter = RdfEmitter::new(TripleSink::new(options.budget()));
        emitter.document(&document, &initial)?;
        let mut graph = emitter.finish();
        if let Some(top_level) = top_level {
            let mut prefixes = top_level.prefixes().collect::<Vec<_>>();
            prefixes.sort_unstable();
            for (prefix, iri) in prefixes {
                graph.add_prefix(prefix, iri);
            }
            if let Some(base) = top_level.base().base() {
                graph.set_base_iri(base);
            }
        }
        Ok(graph)
    }
}

pub(crate) struct JsonLdSerializer;

impl GraphSerializer for JsonLdSerializer {
    fn serialize_to(&self, graph: &Graph, writer: &mut dyn Write) -> ConvertResult<()> {
        let document = from_rdf::graph_to_json(graph);
        serde_json::to_writer_pretty(&mut *writer, &document).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
