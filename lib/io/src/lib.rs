//! Parsers and serializers of rdf-convert, and their dispatch on
//! [`RdfFormat`](rdf_convert_format::RdfFormat).
//!
//! Every format variant is bound to a concrete [`GraphParser`] and [`GraphSerializer`]:
//! the text and XML syntaxes are backed by [`oxrdfio`], JSON-LD, RDF/JSON and Graphviz are
//! implemented here on top of [`serde_json`].

mod compact;
mod dispatch;
mod dot;
mod iri;
mod json;
mod jsonld;
mod options;
mod rdf_json;
mod rdfio;
mod sink;

pub use dispatch::{
    parse, parse_as, parser_for, serialize, serialize_as, serializer_for, GraphParser,
    GraphSerializer,
};
pub use options::{ParseBudget, ParseOptions};
pub use rdf_json::rdf_json_value;
