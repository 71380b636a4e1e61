mod blank_node;
mod graph;

pub use blank_node::BlankNodeNamespace;
pub use graph::Graph;

// Re-export some oxrdf types.
pub use oxrdf::vocab;
pub use oxrdf::{
    BlankNode, BlankNodeIdParseError, BlankNodeRef, IriParseError, Literal, LiteralRef,
    NamedNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef, Triple, TripleRef,
};

/// A statement is an RDF triple: its subject is never a literal.
pub type Statement = Triple;
