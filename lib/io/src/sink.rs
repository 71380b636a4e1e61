use crate::options::ParseBudget;
use rdf_convert_common::ConvertResult;
use rdf_convert_model::{Graph, Triple};

/// Collects the triples of a concrete parser into a [`Graph`], enforcing the parse budget at each
/// triple.
pub(crate) struct TripleSink<'a> {
    graph: Graph,
    budget: &'a ParseBudget,
}

impl<'a> TripleSink<'a> {
    pub(crate) fn new(budget: &'a ParseBudget) -> Self {
        Self {
            graph: Graph::new(),
            budget,
        }
    }

    pub(crate) fn push(&mut self, triple: impl Into<Triple>) -> ConvertResult<()> {
        self.budget.check(self.graph.len() + 1)?;
        self.graph.insert(triple.into());
        Ok(())
    }

    pub(crate) fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub(crate) fn finish(self) -> Graph {
        self.graph
    }
}
