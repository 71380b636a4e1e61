use oxiri::Iri;
use rdf_convert_common::{ConvertError, ConvertResult};
use rdf_convert_model::NamedNode;

/// Resolves possibly relative IRIs against an optional base IRI.
#[derive(Debug, Clone, Default)]
pub(crate) struct IriResolver {
    base: Option<Iri<String>>,
}

impl IriResolver {
    pub(crate) fn new(base_iri: Option<&str>) -> ConvertResult<Self> {
        let base = base_iri
            .map(|iri| {
                Iri::parse(iri.to_owned()).map_err(|error| ConvertError::InvalidBaseIri {
                    iri: iri.to_owned(),
                    error,
                })
            })
            .transpose()?;
        Ok(Self { base })
    }

    pub(crate) fn base(&self) -> Option<&str> {
        self.base.as_ref().map(Iri::as_str)
    }

    /// Returns a resolver whose base is `iri` resolved against the current base.
    pub(crate) fn rebase(&self, iri: &str) -> Result<Self, String> {
        Ok(Self {
            base: Some(self.resolve_iri(iri)?),
        })
    }

    /// Resolves `iri` into an absolute IRI.
    pub(crate) fn resolve(&self, iri: &str) -> Result<NamedNode, String> {
        Ok(NamedNode::new_unchecked(self.resolve_iri(iri)?.into_inner()))
    }

    fn resolve_iri(&self, iri: &str) -> Result<Iri<String>, String> {
        let resolved = match &self.base {
            Some(base) => base.resolve(iri),
            None => Iri::parse(iri.to_owned()),
        };
        resolved.map_err(|error| format!("Invalid IRI '{iri}': {error}"))
    }
}
