use std::collections::{BTreeMap, HashSet};

/// Shortens IRIs into `prefix:local` names using the prefixes of a graph.
///
/// Only prefixes with a valid name whose IRI ends with a generic delimiter are used, and the local
/// part is never empty nor starts with `//`, so that a JSON-LD processor expands the result back
/// to the same IRI.
pub(crate) struct PrefixCompactor<'a> {
    /// Longest IRIs first, so that the most specific prefix wins.
    prefixes: Vec<(&'a str, &'a str)>,
}

impl<'a> PrefixCompactor<'a> {
    pub(crate) fn new(prefixes: &'a BTreeMap<String, String>) -> Self {
        let mut prefixes = prefixes
            .iter()
            .filter(|(name, iri)| is_valid_prefix_name(name) && ends_with_gen_delim(iri))
            .map(|(name, iri)| (name.as_str(), iri.as_str()))
            .collect::<Vec<_>>();
        prefixes.sort_by(|(n1, i1), (n2, i2)| i2.len().cmp(&i1.len()).then(n1.cmp(n2)));
        Self { prefixes }
    }

    /// Drops the prefixes named like the scheme of one of `iris`.
    ///
    /// An IRI left uncompacted, like `urn:isbn:1`, would otherwise be read back as a compact IRI
    /// using the `urn` prefix.
    pub(crate) fn without_schemes_of<'i>(
        mut self,
        iris: impl IntoIterator<Item = &'i str>,
    ) -> Self {
        let schemes = iris
            .into_iter()
            .filter_map(|iri| iri.split_once(':').map(|(scheme, _)| scheme))
            .collect::<HashSet<_>>();
        self.prefixes.retain(|(name, _)| !schemes.contains(*name));
        self
    }

    /// The prefixes that are used for compaction, ordered by name.
    pub(crate) fn prefixes(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        let mut prefixes = self.prefixes.clone();
        prefixes.sort_unstable();
        prefixes.into_iter()
    }

    pub(crate) fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes.iter().find_map(|(name, namespace)| {
            let local = iri.strip_prefix(namespace)?;
            (!local.is_empty() && !local.starts_with("//")).then(|| format!("{name}:{local}"))
        })
    }

    pub(crate) fn compact_or_full(&self, iri: &str) -> String {
        self.compact(iri).unwrap_or_else(|| iri.to_owned())
    }
}

/// Checks a Turtle `PN_PREFIX`-like name: a letter, then letters, digits, `_`, `-` or `.`, not
/// ending with `.`.
pub(crate) fn is_valid_prefix_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.ends_with('.')
}

fn ends_with_gen_delim(iri: &str) -> bool {
    iri.ends_with(['/', '#', '?', '[', ']', '@', ':'])
}
