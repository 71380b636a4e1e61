use oxrdf::BlankNode;
use std::collections::HashSet;

/// Keeps track of the blank node identifiers issued within one [`Graph`](crate::Graph).
///
/// Fresh identifiers are `genid1`, `genid2`, ... skipping any identifier that is already in use.
#[derive(Debug, Clone, Default)]
pub struct BlankNodeNamespace {
    used: HashSet<String>,
    counter: u64,
}

impl BlankNodeNamespace {
    /// Records `id` as used so that [`fresh`](Self::fresh) never returns it.
    pub fn reserve(&mut self, id: &str) {
        if !self.used.contains(id) {
            self.used.insert(id.to_owned());
        }
    }

    /// Returns `true` if the identifier has already been issued or reserved.
    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Returns a blank node whose identifier has never been used in this namespace.
    pub fn fresh(&mut self) -> BlankNode {
        loop {
            self.counter += 1;
            let id = format!("genid{}", self.counter);
            if !self.used.contains(&id) {
                self.used.insert(id.clone());
                return BlankNode::new_unchecked(id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_skips_reserved_identifiers() {
        let mut namespace = BlankNodeNamespace::default();
        namespace.reserve("genid1");
        assert_eq!(namespace.fresh().as_str(), "genid2");
        assert_eq!(namespace.fresh().as_str(), "genid3");
        assert!(namespace.contains("genid1"));
        assert_eq!(namespace.len(), 3);
    }
}
