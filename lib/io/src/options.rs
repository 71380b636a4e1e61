use rdf_convert_common::{BudgetExceeded, ConvertError, ConvertResult};
use std::time::{Duration, Instant};

/// Options given to a concrete parser.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    base_iri: Option<String>,
    budget: ParseBudget,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The IRI relative references of the document are resolved against.
    ///
    /// It is usually the URL the document was read from.
    #[must_use]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: ParseBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    pub fn budget(&self) -> &ParseBudget {
        &self.budget
    }
}

/// Limits a parser checks at each record boundary.
///
/// The default budget is unlimited.
///
/// ```
/// use rdf_convert_io::ParseBudget;
///
/// let budget = ParseBudget::default().with_max_statements(2);
/// assert!(budget.check(2).is_ok());
/// assert!(budget.check(3).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseBudget {
    max_statements: Option<usize>,
    deadline: Option<Instant>,
}

impl ParseBudget {
    /// Fails the parse once more than `max_statements` statements have been read.
    #[must_use]
    pub fn with_max_statements(mut self, max_statements: usize) -> Self {
        self.max_statements = Some(max_statements);
        self
    }

    /// Fails the parse once `deadline` has passed.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fails the parse once `timeout` has elapsed from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn max_statements(&self) -> Option<usize> {
        self.max_statements
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Checks the budget after `statements` statements have been read.
    pub fn check(&self, statements: usize) -> ConvertResult<()> {
        if let Some(max_statements) = self.max_statements {
            if statements > max_statements {
                return Err(ConvertError::BudgetExceeded(BudgetExceeded::Statements(
                    max_statements,
                )));
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ConvertError::BudgetExceeded(BudgetExceeded::Deadline));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_by_default() {
        assert!(ParseBudget::default().check(usize::MAX).is_ok());
    }

    #[test]
    fn passed_deadline() {
        let budget = ParseBudget::default().with_deadline(Instant::now());
        assert!(matches!(
            budget.check(0),
            Err(ConvertError::BudgetExceeded(BudgetExceeded::Deadline))
        ));
    }
}
