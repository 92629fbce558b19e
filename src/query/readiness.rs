//! Readiness gate: may a payload be built from these inputs at all?

use crate::domain::FilterState;

/// Pure predicate over the filter inputs a screen requires.
///
/// A screen is ready only when every required input is present and non-empty.
/// The check is total: missing inputs yield `false`, never a panic or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessGate {
    required: Vec<String>,
}

impl ReadinessGate {
    /// Creates a gate requiring every filter in `required`.
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Required filter names, in declaration order.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// `true` when every required filter is present and non-blank.
    ///
    /// Whitespace-only text and empty sets count as missing.
    #[must_use]
    pub fn is_ready(&self, filters: &FilterState) -> bool {
        self.required.iter().all(|name| filters.is_present(name))
    }

    /// Names of the required inputs that are currently absent.
    #[must_use]
    pub fn missing<'a>(&'a self, filters: &FilterState) -> Vec<&'a str> {
        self.required
            .iter()
            .filter(|name| !filters.is_present(name))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::names;
    use chrono::NaiveDate;

    fn gate() -> ReadinessGate {
        ReadinessGate::new([names::TENANT, names::START, names::END])
    }

    #[test]
    fn empty_inputs_are_not_ready() {
        let filters = FilterState::new();
        assert!(!gate().is_ready(&filters));
        assert_eq!(gate().missing(&filters), vec!["tenant", "start", "end"]);
    }

    #[test]
    fn blank_tenant_is_not_ready() {
        let mut filters = FilterState::new();
        filters.set(names::TENANT, "");
        filters.set(names::START, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        filters.set(names::END, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(!gate().is_ready(&filters));
        assert_eq!(gate().missing(&filters), vec!["tenant"]);
    }

    #[test]
    fn all_required_inputs_present() {
        let mut filters = FilterState::new();
        filters.set(names::TENANT, "T1");
        filters.set(names::START, "2024-01-01");
        filters.set(names::END, "2024-01-31");
        assert!(gate().is_ready(&filters));
        assert!(gate().missing(&filters).is_empty());
    }

    #[test]
    fn no_requirements_is_always_ready() {
        let gate = ReadinessGate::new(Vec::<String>::new());
        assert!(gate.is_ready(&FilterState::new()));
    }
}
