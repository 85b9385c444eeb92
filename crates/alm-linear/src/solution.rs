//! Published solve results.

use std::time::Duration;

use indexmap::IndexMap;

use crate::variable::{SpecId, Variable};

/// Statistics of one successful solve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolveReport {
    /// Pivots performed over all stages
    pub iterations: usize,
    /// Linear programs solved (one per tier for the lexicographic strategy)
    pub stages: usize,
    /// Total penalty plus caller objective at the published values
    pub objective: f64,
    pub elapsed: Duration,
}

/// An immutable snapshot of solved variable values.
///
/// Every value in a snapshot comes from the same solve, so readers holding
/// an `Arc<Solution>` never observe a mix of generations.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub(crate) spec: SpecId,
    pub(crate) generation: u64,
    pub(crate) values: IndexMap<u32, f64>,
    pub(crate) report: SolveReport,
}

impl Solution {
    pub(crate) fn empty(spec: SpecId, generation: u64) -> Self {
        Self {
            spec,
            generation,
            values: IndexMap::new(),
            report: SolveReport::default(),
        }
    }

    /// Value of a variable or tab, if it took part in this solve.
    pub fn value(&self, variable: impl Into<Variable>) -> Option<f64> {
        let variable = variable.into();
        if variable.spec != self.spec {
            return None;
        }
        self.values.get(&variable.id).copied()
    }

    /// Mutation generation of the specification that was solved.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn report(&self) -> &SolveReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All `(variable, value)` pairs in solver column order.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        let spec = self.spec;
        self.values
            .iter()
            .map(move |(&id, &value)| (Variable { spec, id }, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_lookup() {
        let spec = SpecId::next();
        let mut solution = Solution::empty(spec, 1);
        solution.values.insert(0, 4.0);

        assert_eq!(solution.value(Variable { spec, id: 0 }), Some(4.0));
        assert_eq!(solution.value(Variable { spec, id: 1 }), None);
        assert_eq!(
            solution.value(Variable {
                spec: SpecId::next(),
                id: 0
            }),
            None
        );
        assert_eq!(solution.iter().count(), 1);
    }
}
