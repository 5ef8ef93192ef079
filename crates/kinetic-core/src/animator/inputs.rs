use std::collections::{BTreeMap, HashMap};

use crate::spring::{SpringId, SpringRef};

/// Named springs an animator samples together
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    entries: Vec<(String, SpringRef)>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, spring: &SpringRef) -> Self {
        self.insert(name, spring);
        self
    }

    /// Insert or replace a named input
    pub fn insert(&mut self, name: impl Into<String>, spring: &SpringRef) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = spring.clone(),
            None => self.entries.push((name, spring.clone())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpringRef)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Sample every input at absolute time `t`
    pub fn sample(&self, t: f64) -> SampledInputs {
        SampledInputs {
            values: self
                .entries
                .iter()
                .map(|(name, spring)| (name.clone(), spring.value(t)))
                .collect(),
        }
    }

    /// Whether every input has settled at `t`
    pub fn all_settled(&self, t: f64) -> bool {
        self.entries.iter().all(|(_, spring)| spring.should_stop(t))
    }
}

impl<N: Into<String>> FromIterator<(N, SpringRef)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (N, SpringRef)>>(iter: I) -> Self {
        let mut inputs = Inputs::new();
        for (name, spring) in iter {
            inputs.insert(name, &spring);
        }
        inputs
    }
}

/// Input values at one sampled instant, keyed by input name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledInputs {
    values: BTreeMap<String, f64>,
}

impl SampledInputs {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Value of `name`, or `default` if no such input exists
    pub fn get_or(&self, name: &str, default: f64) -> f64 {
        self.get(name).unwrap_or(default)
    }
}

/// Reset timestamps last seen for each input spring
#[derive(Debug, Default)]
pub(crate) struct ObservedInputs {
    last_reset: HashMap<SpringId, f64>,
}

impl ObservedInputs {
    /// Record the new input set and report whether anything changed
    ///
    /// New springs, removed springs and springs reset since the last
    /// observation all count as changes.
    pub(crate) fn observe(&mut self, inputs: &Inputs) -> bool {
        let mut changed = false;
        let mut next = HashMap::with_capacity(inputs.len());

        for (_, spring) in inputs.iter() {
            let reset = spring.last_reset();
            match self.last_reset.get(&spring.id()) {
                Some(&seen) if seen == reset => {}
                _ => changed = true,
            }
            next.insert(spring.id(), reset);
        }
        if self.last_reset.keys().any(|id| !next.contains_key(id)) {
            changed = true;
        }

        self.last_reset = next;
        changed
    }
}
