use super::binding::{Binding, Match};

type MatchIter<'a> = Box<dyn Iterator<Item = Match> + 'a>;

/// Lazily enumerable set of matches produced by a successful structural match.
///
/// The structure is built eagerly while walking the input, but combinations
/// are only produced on iteration. Products of nested array patterns grow
/// multiplicatively, so callers should stream rather than collect when
/// patterns nest several array alternatives.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchSet {
    /// Exactly one match without bindings.
    Unit,
    /// Exactly one match binding a single placeholder.
    Bind { name: String, binding: Binding },
    /// Cartesian product of the factors; bindings of each combination are unioned.
    Product(Vec<MatchSet>),
    /// Concatenation of the alternatives.
    Union(Vec<MatchSet>),
}

impl MatchSet {
    pub fn empty() -> Self {
        MatchSet::Union(Vec::new())
    }

    pub(crate) fn product(factors: Vec<MatchSet>) -> Self {
        let mut factors: Vec<MatchSet> = factors
            .into_iter()
            .filter(|factor| !matches!(factor, MatchSet::Unit))
            .collect();
        match factors.len() {
            0 => MatchSet::Unit,
            1 => factors.remove(0),
            _ => MatchSet::Product(factors),
        }
    }

    pub(crate) fn union(mut alternatives: Vec<MatchSet>) -> Self {
        if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            MatchSet::Union(alternatives)
        }
    }

    /// Streams every match of the set.
    pub fn iter(&self) -> MatchIter<'_> {
        match self {
            MatchSet::Unit => Box::new(std::iter::once(Match::new())),
            MatchSet::Bind { name, binding } => {
                Box::new(std::iter::once(Match::single(name.clone(), binding.clone())))
            }
            MatchSet::Union(alternatives) => {
                Box::new(alternatives.iter().flat_map(|alternative| alternative.iter()))
            }
            MatchSet::Product(factors) => factors.iter().fold(
                Box::new(std::iter::once(Match::new())) as MatchIter<'_>,
                |acc, factor| {
                    Box::new(acc.flat_map(move |left| {
                        factor.iter().map(move |right| left.merged(&right))
                    }))
                },
            ),
        }
    }

    /// Number of matches, computed without enumerating them.
    pub fn count(&self) -> usize {
        match self {
            MatchSet::Unit | MatchSet::Bind { .. } => 1,
            MatchSet::Union(alternatives) => alternatives
                .iter()
                .fold(0usize, |total, alternative| total.saturating_add(alternative.count())),
            MatchSet::Product(factors) => factors
                .iter()
                .fold(1usize, |total, factor| total.saturating_mul(factor.count())),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MatchSet::Unit | MatchSet::Bind { .. } => false,
            MatchSet::Union(alternatives) => alternatives.iter().all(MatchSet::is_empty),
            MatchSet::Product(factors) => factors.iter().any(MatchSet::is_empty),
        }
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = Match;
    type IntoIter = MatchIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
