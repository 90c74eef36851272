//! Match verdicts and the dispatch path correlating `match` with `handle`.

use std::fmt;

use crate::internal::filters::FilterData;

/// One step of a dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Handled by the child at this index.
    Child(usize),
    /// Handled by the default node (or by a catch-all node itself).
    Default,
}

/// Stack of steps recorded while matching.
///
/// Each router pushes the index of the child that matched after the child
/// returns, so the innermost step comes first and the outermost step last.
/// Handling walks the stack from the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DispatchPath(Vec<PathStep>);

impl DispatchPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Path reported by a catch-all node.
    pub fn catch_all() -> Self {
        Self(vec![PathStep::Default])
    }

    /// This path with `step` pushed as the new outermost step.
    pub fn pushed(mut self, step: PathStep) -> Self {
        self.0.push(step);
        self
    }

    /// Steps in stack order, innermost first.
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    /// Steps in the order handling consumes them.
    pub fn outermost_first(&self) -> impl Iterator<Item = PathStep> + '_ {
        self.0.iter().rev().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Child indices in stack order with `-1` for default steps.
    pub fn to_indices(&self) -> Vec<isize> {
        self.0
            .iter()
            .map(|step| match step {
                PathStep::Child(index) => *index as isize,
                PathStep::Default => -1,
            })
            .collect()
    }
}

impl fmt::Display for DispatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices: Vec<String> = self.to_indices().iter().map(isize::to_string).collect();
        write!(f, "[{}]", indices.join(", "))
    }
}

/// A successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub path: DispatchPath,
    /// Tokens after the matched command chain.
    pub args: Vec<String>,
    /// Data produced by the accepting filter, if it was a data filter.
    pub filter_data: Option<FilterData>,
}

impl Match {
    pub(crate) fn pushed(self, step: PathStep) -> Self {
        Self {
            path: self.path.pushed(step),
            ..self
        }
    }
}

/// Outcome of matching a message against a command node.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchVerdict {
    /// The command text did not match.
    NoMatch,
    /// The command matched, but a filter or every sub command rejected it.
    Rejected,
    Matched(Match),
}

impl MatchVerdict {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchVerdict::Matched(_))
    }

    pub fn as_match(&self) -> Option<&Match> {
        match self {
            MatchVerdict::Matched(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_match(self) -> Option<Match> {
        match self {
            MatchVerdict::Matched(m) => Some(m),
            _ => None,
        }
    }
}
