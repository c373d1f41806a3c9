//! Composite dependency trees
//!
//! A dependency tree is a boolean expression over [`Predicate`]s. Internal
//! nodes combine their children with AND or OR; leaves are predicates. Trees
//! are built once from the configuration and never hold install state: the
//! state is handed in on every evaluation, so a tree can be re-evaluated as
//! the install session changes flags and files.

pub mod predicate;

pub use predicate::{ExtensionPredicate, ModFileState, Predicate};

use crate::error::{EvaluationError, ParseError};
use crate::state::InstallState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Evaluation refuses trees nested deeper than this.
/// Parsed trees are already bounded by `ParserOptions::max_dependency_depth`.
pub const MAX_EVALUATION_DEPTH: usize = 256;

/// How a composite node combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyOperator {
    And,
    Or,
}

impl FromStr for DependencyOperator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "And" => Ok(DependencyOperator::And),
            "Or" => Ok(DependencyOperator::Or),
            _ => Err(ParseError::InvalidEnumValue {
                type_name: "DependencyOperator",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DependencyOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyOperator::And => write!(f, "AND"),
            DependencyOperator::Or => write!(f, "OR"),
        }
    }
}

/// A child of a composite node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    Predicate(Predicate),
    Composite(CompositeDependency),
}

impl Dependency {
    fn evaluate_at<S: InstallState + ?Sized>(&self, state: &S, depth: usize) -> Result<bool, EvaluationError> {
        match self {
            Dependency::Predicate(predicate) => predicate.evaluate(state),
            Dependency::Composite(composite) => composite.evaluate_at(state, depth),
        }
    }
}

impl From<Predicate> for Dependency {
    fn from(predicate: Predicate) -> Self {
        Dependency::Predicate(predicate)
    }
}

impl From<CompositeDependency> for Dependency {
    fn from(composite: CompositeDependency) -> Self {
        Dependency::Composite(composite)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Predicate(predicate) => predicate.fmt(f),
            Dependency::Composite(composite) => composite.fmt(f),
        }
    }
}

/// An AND/OR node over an ordered list of children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDependency {
    pub operator: DependencyOperator,
    pub dependencies: Vec<Dependency>,
}

impl CompositeDependency {
    pub fn new(operator: DependencyOperator) -> Self {
        Self {
            operator,
            dependencies: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(DependencyOperator::And)
    }

    pub fn or() -> Self {
        Self::new(DependencyOperator::Or)
    }

    /// Append a child and return self for chaining
    pub fn with<D: Into<Dependency>>(mut self, dependency: D) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn push<D: Into<Dependency>>(&mut self, dependency: D) {
        self.dependencies.push(dependency.into());
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Evaluate the tree against the current install state.
    ///
    /// Every child is evaluated, so an unresolvable extension condition is
    /// reported even when an earlier sibling already decided the result.
    /// An empty AND is true and an empty OR is false.
    pub fn evaluate<S: InstallState + ?Sized>(&self, state: &S) -> Result<bool, EvaluationError> {
        self.evaluate_at(state, 1)
    }

    fn evaluate_at<S: InstallState + ?Sized>(&self, state: &S, depth: usize) -> Result<bool, EvaluationError> {
        if depth > MAX_EVALUATION_DEPTH {
            return Err(EvaluationError::DependencyTooDeep {
                limit: MAX_EVALUATION_DEPTH,
            });
        }

        let mut all = true;
        let mut any = false;
        for dependency in &self.dependencies {
            let satisfied = dependency.evaluate_at(state, depth + 1)?;
            all &= satisfied;
            any |= satisfied;
        }

        match self.operator {
            DependencyOperator::And => Ok(all),
            DependencyOperator::Or => Ok(any),
        }
    }

    /// Nesting depth of composite nodes, counting this one
    pub fn depth(&self) -> usize {
        1 + self
            .dependencies
            .iter()
            .map(|dependency| match dependency {
                Dependency::Composite(composite) => composite.depth(),
                Dependency::Predicate(_) => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for CompositeDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dependencies.is_empty() {
            return match self.operator {
                DependencyOperator::And => write!(f, "(true)"),
                DependencyOperator::Or => write!(f, "(false)"),
            };
        }

        let separator = format!(" {} ", self.operator);
        let parts: Vec<String> = self.dependencies.iter().map(|d| d.to_string()).collect();
        write!(f, "({})", parts.join(&separator))
    }
}
