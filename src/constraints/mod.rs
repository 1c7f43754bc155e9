//! Post-processing of cliques into cardinality constraints.
//!
//! Vertices double as SAT literals: vertex `2i` is the positive literal of
//! variable `i`, vertex `2i + 1` its negation. A hyperclique over a clause
//! set bounds how many of its literals can hold simultaneously, which this
//! module turns into signed at-least constraints, simplified against unit
//! clauses and merged.

use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use crate::{
    search::CliqueResult,
    types::{EdgeId, FxIndexMap, Vertex},
};

/// A vertex read as a SAT literal.
pub type Literal = Vertex;

/// The variable index of a literal.
pub fn variable_of(literal: Literal) -> usize {
    literal >> 1
}

/// Whether the literal is the positive one of its variable.
pub fn is_positive(literal: Literal) -> bool {
    literal % 2 == 0
}

/// The relation a constraint states over its signed sum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConstraintKind {
    /// Signed sum at least the bound.
    AtLeast,
    /// Signed sum equal to the bound.
    Equals,
}

/// A signed cardinality constraint over a set of literals.
///
/// Positive literals contribute `+x`, negative ones `-x`, and the signed sum
/// relates to `bound` through `kind`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CardinalityConstraint {
    /// The sorted literals of the constraint, one per variable.
    pub literals: BTreeSet<Literal>,
    /// The right-hand side of the relation.
    pub bound: i64,
    /// The relation.
    pub kind: ConstraintKind,
    /// The hyperedge ids the constraint was inferred from.
    pub inferred_by: Vec<EdgeId>,
}

impl CardinalityConstraint {
    /// Derives the at-least constraint of a hyperclique found at rank k.
    ///
    /// Complementary literal pairs cancel out, each raising the bound by
    /// one. Returns `None` when every literal cancels.
    pub fn from_clique(clique: &CliqueResult) -> Option<Self> {
        let vertices = &clique.vertices;
        let mut literals: BTreeSet<Literal> = BTreeSet::new();
        let mut cancelled = 0i64;
        let mut negatives = 0i64;

        let mut i = 0;
        while i < vertices.len() {
            if i + 1 < vertices.len() && vertices[i] >> 1 == vertices[i + 1] >> 1 {
                cancelled += 1;
                i += 2;
                continue;
            }
            if !is_positive(vertices[i]) {
                negatives += 1;
            }
            literals.insert(vertices[i]);
            i += 1;
        }

        if literals.is_empty() {
            return None;
        }

        // Every k-subset of the clique is a clause, so at most k - 1 of its
        // literals can be falsified together.
        let n = literals.len() as i64;
        let k = clique.rank as i64;
        let bound = n - k + 1 - negatives + cancelled;

        Some(Self {
            literals,
            bound,
            kind: ConstraintKind::AtLeast,
            inferred_by: clique.edges.clone(),
        })
    }

    /// The `Equals` constraint of a unit clause, stated on the positive
    /// literal of the variable.
    pub fn from_unit(literal: Literal, edge: EdgeId) -> Self {
        let positive = literal & !1;
        Self {
            literals: BTreeSet::from([positive]),
            bound: is_positive(literal) as i64,
            kind: ConstraintKind::Equals,
            inferred_by: vec![edge],
        }
    }

    fn negatives(&self) -> i64 {
        self.literals.iter().filter(|&&l| !is_positive(l)).count() as i64
    }

    fn positives(&self) -> i64 {
        self.literals.len() as i64 - self.negatives()
    }

    /// Substitutes unit-fixed variables into at-least constraints.
    ///
    /// Each fixed variable leaves the literal set and its term value leaves
    /// the bound; constraints that can no longer be violated are dropped.
    pub fn simplify(
        constraints: Vec<Self>,
        fixed: &FxIndexMap<usize, bool>,
    ) -> Vec<Self> {
        constraints
            .into_iter()
            .filter_map(|mut c| {
                if c.kind != ConstraintKind::AtLeast {
                    return Some(c);
                }

                let known: Vec<Literal> = c
                    .literals
                    .iter()
                    .copied()
                    .filter(|l| fixed.contains_key(&variable_of(*l)))
                    .collect();
                for literal in known {
                    let value = fixed[&variable_of(literal)] as i64;
                    let term = if is_positive(literal) { value } else { -value };
                    c.bound -= term;
                    c.literals.remove(&literal);
                }

                if c.bound > c.positives() {
                    warn!("unsatisfiable cardinality constraint: {c}");
                    return Some(c);
                }
                // The signed sum is at least -(number of negative literals).
                if c.literals.is_empty() || c.bound <= -c.negatives() {
                    return None;
                }
                Some(c)
            })
            .collect()
    }

    /// Deduplicates and drops implied constraints.
    ///
    /// An at-least constraint is implied by any kept one over a subset of
    /// its literals with an equal or larger bound.
    pub fn merge(constraints: Vec<Self>) -> Vec<Self> {
        let mut result: Vec<Self> = Vec::new();
        for c in constraints {
            if result
                .iter()
                .any(|r| r.kind == c.kind && r.bound >= c.bound && r.literals.is_subset(&c.literals))
            {
                continue;
            }
            result.retain(|r| {
                !(r.kind == c.kind && c.bound >= r.bound && c.literals.is_subset(&r.literals))
            });
            result.push(c);
        }
        result
    }
}

impl fmt::Display for CardinalityConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &literal in &self.literals {
            if is_positive(literal) {
                write!(f, " + x{}", variable_of(literal))?;
            } else {
                write!(f, " - x{}", variable_of(literal))?;
            }
        }
        match self.kind {
            ConstraintKind::AtLeast => write!(f, " >= {}", self.bound),
            ConstraintKind::Equals => write!(f, " = {}", self.bound),
        }
    }
}
