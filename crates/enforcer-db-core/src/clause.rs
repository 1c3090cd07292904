//! Filter clauses.
//!
//! A [`ClauseList`] is an ordered sequence of predicates. Evaluation is a left
//! fold: the first clause seeds the result and every later clause is combined
//! into it with its own [`Operator`]. There is no precedence; group with
//! [`ClauseList::nested`] when it matters.
//!
//! Builders append an `Equal`/`And` clause and hand back `&mut Clause` so the
//! caller can override the comparison or operator in place:
//!
//! ```
//! use enforcer_db_core::{ClauseList, Comparison, Operator};
//!
//! let mut clauses = ClauseList::new();
//! clauses.equal("bits", 2048u32);
//! clauses
//!     .equal("algorithm", 8u32)
//!     .set_comparison(Comparison::GreaterOrEqual)
//!     .set_operator(Operator::Or);
//! assert_eq!(clauses.len(), 2);
//! ```

use std::fmt;

use crate::enums::DbEnum;
use crate::error::{Error, Result};
use crate::value::Value;

/// How a clause compares a column with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// `column = value`
    #[default]
    Equal,
    /// `column != value`
    NotEqual,
    /// `column < value`
    LessThan,
    /// `column <= value`
    LessOrEqual,
    /// `column >= value`
    GreaterOrEqual,
    /// `column > value`
    GreaterThan,
    /// `column IS NULL`; the value is ignored.
    IsNull,
    /// `column IS NOT NULL`; the value is ignored.
    IsNotNull,
}

impl Comparison {
    /// Operator symbol used in descriptions.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
            Comparison::LessThan => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::GreaterOrEqual => ">=",
            Comparison::GreaterThan => ">",
            Comparison::IsNull => "IS NULL",
            Comparison::IsNotNull => "IS NOT NULL",
        }
    }
}

/// How a clause combines with the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    /// Logical AND.
    #[default]
    And,
    /// Logical OR.
    Or,
}

/// What a clause tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Compare one column with a value.
    Compare {
        /// Column name.
        field: &'static str,
        /// Comparison to apply.
        comparison: Comparison,
        /// Right-hand side.
        value: Value,
    },
    /// A parenthesised group.
    Nested(ClauseList),
}

/// A single filter predicate with its combining operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    operator: Operator,
    predicate: Predicate,
}

impl Clause {
    /// An `Equal`/`And` clause on `field`.
    pub fn new(field: &'static str, value: impl Into<Value>) -> Self {
        Self {
            operator: Operator::And,
            predicate: Predicate::Compare {
                field,
                comparison: Comparison::Equal,
                value: value.into(),
            },
        }
    }

    /// A nested group combined with `And`.
    #[must_use]
    pub fn group(list: ClauseList) -> Self {
        Self {
            operator: Operator::And,
            predicate: Predicate::Nested(list),
        }
    }

    /// The combining operator.
    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The predicate.
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Override the combining operator.
    pub fn set_operator(&mut self, operator: Operator) -> &mut Self {
        self.operator = operator;
        self
    }

    /// Override the comparison. No effect on nested groups.
    pub fn set_comparison(&mut self, comparison: Comparison) -> &mut Self {
        if let Predicate::Compare { comparison: c, .. } = &mut self.predicate {
            *c = comparison;
        }
        self
    }

    /// Evaluate against a row through a column lookup.
    ///
    /// `lookup` returns `None` for unknown columns, which makes the clause
    /// fail with a precondition error.
    pub fn matches<'v>(&self, lookup: &dyn Fn(&str) -> Option<&'v Value>) -> Result<bool> {
        match &self.predicate {
            Predicate::Nested(list) => list.matches(lookup),
            Predicate::Compare {
                field,
                comparison,
                value,
            } => {
                let actual = lookup(field)
                    .ok_or_else(|| Error::precondition(format!("unknown column {field}")))?;
                Ok(compare(actual, *comparison, value))
            }
        }
    }
}

fn compare(actual: &Value, comparison: Comparison, expected: &Value) -> bool {
    use std::cmp::Ordering;

    match comparison {
        Comparison::IsNull => actual.is_null(),
        Comparison::IsNotNull => !actual.is_null(),
        _ if actual.is_null() || expected.is_null() => {
            // NULL never compares equal, unequal, smaller or larger.
            false
        }
        _ => {
            let Some(ordering) = actual.compare(expected) else {
                return false;
            };
            match comparison {
                Comparison::Equal => ordering == Ordering::Equal,
                Comparison::NotEqual => ordering != Ordering::Equal,
                Comparison::LessThan => ordering == Ordering::Less,
                Comparison::LessOrEqual => ordering != Ordering::Greater,
                Comparison::GreaterOrEqual => ordering != Ordering::Less,
                Comparison::GreaterThan => ordering == Ordering::Greater,
                Comparison::IsNull | Comparison::IsNotNull => unreachable!(),
            }
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Predicate::Nested(list) => write!(f, "({list})"),
            Predicate::Compare {
                field,
                comparison: c @ (Comparison::IsNull | Comparison::IsNotNull),
                ..
            } => write!(f, "{field} {}", c.symbol()),
            Predicate::Compare {
                field,
                comparison,
                value,
            } => write!(f, "{field} {} {value}", comparison.symbol()),
        }
    }
}

/// An ordered sequence of clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseList {
    clauses: Vec<Clause>,
}

impl ClauseList {
    /// An empty list, which matches every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// True when there are no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterate over the clauses.
    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    /// Append a prepared clause.
    pub fn push(&mut self, clause: Clause) -> &mut Clause {
        self.clauses.push(clause);
        let last = self.clauses.len() - 1;
        &mut self.clauses[last]
    }

    /// Append `field = value`.
    pub fn equal(&mut self, field: &'static str, value: impl Into<Value>) -> &mut Clause {
        self.push(Clause::new(field, value))
    }

    /// Append `field = key` for a foreign-key column.
    ///
    /// The value must be a non-empty primary key.
    pub fn foreign_key(&mut self, field: &'static str, value: &Value) -> Result<&mut Clause> {
        match value {
            Value::PrimaryKey(_) => Ok(self.equal(field, value.clone())),
            other => Err(Error::precondition(format!(
                "clause on {field} needs a primary key, got {}",
                other.kind()
            ))),
        }
    }

    /// Append `field = variant` for an enum column. `Invalid` is rejected.
    pub fn enumeration<T: DbEnum>(&mut self, field: &'static str, value: T) -> Result<&mut Clause> {
        let value = value.to_value()?;
        Ok(self.equal(field, value))
    }

    /// Append a nested group.
    pub fn nested(&mut self, list: ClauseList) -> &mut Clause {
        self.push(Clause::group(list))
    }

    /// Evaluate the list against a row through a column lookup.
    pub fn matches<'v>(&self, lookup: &dyn Fn(&str) -> Option<&'v Value>) -> Result<bool> {
        let mut iter = self.clauses.iter();
        let Some(first) = iter.next() else {
            return Ok(true);
        };
        let mut acc = first.matches(lookup)?;
        for clause in iter {
            let hit = clause.matches(lookup)?;
            acc = match clause.operator {
                Operator::And => acc && hit,
                Operator::Or => acc || hit,
            };
        }
        Ok(acc)
    }
}

impl fmt::Display for ClauseList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                match clause.operator {
                    Operator::And => f.write_str(" AND ")?,
                    Operator::Or => f.write_str(" OR ")?,
                }
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ClauseList {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}
