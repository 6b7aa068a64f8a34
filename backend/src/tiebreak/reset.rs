//! Reset table
//!
//! Lets an operator move a whole priority group to a new base value before
//! tie-breaking, e.g. `"800:700"` rewrites the 800 group as 700, 701, ...

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors from the tie-break rewriter's configuration
#[derive(Debug, Error, PartialEq)]
pub enum TieBreakError {
    #[error("Invalid reset entry '{0}', expected '<old>:<new>'")]
    InvalidResetSpec(String),

    #[error("The reset priority {0} already exists as a priority group")]
    ResetCollision(i64),

    #[error("The reset priority {0} is the target of more than one group")]
    DuplicateResetTarget(i64),
}

/// Priority group → new base priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetMap {
    map: BTreeMap<i64, i64>,
}

impl ResetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(old, new)` pairs; the first mapping for a key wins
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let mut map = BTreeMap::new();
        for (old, new) in pairs {
            map.entry(old).or_insert(new);
        }
        Self { map }
    }

    /// Parse `"old:new, old:new"`
    ///
    /// # Example
    /// ```
    /// use orbit_deconflict_core_rs::ResetMap;
    ///
    /// let reset = ResetMap::parse("600:800, 1000:900").unwrap();
    /// assert_eq!(reset.target(600), Some(800));
    /// assert_eq!(reset.target(1000), Some(900));
    /// assert_eq!(reset.target(700), None);
    /// ```
    pub fn parse(spec: &str) -> Result<Self, TieBreakError> {
        let mut pairs = Vec::new();
        for element in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || TieBreakError::InvalidResetSpec(element.to_string());
            let (old, new) = element.split_once(':').ok_or_else(invalid)?;
            let old = old.trim().parse::<i64>().map_err(|_| invalid())?;
            let new = new.trim().parse::<i64>().map_err(|_| invalid())?;
            pairs.push((old, new));
        }
        Ok(Self::from_pairs(pairs))
    }

    /// New base for a priority group, if it is being reset
    pub fn target(&self, priority: i64) -> Option<i64> {
        self.map.get(&priority).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Check the table against the priority groups actually present
    ///
    /// A target may not collide with an existing group, and two groups
    /// may not be reset onto the same base.
    pub fn validate<F>(&self, group_exists: F) -> Result<(), TieBreakError>
    where
        F: Fn(i64) -> bool,
    {
        let mut seen = Vec::with_capacity(self.map.len());
        for &target in self.map.values() {
            if group_exists(target) {
                return Err(TieBreakError::ResetCollision(target));
            }
            if seen.contains(&target) {
                return Err(TieBreakError::DuplicateResetTarget(target));
            }
            seen.push(target);
        }
        Ok(())
    }
}

impl FromStr for ResetMap {
    type Err = TieBreakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_mapping_for_a_key_wins() {
        let reset = ResetMap::parse("5:50,5:60").unwrap();
        assert_eq!(reset.target(5), Some(50));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert_eq!(
            ResetMap::parse("600-800"),
            Err(TieBreakError::InvalidResetSpec("600-800".to_string()))
        );
        assert_eq!(
            ResetMap::parse("600:x"),
            Err(TieBreakError::InvalidResetSpec("600:x".to_string()))
        );
        assert!(ResetMap::parse("").unwrap().is_empty());
    }

    #[test]
    fn validate_detects_collisions() {
        let groups = [801_i64, 700];
        let exists = |p: i64| groups.contains(&p);

        assert!(ResetMap::parse("600:800, 1000:900").unwrap().validate(exists).is_ok());
        assert_eq!(
            ResetMap::parse("600:800, 1000:700").unwrap().validate(exists),
            Err(TieBreakError::ResetCollision(700))
        );
        assert_eq!(
            ResetMap::parse("600:800, 1000:800").unwrap().validate(exists),
            Err(TieBreakError::DuplicateResetTarget(800))
        );
    }
}
