#![deny(missing_docs)]
//! Interface crate to unify how the hashing work done by tree operations is
//! passed back to callers.
//!
//! Operations return their value wrapped in a [`CostContext`], carrying an
//! [`OperationCost`] next to it. Costs are accumulated with
//! [`CostContext::unwrap_add_cost`] and early returns keep what was already
//! spent through [`cost_return_on_error!`].

mod context;

use std::ops::{Add, AddAssign};

pub use context::{CostContext, CostResult, CostsExt};

/// Approximate amount of work an operation performed.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct OperationCost {
    /// How many times two node hashes were combined into a parent.
    pub hash_node_calls: u64,
    /// How many tree levels were walked, with or without hashing.
    pub levels_walked: u64,
}

impl OperationCost {
    /// Helper function to build default `OperationCost` with different
    /// `hash_node_calls`.
    pub fn with_hash_node_calls(hash_node_calls: u64) -> Self {
        OperationCost {
            hash_node_calls,
            ..Default::default()
        }
    }

    /// Helper function to build default `OperationCost` with different
    /// `levels_walked`.
    pub fn with_levels_walked(levels_walked: u64) -> Self {
        OperationCost {
            levels_walked,
            ..Default::default()
        }
    }

    /// Returns `true` if no work at all was recorded.
    pub fn is_nothing(&self) -> bool {
        self.hash_node_calls == 0 && self.levels_walked == 0
    }
}

impl Add for OperationCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        OperationCost {
            hash_node_calls: self.hash_node_calls + rhs.hash_node_calls,
            levels_walked: self.levels_walked + rhs.levels_walked,
        }
    }
}

impl AddAssign for OperationCost {
    fn add_assign(&mut self, rhs: Self) {
        self.hash_node_calls += rhs.hash_node_calls;
        self.levels_walked += rhs.levels_walked;
    }
}

/// Macro to achieve a kind of what `?` operator does, but with `CostContext` on
/// top. Main properties are:
/// 1. Early termination on error;
/// 2. Because of 1. `Result` is removed from the equation;
/// 3. `CostContext` if removed too because it is added to external cost
///    accumulator;
/// 4. Early termination uses external cost accumulator so previous
///    costs won't be lost.
#[macro_export]
macro_rules! cost_return_on_error {
    ( &mut $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result_with_cost = { $($body)+ };
            let result = result_with_cost.unwrap_add_cost(&mut $cost);
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}

/// Same as [`cost_return_on_error!`] but for a plain `Result`, so only the
/// previously accumulated cost is returned on error.
#[macro_export]
macro_rules! cost_return_on_error_no_add {
    ( $cost:ident, $($body:tt)+ ) => {
        {
            use $crate::CostsExt;
            let result = { $($body)+ };
            match result {
                Ok(x) => x,
                Err(e) => return Err(e).wrap_with_cost($cost),
            }
        }
    };
}
