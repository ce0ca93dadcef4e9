//! Leaf flattening of nested spaces.

use super::DynSpace;

/// Ordered primitive leaves reachable from `space`.
///
/// Traversal is depth-first: tuples left to right, dicts in key insertion
/// order. This is the same order as the fields of `Layout::compile`.
pub fn flatten_space(space: &DynSpace) -> Vec<&DynSpace> {
    let mut leaves = Vec::new();
    collect_leaves(space, &mut leaves);
    leaves
}

fn collect_leaves<'a>(space: &'a DynSpace, leaves: &mut Vec<&'a DynSpace>) {
    match space {
        DynSpace::Tuple(s) => {
            for child in &s.spaces {
                collect_leaves(child, leaves);
            }
        }
        DynSpace::Dict(s) => {
            for child in s.spaces.values() {
                collect_leaves(child, leaves);
            }
        }
        DynSpace::Box(_) | DynSpace::Discrete(_) | DynSpace::MultiDiscrete(_) => leaves.push(space),
    }
}
