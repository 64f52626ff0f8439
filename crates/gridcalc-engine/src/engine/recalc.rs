//! Recalculation ordering and circular dependency detection.
//!
//! When a cell changes, it and every cell that (transitively) references it
//! must be recomputed, each one only after everything it references. The
//! order is the reverse post-order of a depth-first walk over dependents.
//! The walk keeps its own stack, so long reference chains cannot overflow
//! the call stack, and reaching a cell that is still on the stack means
//! the graph contains a cycle.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::cell_name::CellName;
use super::deps::DependencyGraph;

/// A reference cycle found while ordering cells.
///
/// `path` starts and ends with the same cell; each cell in it references
/// the one before it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub path: Vec<CellName>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("circular reference ")?;
        for (idx, name) in self.path.iter().enumerate() {
            if idx > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", name)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame<'g> {
    cell: &'g CellName,
    pending: Vec<&'g CellName>,
}

impl<'g> Frame<'g> {
    fn new(cell: &'g CellName, graph: &'g DependencyGraph) -> Self {
        let mut pending: Vec<&CellName> = graph.dependents(cell).collect();
        // Popped from the back, so dependents are visited in name order.
        pending.sort_unstable_by(|a, b| b.cmp(a));
        Frame { cell, pending }
    }
}

/// Order `starts` and all of their transitive dependents for recalculation.
///
/// Every cell appears once, after every cell it references. Returns a
/// [`CycleError`] if any of the visited cells lies on a reference cycle.
pub fn cells_to_recalculate<'g, I>(
    graph: &'g DependencyGraph,
    starts: I,
) -> Result<Vec<CellName>, CycleError>
where
    I: IntoIterator<Item = &'g CellName>,
{
    let mut marks: HashMap<&CellName, Mark> = HashMap::new();
    let mut finished: Vec<&CellName> = Vec::new();

    for start in starts {
        if marks.contains_key(start) {
            continue;
        }
        marks.insert(start, Mark::InProgress);
        let mut stack = vec![Frame::new(start, graph)];

        while let Some(frame) = stack.last_mut() {
            let Some(next) = frame.pending.pop() else {
                let cell = frame.cell;
                stack.pop();
                marks.insert(cell, Mark::Done);
                finished.push(cell);
                continue;
            };

            match marks.get(next).copied() {
                Some(Mark::Done) => {}
                Some(Mark::InProgress) => {
                    let from = stack.iter().position(|f| f.cell == next).unwrap_or(0);
                    let mut path: Vec<CellName> =
                        stack[from..].iter().map(|f| f.cell.clone()).collect();
                    path.push(next.clone());
                    return Err(CycleError { path });
                }
                None => {
                    marks.insert(next, Mark::InProgress);
                    stack.push(Frame::new(next, graph));
                }
            }
        }
    }

    Ok(finished.into_iter().rev().cloned().collect())
}
