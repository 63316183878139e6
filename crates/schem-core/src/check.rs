//! Wire graph invariant checks.
//!
//! Reports structural corruption without modifying the graph. Edit
//! sessions run these before anything is committed, so a broken graph
//! never reaches the authoritative snapshot.

use crate::geom::is_axis_aligned;
use crate::id::Id;
use crate::model::WireGraph;
use thiserror::Error;

/// A violated wire graph invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("wire {wire}: node at index {index} stores id {stored}")]
    IdMismatch { wire: Id, index: usize, stored: usize },

    #[error("wire {wire}: node {node} links to missing node {target}")]
    DanglingEdge { wire: Id, node: usize, target: usize },

    #[error("wire {wire}: node {node} links to itself")]
    SelfEdge { wire: Id, node: usize },

    #[error("wire {wire}: node {node} lists neighbour {target} more than once")]
    DuplicateEdge { wire: Id, node: usize, target: usize },

    #[error("wire {wire}: edge {node} -> {target} has no back-edge")]
    NonMutualEdge { wire: Id, node: usize, target: usize },

    #[error("wire {wire}: node {node} has no edges")]
    IsolatedNode { wire: Id, node: usize },

    #[error("wire {wire}: segment {a}-{b} is not axis-aligned")]
    Diagonal { wire: Id, a: usize, b: usize },

    #[error("wire id {wire} is used by more than one wire")]
    DuplicateWireId { wire: Id },
}

/// Collect every invariant violation in a graph.
#[must_use]
pub fn lint_wire(graph: &WireGraph) -> Vec<WireError> {
    let wire = graph.id;
    let mut errs = Vec::new();

    for (index, node) in graph.nodes.iter().enumerate() {
        if node.id != index {
            errs.push(WireError::IdMismatch {
                wire,
                index,
                stored: node.id,
            });
        }
        if node.edges.is_empty() {
            errs.push(WireError::IsolatedNode { wire, node: index });
        }
        for (slot, &target) in node.edges.iter().enumerate() {
            if target == index {
                errs.push(WireError::SelfEdge { wire, node: index });
                continue;
            }
            if node.edges[..slot].contains(&target) {
                errs.push(WireError::DuplicateEdge {
                    wire,
                    node: index,
                    target,
                });
                continue;
            }
            let Some(other) = graph.nodes.get(target) else {
                errs.push(WireError::DanglingEdge {
                    wire,
                    node: index,
                    target,
                });
                continue;
            };
            if !other.edges.contains(&index) {
                errs.push(WireError::NonMutualEdge {
                    wire,
                    node: index,
                    target,
                });
            }
            if index < target && !is_axis_aligned(node.pos, other.pos) {
                errs.push(WireError::Diagonal {
                    wire,
                    a: index,
                    b: target,
                });
            }
        }
    }
    errs
}

/// Validate one wire, returning the first violation.
///
/// # Errors
/// See [`WireError`].
pub fn check_wire(graph: &WireGraph) -> Result<(), WireError> {
    match lint_wire(graph).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Validate every wire of a layout, including id uniqueness.
///
/// # Errors
/// See [`WireError`].
pub fn check_wires(wires: &[WireGraph]) -> Result<(), WireError> {
    for (i, wire) in wires.iter().enumerate() {
        if wires[..i].iter().any(|w| w.id == wire.id) {
            return Err(WireError::DuplicateWireId { wire: wire.id });
        }
        check_wire(wire)?;
    }
    Ok(())
}
