//! Dependency-ordered evaluation.
//!
//! Every call recomputes from scratch: the walk starts at the draw order,
//! visits each reachable node once in post-order, and runs its kernel with the
//! results of its already-evaluated sources.

use crate::document::Document;
use crate::error::EvalError;
use crate::geometry::EvalResult;
use crate::id::NodeId;
use crate::kernels::{KernelInputs, run_kernel};
use crate::model::Port;
use log::trace;
use std::collections::HashMap;

pub type EvalResults = HashMap<NodeId, EvalResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Sources-first order of every node reachable from the draw order.
///
/// Ids that name no node in the document are skipped. Reaching a node again
/// while it is still being visited is reported as a cycle.
pub fn evaluation_order(doc: &Document) -> Result<Vec<NodeId>, EvalError> {
    let mut marks: HashMap<NodeId, Visit> = HashMap::with_capacity(doc.len());
    let mut order = Vec::with_capacity(doc.len());
    for &root in doc.draw_order() {
        visit(doc, root, &mut marks, &mut order)?;
    }
    Ok(order)
}

fn visit(
    doc: &Document,
    id: NodeId,
    marks: &mut HashMap<NodeId, Visit>,
    order: &mut Vec<NodeId>,
) -> Result<(), EvalError> {
    match marks.get(&id) {
        Some(Visit::Done) => return Ok(()),
        Some(Visit::InProgress) => return Err(EvalError::Cycle { node: id }),
        None => {}
    }
    let Some(node) = doc.get_node(id) else {
        return Ok(());
    };
    marks.insert(id, Visit::InProgress);
    for (_, src) in node.dependencies() {
        visit(doc, src, marks, order)?;
    }
    marks.insert(id, Visit::Done);
    order.push(id);
    Ok(())
}

/// Evaluate every node reachable from the draw order. The first kernel
/// failure aborts the whole pass.
pub fn evaluate(doc: &Document) -> Result<EvalResults, EvalError> {
    let order = evaluation_order(doc)?;
    let mut results = EvalResults::with_capacity(order.len());
    for id in order {
        let Some(node) = doc.get_node(id) else {
            continue;
        };
        let inputs = KernelInputs {
            input: node.input(Port::In).and_then(|src| results.get(&src)),
        };
        let result =
            run_kernel(&node.kind, inputs).map_err(|source| EvalError::Kernel { node: id, source })?;
        trace!("eval: {id} ({}) -> {} contour(s)", node.node_type(), result.geom.contours.len());
        results.insert(id, result);
    }
    Ok(results)
}
