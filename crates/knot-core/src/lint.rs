//! Lint diagnostics for node graphs.
//!
//! Reports structural issues without modifying the document, so a host can
//! explain why an evaluation pass would fail before running it.

use crate::document::Document;
use crate::id::NodeId;
use crate::model::NodeKind;
use petgraph::algo::tarjan_scc;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Evaluation will fail or silently skip work.
    Warning,
    /// Legal but probably unintended.
    Info,
}

/// A single lint diagnostic for a graph node.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    pub node_id: NodeId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-input", "cycle").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the document and return diagnostics.
#[must_use]
pub fn lint_document(doc: &Document) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_inputs(doc, &mut diags);
    lint_cycles(doc, &mut diags);
    lint_degenerate_shapes(doc, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// Warn on modifier ports that are unconnected or name a missing node.
fn lint_inputs(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    for node in doc.nodes() {
        for (port, src) in &node.inputs {
            match src {
                None => diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!(
                        "`{}` ({}) has nothing connected to `{port}`.",
                        node.id,
                        node.node_type()
                    ),
                    severity: LintSeverity::Warning,
                    rule: "unconnected-input",
                }),
                Some(r) if !doc.contains(r.node) => diags.push(LintDiagnostic {
                    node_id: node.id,
                    message: format!(
                        "`{}`.{port} reads from `{}`, which does not exist.",
                        node.id, r.node
                    ),
                    severity: LintSeverity::Warning,
                    rule: "dangling-input",
                }),
                Some(_) => {}
            }
        }
    }
}

/// Warn on every node that sits on a dependency cycle.
fn lint_cycles(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    let graph = doc.graph();
    for component in tarjan_scc(graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|n| graph.find_edge(*n, *n).is_some());
        if !cyclic {
            continue;
        }
        for idx in component {
            let id = graph[idx].id;
            diags.push(LintDiagnostic {
                node_id: id,
                message: format!("`{id}` depends on itself through its inputs."),
                severity: LintSeverity::Warning,
                rule: "cycle",
            });
        }
    }
}

/// Info on shapes that collapse to a line or a point.
fn lint_degenerate_shapes(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    for node in doc.nodes() {
        let degenerate = match &node.kind {
            NodeKind::Rect(p) => p.w == 0.0 || p.h == 0.0,
            NodeKind::Ellipse(p) => p.rx == 0.0 || p.ry() == 0.0,
            NodeKind::Transform(_) | NodeKind::Offset(_) => false,
        };
        if degenerate {
            diags.push(LintDiagnostic {
                node_id: node.id,
                message: format!("`{}` has zero area and will not be visible.", node.id),
                severity: LintSeverity::Info,
                rule: "degenerate-shape",
            });
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
