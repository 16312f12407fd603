use crate::id::NodeId;
use crate::model::{NodeType, Port};
use thiserror::Error;

/// A kernel could not produce a result from its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("{node_type} requires an input on `{port}`")]
    MissingInput { node_type: NodeType, port: Port },
}

/// An evaluation pass was aborted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("node `{node}` failed: {source}")]
    Kernel {
        node: NodeId,
        #[source]
        source: KernelError,
    },

    #[error("dependency cycle through node `{node}`")]
    Cycle { node: NodeId },
}

impl EvalError {
    /// The node the failure is attributed to.
    pub fn node(&self) -> NodeId {
        match self {
            EvalError::Kernel { node, .. } | EvalError::Cycle { node } => *node,
        }
    }
}
