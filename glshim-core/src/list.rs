//! Command list recording
//!
//! While a display list is being compiled, or while batched execution is
//! active, matrix calls are captured here instead of touching the stacks.
//! A list is an append-only sequence of [`ListOp`]s. Consecutive multiplies
//! fold into the preceding matrix stage, so a run such as
//! `glLoadMatrixf(A); glTranslatef(..); glRotatef(..)` is stored as a single
//! load of `A × T × R`. Replaying goes back through the context's normal
//! apply path.

use crate::matrix::Matrix;
use crate::mode::MatrixMode;
use serde::{Deserialize, Serialize};

/// How a recorded matrix stage combines with the current matrix on replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixOp {
    /// `current := value`
    Load,
    /// `current := current × value`
    Multiply,
}

/// A recorded matrix operation with its (possibly folded) operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixStage {
    pub op: MatrixOp,
    pub value: Matrix,
}

/// One recorded unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOp {
    MatrixMode(MatrixMode),
    /// Texture unit that `GL_TEXTURE` mode routes to.
    ActiveTexture(usize),
    PushMatrix,
    PopMatrix,
    Matrix(MatrixStage),
}

/// An ordered, replayable sequence of recorded operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandList {
    ops: Vec<ListOp>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[ListOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True when the last recorded op is a matrix stage that a following
    /// multiply can be folded into.
    pub fn can_fold_multiply(&self) -> bool {
        matches!(self.ops.last(), Some(ListOp::Matrix(_)))
    }

    /// Record `op`, folding a multiply into the previous matrix stage when
    /// possible. Loads always start a new stage.
    pub fn record(&mut self, op: ListOp) {
        if let ListOp::Matrix(MatrixStage {
            op: MatrixOp::Multiply,
            value,
        }) = op
        {
            if self.can_fold_multiply() {
                if let Some(ListOp::Matrix(stage)) = self.ops.last_mut() {
                    stage.value *= value;
                }
                return;
            }
        }
        self.ops.push(op);
    }
}

impl IntoIterator for CommandList {
    type Item = ListOp;
    type IntoIter = std::vec::IntoIter<ListOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a CommandList {
    type Item = &'a ListOp;
    type IntoIter = std::slice::Iter<'a, ListOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
