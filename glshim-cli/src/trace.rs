//! JSON call traces
//!
//! A trace is a JSON array of calls, each tagged by name:
//!
//! ```json
//! [
//!   { "call": "matrix_mode", "mode": "projection" },
//!   { "call": "frustum", "left": -1, "right": 1, "bottom": -1, "top": 1, "near": 1, "far": 100 },
//!   { "call": "matrix_mode", "mode": 5888 },
//!   { "call": "translate", "x": 0, "y": 0, "z": -5 }
//! ]
//! ```
//!
//! Modes may be given by name or by raw enum value; unknown names are passed
//! through as an invalid enum so the context reports them like a real call.

use crate::driver::{DriverStats, TraceDriver};
use anyhow::{Context, Result};
use glshim_core::{gl, CommandList, GlContext, GlesDriver, Matrix, MatrixMode, MatrixTarget};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModeValue {
    Raw(u32),
    Named(String),
}

impl ModeValue {
    fn to_gl(&self) -> u32 {
        match self {
            ModeValue::Raw(raw) => *raw,
            ModeValue::Named(name) => match name.as_str() {
                "modelview" => gl::MODELVIEW,
                "projection" => gl::PROJECTION,
                "texture" => gl::TEXTURE,
                // Never a valid mode.
                _ => 0,
            },
        }
    }
}

/// One traced API call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    MatrixMode { mode: ModeValue },
    ActiveTexture { unit: usize },
    PushMatrix,
    PopMatrix,
    LoadIdentity,
    LoadMatrix { m: [f32; 16] },
    MultMatrix { m: [f32; 16] },
    Translate { x: f32, y: f32, z: f32 },
    Scale { x: f32, y: f32, z: f32 },
    Rotate { angle: f32, x: f32, y: f32, z: f32 },
    Ortho { left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32 },
    Frustum { left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32 },
    NewList,
    EndList,
    /// Replay the `index`-th list compiled so far in this trace.
    CallList { index: usize },
    BeginBatch,
    Flush,
    EndBatch,
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::MatrixMode { .. } => "glMatrixMode",
            Call::ActiveTexture { .. } => "glActiveTexture",
            Call::PushMatrix => "glPushMatrix",
            Call::PopMatrix => "glPopMatrix",
            Call::LoadIdentity => "glLoadIdentity",
            Call::LoadMatrix { .. } => "glLoadMatrixf",
            Call::MultMatrix { .. } => "glMultMatrixf",
            Call::Translate { .. } => "glTranslatef",
            Call::Scale { .. } => "glScalef",
            Call::Rotate { .. } => "glRotatef",
            Call::Ortho { .. } => "glOrthof",
            Call::Frustum { .. } => "glFrustumf",
            Call::NewList => "glNewList",
            Call::EndList => "glEndList",
            Call::CallList { .. } => "glCallList",
            Call::BeginBatch => "begin batch",
            Call::Flush => "flush",
            Call::EndBatch => "end batch",
        }
    }
}

pub fn load_trace(path: &Path) -> Result<Vec<Call>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace file {}", path.display()))?;
    parse_trace(&content).with_context(|| format!("Invalid trace file {}", path.display()))
}

pub fn parse_trace(content: &str) -> Result<Vec<Call>> {
    serde_json::from_str(content).context("Failed to parse trace")
}

/// A GL error observed after a traced call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    pub index: usize,
    pub call: &'static str,
    pub error: String,
    pub code: u32,
}

#[derive(Debug, Default)]
pub struct Replay {
    lists: Vec<CommandList>,
    errors: Vec<ErrorEvent>,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ErrorEvent] {
        &self.errors
    }

    pub fn compiled_lists(&self) -> usize {
        self.lists.len()
    }

    /// Run every call against `ctx`, collecting errors as they are raised.
    /// A batch left open at the end of the trace is flushed so the final
    /// state reflects every call.
    pub fn run<D: GlesDriver>(&mut self, ctx: &mut GlContext<D>, calls: &[Call]) {
        for (index, call) in calls.iter().enumerate() {
            self.apply(ctx, call);
            self.collect_error(ctx, index, call.name());
        }
        if ctx.is_batching() {
            ctx.end_batch();
            self.collect_error(ctx, calls.len(), Call::EndBatch.name());
        }
    }

    fn collect_error<D: GlesDriver>(
        &mut self,
        ctx: &mut GlContext<D>,
        index: usize,
        call: &'static str,
    ) {
        if let Some(err) = ctx.get_error() {
            self.errors.push(ErrorEvent {
                index,
                call,
                error: err.to_string(),
                code: err.code(),
            });
        }
    }

    fn apply<D: GlesDriver>(&mut self, ctx: &mut GlContext<D>, call: &Call) {
        match call {
            Call::MatrixMode { mode } => ctx.set_matrix_mode(mode.to_gl()),
            Call::ActiveTexture { unit } => ctx.set_active_texture(*unit),
            Call::PushMatrix => ctx.push_matrix(),
            Call::PopMatrix => ctx.pop_matrix(),
            Call::LoadIdentity => ctx.load_identity(),
            Call::LoadMatrix { m } => ctx.load_matrix(&Matrix::from_cols_array(*m)),
            Call::MultMatrix { m } => ctx.mult_matrix(&Matrix::from_cols_array(*m)),
            Call::Translate { x, y, z } => ctx.translate(*x, *y, *z),
            Call::Scale { x, y, z } => ctx.scale(*x, *y, *z),
            Call::Rotate { angle, x, y, z } => ctx.rotate(*angle, *x, *y, *z),
            Call::Ortho { left, right, bottom, top, near, far } => {
                ctx.ortho(*left, *right, *bottom, *top, *near, *far)
            }
            Call::Frustum { left, right, bottom, top, near, far } => {
                ctx.frustum(*left, *right, *bottom, *top, *near, *far)
            }
            Call::NewList => ctx.new_list(),
            Call::EndList => {
                if let Some(list) = ctx.end_list() {
                    log::debug!("trace list #{} holds {} ops", self.lists.len(), list.len());
                    self.lists.push(list);
                }
            }
            Call::CallList { index } => match self.lists.get(*index) {
                Some(list) => ctx.call_list(list),
                None => log::warn!("glCallList: no compiled list #{}", index),
            },
            Call::BeginBatch => ctx.begin_batch(),
            Call::Flush => ctx.flush(),
            Call::EndBatch => ctx.end_batch(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetReport {
    pub target: MatrixTarget,
    pub depth: usize,
    pub identity: bool,
    pub matrix: Matrix,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub mode: MatrixMode,
    pub active_texture: usize,
    pub targets: Vec<TargetReport>,
    pub errors: Vec<ErrorEvent>,
    pub compiled_lists: usize,
    pub driver: DriverStats,
}

impl ReplayReport {
    pub fn collect(ctx: &GlContext<TraceDriver>, replay: &Replay) -> Self {
        let units = ctx.config().texture_units;
        let targets = [MatrixTarget::ModelView, MatrixTarget::Projection]
            .into_iter()
            .chain((0..units).map(MatrixTarget::Texture))
            .filter_map(|target| {
                Some(TargetReport {
                    target,
                    depth: ctx.stack_depth(target)?,
                    identity: ctx.is_identity(target)?,
                    matrix: ctx.matrix(target)?,
                })
            })
            .collect();

        Self {
            mode: ctx.matrix_mode(),
            active_texture: ctx.active_texture(),
            targets,
            errors: replay.errors().to_vec(),
            compiled_lists: replay.compiled_lists(),
            driver: ctx.driver().stats(),
        }
    }
}
