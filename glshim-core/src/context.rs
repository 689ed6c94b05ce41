//! Matrix pipeline context
//!
//! `GlContext` owns every piece of matrix state a legacy GL context carries:
//! the selected matrix mode, one model-view stack, one projection stack, one
//! texture stack per texture unit, the display-list / batch recorder and the
//! last-error slot. It is an explicit value rather than an implicit current
//! context; callers keep one per GL context and drive it from one thread.
//!
//! Every mutating entry point goes through the same two steps:
//! 1. If a list is being compiled or a batch is open, the call is recorded
//!    into that [`CommandList`] and nothing else happens.
//! 2. Otherwise it is applied to the logical stack, the identity flag is
//!    refreshed, and model-view / projection results are mirrored into the
//!    [`GlesDriver`] (using `glLoadIdentity` when the result is identity).
//!
//! Replaying a list runs each op through the same path.

use crate::config::ShimConfig;
use crate::driver::{GlesDriver, NullDriver};
use crate::error::{ConfigError, GlError};
use crate::gl::GLenum;
use crate::list::{CommandList, ListOp, MatrixOp, MatrixStage};
use crate::matrix::{Matrix, MatrixStack};
use crate::mode::{MatrixMode, MatrixTarget};
use log::{debug, info, trace, warn};

/// Recording state: a display list being compiled and/or an open batch.
/// Compiling takes precedence when both are active.
#[derive(Debug, Default)]
struct ListState {
    compiling: Option<CommandList>,
    batch: Option<CommandList>,
}

impl ListState {
    fn recording(&mut self) -> Option<&mut CommandList> {
        self.compiling.as_mut().or(self.batch.as_mut())
    }

    fn is_recording(&self) -> bool {
        self.compiling.is_some() || self.batch.is_some()
    }
}

/// Legacy fixed-function matrix state mirrored onto a GLES driver.
pub struct GlContext<D: GlesDriver = NullDriver> {
    config: ShimConfig,
    driver: D,
    mode: MatrixMode,
    active_texture: usize,
    modelview: MatrixStack,
    projection: MatrixStack,
    texture: Vec<MatrixStack>,
    list: ListState,
    last_error: Option<GlError>,
}

impl GlContext<NullDriver> {
    /// Context with default limits that tracks state without a driver.
    pub fn headless() -> Self {
        Self::with_driver(NullDriver)
    }
}

impl<D: GlesDriver> GlContext<D> {
    /// Create a context with validated limits.
    ///
    /// All stacks start at depth 1 holding identity, and the mode is
    /// `GL_MODELVIEW`, which is also the driver's initial mode.
    pub fn new(config: ShimConfig, driver: D) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, driver))
    }

    /// Context with the default configuration.
    pub fn with_driver(driver: D) -> Self {
        Self::build(ShimConfig::default(), driver)
    }

    fn build(config: ShimConfig, driver: D) -> Self {
        info!(
            "Matrix context created: modelview depth {}, projection depth {}, {} texture units of depth {}",
            config.modelview_stack_depth,
            config.projection_stack_depth,
            config.texture_units,
            config.texture_stack_depth
        );
        Self {
            modelview: MatrixStack::new(config.modelview_stack_depth),
            projection: MatrixStack::new(config.projection_stack_depth),
            texture: (0..config.texture_units)
                .map(|_| MatrixStack::new(config.texture_stack_depth))
                .collect(),
            config,
            driver,
            mode: MatrixMode::ModelView,
            active_texture: 0,
            list: ListState::default(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    // -- Error slot ------------------------------------------------------

    /// `glGetError`: return the latched error and clear it.
    pub fn get_error(&mut self) -> Option<GlError> {
        self.last_error.take()
    }

    /// Peek at the latched error without clearing it.
    pub fn last_error(&self) -> Option<GlError> {
        self.last_error
    }

    fn report(&mut self, call: &str, result: Result<(), GlError>) {
        match result {
            Ok(()) => self.last_error = None,
            Err(err) => {
                warn!("{} raised {} (0x{:04X})", call, err, err.code());
                self.last_error = Some(err);
            }
        }
    }

    // -- Queries ---------------------------------------------------------

    pub fn matrix_mode(&self) -> MatrixMode {
        self.mode
    }

    pub fn active_texture(&self) -> usize {
        self.active_texture
    }

    /// Stack selected by the current mode and texture unit.
    pub fn current_target(&self) -> MatrixTarget {
        self.mode.target(self.active_texture)
    }

    /// Top of the currently selected stack.
    pub fn current_matrix(&self) -> Matrix {
        self.stack(self.current_target())
            .map(|s| *s.current())
            .unwrap_or(Matrix::IDENTITY)
    }

    /// Top of an arbitrary stack (`glGetFloatv(GL_*_MATRIX)`).
    pub fn matrix(&self, target: MatrixTarget) -> Option<Matrix> {
        self.stack(target).ok().map(|s| *s.current())
    }

    /// Depth of an arbitrary stack (`glGetIntegerv(GL_*_STACK_DEPTH)`).
    pub fn stack_depth(&self, target: MatrixTarget) -> Option<usize> {
        self.stack(target).ok().map(MatrixStack::depth)
    }

    /// Cached identity flag of an arbitrary stack.
    pub fn is_identity(&self, target: MatrixTarget) -> Option<bool> {
        self.stack(target).ok().map(MatrixStack::is_identity)
    }

    pub fn is_compiling(&self) -> bool {
        self.list.compiling.is_some()
    }

    pub fn is_batching(&self) -> bool {
        self.list.batch.is_some()
    }

    fn stack(&self, target: MatrixTarget) -> Result<&MatrixStack, GlError> {
        match target {
            MatrixTarget::ModelView => Ok(&self.modelview),
            MatrixTarget::Projection => Ok(&self.projection),
            MatrixTarget::Texture(unit) => self.texture.get(unit).ok_or(GlError::InvalidOperation),
        }
    }

    fn stack_mut(&mut self, target: MatrixTarget) -> Result<&mut MatrixStack, GlError> {
        match target {
            MatrixTarget::ModelView => Ok(&mut self.modelview),
            MatrixTarget::Projection => Ok(&mut self.projection),
            MatrixTarget::Texture(unit) => self
                .texture
                .get_mut(unit)
                .ok_or(GlError::InvalidOperation),
        }
    }

    // -- Mode / texture unit ---------------------------------------------

    /// `glMatrixMode`.
    pub fn set_matrix_mode(&mut self, mode: GLenum) {
        debug!("glMatrixMode(0x{:04X}), recording={}", mode, self.list.is_recording());
        match MatrixMode::from_gl(mode) {
            Ok(mode) => self.dispatch("glMatrixMode", ListOp::MatrixMode(mode)),
            Err(err) => self.report("glMatrixMode", Err(err)),
        }
    }

    /// Select the texture unit whose stack `GL_TEXTURE` mode routes to.
    /// Driven by the texture-unit state (`glActiveTexture`). While
    /// recording, the switch is recorded so later texture ops replay
    /// against the same unit.
    pub fn set_active_texture(&mut self, unit: usize) {
        debug!("active texture unit -> {}, recording={}", unit, self.list.is_recording());
        if unit >= self.texture.len() {
            self.report("glActiveTexture", Err(GlError::InvalidEnum));
            return;
        }
        self.dispatch("glActiveTexture", ListOp::ActiveTexture(unit));
    }

    // -- Stack operations ------------------------------------------------

    /// `glPushMatrix`.
    pub fn push_matrix(&mut self) {
        debug!("glPushMatrix(), recording={}", self.list.is_recording());
        self.dispatch("glPushMatrix", ListOp::PushMatrix);
    }

    /// `glPopMatrix`. Mirrored stacks re-upload the exposed matrix.
    pub fn pop_matrix(&mut self) {
        debug!("glPopMatrix(), recording={}", self.list.is_recording());
        self.dispatch("glPopMatrix", ListOp::PopMatrix);
    }

    /// `glLoadMatrixf` with a column-major matrix.
    pub fn load_matrix(&mut self, m: &Matrix) {
        debug!("glLoadMatrixf({:?}), recording={}", m.0, self.list.is_recording());
        self.dispatch(
            "glLoadMatrixf",
            ListOp::Matrix(MatrixStage {
                op: MatrixOp::Load,
                value: *m,
            }),
        );
    }

    /// `glMultMatrixf`: `current := current × m`.
    pub fn mult_matrix(&mut self, m: &Matrix) {
        debug!("glMultMatrixf({:?}), recording={}", m.0, self.list.is_recording());
        self.dispatch(
            "glMultMatrixf",
            ListOp::Matrix(MatrixStage {
                op: MatrixOp::Multiply,
                value: *m,
            }),
        );
    }

    /// `glLoadIdentity`.
    pub fn load_identity(&mut self) {
        debug!("glLoadIdentity(), recording={}", self.list.is_recording());
        let recorded = ListOp::Matrix(MatrixStage {
            op: MatrixOp::Load,
            value: Matrix::IDENTITY,
        });
        if self.try_record(recorded) {
            self.last_error = None;
            return;
        }
        let result = self.apply_load_identity();
        self.report("glLoadIdentity", result);
    }

    /// `glLoadMatrixd`.
    pub fn load_matrix_d(&mut self, m: &[f64; 16]) {
        self.load_matrix(&Matrix::from_f64(m));
    }

    /// `glMultMatrixd`.
    pub fn mult_matrix_d(&mut self, m: &[f64; 16]) {
        self.mult_matrix(&Matrix::from_f64(m));
    }

    /// `glLoadTransposeMatrixf` with a row-major matrix.
    pub fn load_transpose_matrix(&mut self, m: &[f32; 16]) {
        self.load_matrix(&Matrix::from_rows_array(*m));
    }

    /// `glMultTransposeMatrixf` with a row-major matrix.
    pub fn mult_transpose_matrix(&mut self, m: &[f32; 16]) {
        self.mult_matrix(&Matrix::from_rows_array(*m));
    }

    // -- Derived constructors --------------------------------------------

    /// `glTranslatef`.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        debug!("glTranslatef({}, {}, {})", x, y, z);
        self.mult_matrix(&Matrix::translation(x, y, z));
    }

    /// `glScalef`.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        debug!("glScalef({}, {}, {})", x, y, z);
        self.mult_matrix(&Matrix::scale(x, y, z));
    }

    /// `glRotatef`. A zero angle or zero-length axis does nothing at all:
    /// no multiply, no recording, no error.
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        debug!("glRotatef({}, {}, {}, {})", angle, x, y, z);
        if let Some(m) = Matrix::rotation(angle, x, y, z) {
            self.mult_matrix(&m);
        }
    }

    /// `glOrthof`. Degenerate ranges are passed through unchecked.
    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        debug!(
            "glOrthof({}, {}, {}, {}, {}, {})",
            left, right, bottom, top, near, far
        );
        self.mult_matrix(&Matrix::orthographic(left, right, bottom, top, near, far));
    }

    /// `glFrustumf`. Degenerate ranges are passed through unchecked.
    pub fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        debug!(
            "glFrustumf({}, {}, {}, {}, {}, {})",
            left, right, bottom, top, near, far
        );
        self.mult_matrix(&Matrix::frustum(left, right, bottom, top, near, far));
    }

    // -- Display lists / batching ----------------------------------------

    /// `glNewList(.., GL_COMPILE)`: start capturing calls into a new list.
    pub fn new_list(&mut self) {
        debug!("glNewList()");
        if self.list.compiling.is_some() {
            self.report("glNewList", Err(GlError::InvalidOperation));
            return;
        }
        self.list.compiling = Some(CommandList::new());
        self.last_error = None;
    }

    /// `glEndList`: stop capturing and hand the list to the caller.
    pub fn end_list(&mut self) -> Option<CommandList> {
        debug!("glEndList()");
        match self.list.compiling.take() {
            Some(list) => {
                debug!("compiled list with {} ops", list.len());
                self.last_error = None;
                Some(list)
            }
            None => {
                self.report("glEndList", Err(GlError::InvalidOperation));
                None
            }
        }
    }

    /// `glCallList`: run each recorded op as if it had just been issued.
    ///
    /// While recording, the ops are recorded again (and fold with what is
    /// already there). The first error raised during replay is reported;
    /// replay continues past it.
    pub fn call_list(&mut self, list: &CommandList) {
        debug!("glCallList({} ops), recording={}", list.len(), self.list.is_recording());
        let mut first_error = None;
        for op in list {
            if let Err(err) = self.execute(*op) {
                first_error.get_or_insert(err);
            }
        }
        self.report("glCallList", first_error.map_or(Ok(()), Err));
    }

    /// Start deferring matrix calls into a context-owned batch.
    pub fn begin_batch(&mut self) {
        debug!("begin batch");
        if self.list.batch.is_none() {
            self.list.batch = Some(CommandList::new());
        }
        self.last_error = None;
    }

    /// Apply everything deferred so far. Batching stays active.
    pub fn flush(&mut self) {
        let pending = self
            .list
            .batch
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        debug!("flushing batch of {} ops", pending.len());
        let mut first_error = None;
        for op in pending {
            if let Err(err) = self.apply(op) {
                first_error.get_or_insert(err);
            }
        }
        self.report("batch flush", first_error.map_or(Ok(()), Err));
    }

    /// Flush the batch and return to immediate mode.
    pub fn end_batch(&mut self) {
        self.flush();
        self.list.batch = None;
        debug!("end batch");
    }

    // -- Apply path ------------------------------------------------------

    fn try_record(&mut self, op: ListOp) -> bool {
        match self.list.recording() {
            Some(list) => {
                list.record(op);
                true
            }
            None => false,
        }
    }

    fn execute(&mut self, op: ListOp) -> Result<(), GlError> {
        if self.try_record(op) {
            return Ok(());
        }
        self.apply(op)
    }

    fn dispatch(&mut self, call: &str, op: ListOp) {
        let result = self.execute(op);
        self.report(call, result);
    }

    /// Apply one op to the logical state and mirror the result.
    fn apply(&mut self, op: ListOp) -> Result<(), GlError> {
        let target = self.current_target();
        match op {
            ListOp::MatrixMode(mode) => {
                if self.mode != mode {
                    self.mode = mode;
                    self.driver.matrix_mode(mode);
                }
            }
            ListOp::ActiveTexture(unit) => {
                if unit >= self.texture.len() {
                    return Err(GlError::InvalidEnum);
                }
                self.active_texture = unit;
            }
            ListOp::PushMatrix => self.stack_mut(target)?.push()?,
            ListOp::PopMatrix => {
                self.stack_mut(target)?.pop()?;
                self.mirror(target);
            }
            ListOp::Matrix(MatrixStage { op, value }) => {
                let stack = self.stack_mut(target)?;
                match op {
                    MatrixOp::Load => stack.load(&value),
                    MatrixOp::Multiply => stack.multiply(&value),
                };
                self.mirror(target);
            }
        }
        Ok(())
    }

    fn apply_load_identity(&mut self) -> Result<(), GlError> {
        let target = self.current_target();
        self.stack_mut(target)?.load_identity();
        if target.mirrors_to_hardware() {
            trace!("gles glLoadIdentity() for {:?}", target);
            self.driver.load_identity();
        }
        Ok(())
    }

    /// Push the top of `target` to the driver if that category is mirrored.
    fn mirror(&mut self, target: MatrixTarget) {
        if !target.mirrors_to_hardware() {
            return;
        }
        let Ok(stack) = self.stack(target) else {
            return;
        };
        let (identity, top) = (stack.is_identity(), *stack.current());
        if identity {
            trace!("gles glLoadIdentity() for {:?}", target);
            self.driver.load_identity();
        } else {
            trace!("gles glLoadMatrixf({:?}) for {:?}", top.0, target);
            self.driver.load_matrix(top.as_array());
        }
    }
}

impl<D: GlesDriver> Drop for GlContext<D> {
    fn drop(&mut self) {
        if let Some(list) = &self.list.compiling {
            warn!("Matrix context destroyed while compiling a list of {} ops", list.len());
        }
        info!("Matrix context destroyed");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
