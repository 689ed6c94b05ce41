//! Reduced-API driver interface.
//!
//! The context never talks to GLES directly. Every piece of matrix state
//! that must reach the hardware goes through this trait, which keeps the
//! pipeline testable and lets the binding layer decide how entry points are
//! resolved.

use crate::mode::MatrixMode;

/// The three GLES 1.x matrix entry points the pipeline mirrors into.
pub trait GlesDriver {
    /// `glMatrixMode`. Only called when the selected mode actually changes.
    fn matrix_mode(&mut self, mode: MatrixMode);

    /// `glLoadMatrixf` with a column-major matrix.
    fn load_matrix(&mut self, m: &[f32; 16]);

    /// `glLoadIdentity`. Preferred over uploading an identity matrix since
    /// drivers may special-case it.
    fn load_identity(&mut self);
}

impl<D: GlesDriver + ?Sized> GlesDriver for Box<D> {
    fn matrix_mode(&mut self, mode: MatrixMode) {
        (**self).matrix_mode(mode);
    }

    fn load_matrix(&mut self, m: &[f32; 16]) {
        (**self).load_matrix(m);
    }

    fn load_identity(&mut self) {
        (**self).load_identity();
    }
}

/// Driver that discards everything. Useful for headless state tracking.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDriver;

impl GlesDriver for NullDriver {
    fn matrix_mode(&mut self, _mode: MatrixMode) {}

    fn load_matrix(&mut self, _m: &[f32; 16]) {}

    fn load_identity(&mut self) {}
}
