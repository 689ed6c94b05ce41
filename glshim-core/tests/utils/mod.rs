//! Test Utilities
//!
//! A driver double that records every call the context mirrors into it, and
//! matrix assertion helpers with a float tolerance.

#![allow(dead_code)]

use glshim_core::{GlContext, GlesDriver, Matrix, MatrixMode, ShimConfig};

/// One call observed by [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    MatrixMode(MatrixMode),
    LoadMatrix(Matrix),
    LoadIdentity,
}

#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub calls: Vec<DriverCall>,
}

impl RecordingDriver {
    pub fn uploads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DriverCall::LoadMatrix(_) | DriverCall::LoadIdentity))
            .count()
    }

    pub fn mode_changes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DriverCall::MatrixMode(_)))
            .count()
    }

    pub fn last(&self) -> Option<&DriverCall> {
        self.calls.last()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl GlesDriver for RecordingDriver {
    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.calls.push(DriverCall::MatrixMode(mode));
    }

    fn load_matrix(&mut self, m: &[f32; 16]) {
        self.calls.push(DriverCall::LoadMatrix(Matrix(*m)));
    }

    fn load_identity(&mut self) {
        self.calls.push(DriverCall::LoadIdentity);
    }
}

/// Context with default limits and a fresh recording driver.
pub fn recording_context() -> GlContext<RecordingDriver> {
    GlContext::with_driver(RecordingDriver::default())
}

/// Context with small stacks so overflow is cheap to reach.
pub fn small_context(depth: usize) -> GlContext<RecordingDriver> {
    let config = ShimConfig {
        modelview_stack_depth: depth,
        projection_stack_depth: depth,
        texture_stack_depth: depth,
        texture_units: 2,
    };
    GlContext::new(config, RecordingDriver::default()).unwrap()
}

/// Assert that two matrices agree element-wise within `1e-5`.
pub fn assert_matrix_close(expected: &Matrix, actual: &Matrix, message: &str) {
    for i in 0..16 {
        let (e, a) = (expected.0[i], actual.0[i]);
        assert!(
            (e - a).abs() <= 1e-5,
            "{}: element {} differs: expected {}, got {}",
            message,
            i,
            e,
            a
        );
    }
}
