// Driver used by the replay tool: logs every mirrored call and counts them.
use glshim_core::{GlesDriver, MatrixMode};
use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriverStats {
    pub matrix_mode: usize,
    pub load_matrix: usize,
    pub load_identity: usize,
}

#[derive(Debug, Default)]
pub struct TraceDriver {
    stats: DriverStats,
}

impl TraceDriver {
    pub fn stats(&self) -> DriverStats {
        self.stats
    }
}

impl GlesDriver for TraceDriver {
    fn matrix_mode(&mut self, mode: MatrixMode) {
        log::info!("gles glMatrixMode(0x{:04X})", mode.as_gl());
        self.stats.matrix_mode += 1;
    }

    fn load_matrix(&mut self, m: &[f32; 16]) {
        log::info!("gles glLoadMatrixf({:?})", m);
        self.stats.load_matrix += 1;
    }

    fn load_identity(&mut self) {
        log::info!("gles glLoadIdentity()");
        self.stats.load_identity += 1;
    }
}
