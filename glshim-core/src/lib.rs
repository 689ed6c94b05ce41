//! Legacy OpenGL matrix pipeline for a desktop-GL-on-GLES shim.
//!
//! GLES 1.x drivers only know about the matrix currently loaded into them.
//! This crate keeps the full legacy state in software: matrix modes, bounded
//! per-category stacks, display-list recording, and mirrors the model-view
//! and projection results into a [`GlesDriver`].
//!
//! ```
//! use glshim_core::{gl, GlContext, Matrix};
//!
//! let mut ctx = GlContext::headless();
//! ctx.translate(1.0, 2.0, 3.0);
//! ctx.push_matrix();
//! ctx.scale(2.0, 2.0, 2.0);
//! ctx.pop_matrix();
//! assert_eq!(ctx.current_matrix(), Matrix::translation(1.0, 2.0, 3.0));
//!
//! ctx.set_matrix_mode(gl::PROJECTION);
//! ctx.ortho(0.0, 640.0, 480.0, 0.0, -1.0, 1.0);
//! assert_eq!(ctx.get_error(), None);
//! ```

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod gl;
pub mod list;
pub mod matrix;
pub mod mode;

pub use config::ShimConfig;
pub use context::GlContext;
pub use driver::{GlesDriver, NullDriver};
pub use error::{ConfigError, GlError};
pub use list::{CommandList, ListOp, MatrixOp, MatrixStage};
pub use matrix::{Matrix, MatrixStack};
pub use mode::{MatrixMode, MatrixTarget};
