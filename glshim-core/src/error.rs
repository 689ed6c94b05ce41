//! Error types
//!
//! GL-level errors are not returned to callers of the entry points. They are
//! latched into the context's last-error slot and read back through
//! `get_error`, mirroring `glGetError`. Stack and list internals still use
//! `Result<_, GlError>` so the context can decide where to report them.
//!
//! # Error Categories
//! - **GL usage errors**: bad enum values, stack overflow/underflow, misuse of
//!   the list lifecycle
//! - **Configuration errors**: invalid stack depths or texture unit counts

use thiserror::Error;

/// The subset of legacy GL error codes the matrix pipeline can raise.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlError {
    /// An enum argument was outside the accepted set (e.g. a bad matrix mode).
    #[error("invalid enum")]
    InvalidEnum,

    /// The call is not allowed in the current state.
    #[error("invalid operation")]
    InvalidOperation,

    /// `glPushMatrix` on a full stack.
    #[error("stack overflow")]
    StackOverflow,

    /// `glPopMatrix` on a stack holding a single matrix.
    #[error("stack underflow")]
    StackUnderflow,
}

impl GlError {
    /// Numeric `GL_*` error code.
    pub const fn code(self) -> u32 {
        match self {
            GlError::InvalidEnum => crate::gl::INVALID_ENUM,
            GlError::InvalidOperation => crate::gl::INVALID_OPERATION,
            GlError::StackOverflow => crate::gl::STACK_OVERFLOW,
            GlError::StackUnderflow => crate::gl::STACK_UNDERFLOW,
        }
    }
}

/// Rejected configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A matrix stack must hold at least one matrix.
    #[error("{stack} stack depth must be at least 1")]
    ZeroStackDepth { stack: &'static str },

    /// At least one texture unit is required for the texture matrix mode.
    #[error("texture unit count must be at least 1")]
    NoTextureUnits,
}
