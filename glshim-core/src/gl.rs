//! Legacy GL enum values understood by the matrix pipeline.

pub type GLenum = u32;

// Error codes
pub const INVALID_ENUM: GLenum = 0x0500;
pub const INVALID_OPERATION: GLenum = 0x0502;
pub const STACK_OVERFLOW: GLenum = 0x0503;
pub const STACK_UNDERFLOW: GLenum = 0x0504;

// Matrix modes
pub const MODELVIEW: GLenum = 0x1700;
pub const PROJECTION: GLenum = 0x1701;
pub const TEXTURE: GLenum = 0x1702;
