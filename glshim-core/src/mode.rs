//! Matrix mode selection and per-category routing.
//!
//! `MatrixMode` is what the application selects with `glMatrixMode`.
//! `MatrixTarget` is the stack that mode resolves to once the active texture
//! unit is taken into account, and carries the one capability that differs
//! per category: whether the result is mirrored into the driver.

use crate::error::GlError;
use crate::gl::{self, GLenum};
use serde::{Deserialize, Serialize};

/// Transform category selected by `glMatrixMode`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum MatrixMode {
    #[default]
    ModelView = gl::MODELVIEW,
    Projection = gl::PROJECTION,
    Texture = gl::TEXTURE,
}

impl MatrixMode {
    /// Decode a raw `GL_MODELVIEW` / `GL_PROJECTION` / `GL_TEXTURE` value.
    pub fn from_gl(mode: GLenum) -> Result<Self, GlError> {
        match mode {
            gl::MODELVIEW => Ok(Self::ModelView),
            gl::PROJECTION => Ok(Self::Projection),
            gl::TEXTURE => Ok(Self::Texture),
            _ => Err(GlError::InvalidEnum),
        }
    }

    pub const fn as_gl(self) -> GLenum {
        self as GLenum
    }

    /// Resolve to a concrete stack. `active_texture` only matters for
    /// `Texture`.
    pub const fn target(self, active_texture: usize) -> MatrixTarget {
        match self {
            Self::ModelView => MatrixTarget::ModelView,
            Self::Projection => MatrixTarget::Projection,
            Self::Texture => MatrixTarget::Texture(active_texture),
        }
    }
}

/// A concrete matrix stack owned by the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixTarget {
    ModelView,
    Projection,
    /// Texture matrix stack of the given texture unit.
    Texture(usize),
}

impl MatrixTarget {
    /// Model-view and projection are uploaded to the driver after every
    /// change. Texture matrices are tracked in software only since the
    /// reduced API exposes fewer texture matrix slots than legacy GL.
    pub const fn mirrors_to_hardware(self) -> bool {
        match self {
            Self::ModelView | Self::Projection => true,
            Self::Texture(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_modes() {
        assert_eq!(MatrixMode::from_gl(0x1700), Ok(MatrixMode::ModelView));
        assert_eq!(MatrixMode::from_gl(0x1701), Ok(MatrixMode::Projection));
        assert_eq!(MatrixMode::from_gl(0x1702), Ok(MatrixMode::Texture));
    }

    #[test]
    fn decode_rejects_other_values() {
        assert_eq!(MatrixMode::from_gl(0x1703), Err(GlError::InvalidEnum));
        assert_eq!(MatrixMode::from_gl(0), Err(GlError::InvalidEnum));
    }

    #[test]
    fn enum_round_trip() {
        for mode in [MatrixMode::ModelView, MatrixMode::Projection, MatrixMode::Texture] {
            assert_eq!(MatrixMode::from_gl(mode.as_gl()), Ok(mode));
        }
    }

    #[test]
    fn default_mode_is_modelview() {
        assert_eq!(MatrixMode::default(), MatrixMode::ModelView);
    }

    #[test]
    fn texture_mode_routes_by_unit() {
        assert_eq!(MatrixMode::Texture.target(3), MatrixTarget::Texture(3));
        assert_eq!(MatrixMode::Projection.target(3), MatrixTarget::Projection);
    }

    #[test]
    fn only_texture_is_software_only() {
        assert!(MatrixTarget::ModelView.mirrors_to_hardware());
        assert!(MatrixTarget::Projection.mirrors_to_hardware());
        assert!(!MatrixTarget::Texture(0).mirrors_to_hardware());
    }
}
