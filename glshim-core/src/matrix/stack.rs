//! Bounded matrix stack for one transform category.
//!
//! Storage is allocated once at context creation with a category-specific
//! capacity. `top` indexes the active matrix and always stays within
//! `0..capacity`. The `identity` flag caches whether the active matrix is
//! exactly identity; when set, the driver can be reset with `glLoadIdentity`
//! instead of a 16-float upload.

use super::Matrix;
use crate::error::GlError;

/// One transform category's matrix stack.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Matrix>,
    top: usize,
    identity: bool,
}

impl MatrixStack {
    /// Create a stack holding up to `capacity` matrices (at least one).
    /// The bottom slot starts as identity.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            stack: vec![Matrix::IDENTITY; capacity],
            top: 0,
            identity: true,
        }
    }

    /// Maximum number of matrices this stack can hold.
    pub fn capacity(&self) -> usize {
        self.stack.len()
    }

    /// Number of matrices currently on the stack (1-based, like the
    /// `GL_*_STACK_DEPTH` queries).
    pub fn depth(&self) -> usize {
        self.top + 1
    }

    pub fn current(&self) -> &Matrix {
        &self.stack[self.top]
    }

    /// Cached identity flag for the active matrix.
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Duplicate the active matrix one level up.
    ///
    /// The identity flag carries over since the copy is bit-exact.
    pub fn push(&mut self) -> Result<(), GlError> {
        if self.top + 1 >= self.stack.len() {
            return Err(GlError::StackOverflow);
        }
        self.stack[self.top + 1] = self.stack[self.top];
        self.top += 1;
        Ok(())
    }

    /// Drop the active matrix and expose the one below it.
    pub fn pop(&mut self) -> Result<(), GlError> {
        if self.top == 0 {
            return Err(GlError::StackUnderflow);
        }
        self.top -= 1;
        self.identity = self.stack[self.top].is_identity();
        Ok(())
    }

    /// Replace the active matrix. Returns the refreshed identity flag.
    pub fn load(&mut self, m: &Matrix) -> bool {
        self.stack[self.top] = *m;
        self.identity = m.is_identity();
        self.identity
    }

    /// Reset the active matrix to identity without re-checking it.
    pub fn load_identity(&mut self) {
        self.stack[self.top] = Matrix::IDENTITY;
        self.identity = true;
    }

    /// `current := current × m`. Returns the refreshed identity flag.
    pub fn multiply(&mut self, m: &Matrix) -> bool {
        let top = &mut self.stack[self.top];
        *top *= *m;
        self.identity = top.is_identity();
        self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stack_is_identity_at_depth_one() {
        let stack = MatrixStack::new(4);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.capacity(), 4);
        assert!(stack.is_identity());
        assert!(stack.current().is_identity());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let stack = MatrixStack::new(0);
        assert_eq!(stack.capacity(), 1);
    }

    #[test]
    fn push_copies_top_and_keeps_flag() {
        let mut stack = MatrixStack::new(4);
        stack.load(&Matrix::translation(1.0, 2.0, 3.0));
        stack.push().unwrap();
        assert_eq!(stack.depth(), 2);
        assert_eq!(*stack.current(), Matrix::translation(1.0, 2.0, 3.0));
        assert!(!stack.is_identity());
    }

    #[test]
    fn push_at_capacity_overflows_without_change() {
        let mut stack = MatrixStack::new(2);
        stack.push().unwrap();
        stack.load(&Matrix::scale(2.0, 2.0, 2.0));
        assert_eq!(stack.push(), Err(GlError::StackOverflow));
        assert_eq!(stack.depth(), 2);
        assert_eq!(*stack.current(), Matrix::scale(2.0, 2.0, 2.0));
    }

    #[test]
    fn pop_at_bottom_underflows_without_change() {
        let mut stack = MatrixStack::new(2);
        stack.load(&Matrix::translation(0.0, 1.0, 0.0));
        assert_eq!(stack.pop(), Err(GlError::StackUnderflow));
        assert_eq!(stack.depth(), 1);
        assert_eq!(*stack.current(), Matrix::translation(0.0, 1.0, 0.0));
    }

    #[test]
    fn pop_recomputes_identity_flag() {
        let mut stack = MatrixStack::new(3);
        stack.push().unwrap();
        stack.multiply(&Matrix::scale(3.0, 3.0, 3.0));
        assert!(!stack.is_identity());
        stack.pop().unwrap();
        assert!(stack.is_identity());
    }

    #[test]
    fn multiply_by_inverse_restores_identity_flag() {
        let mut stack = MatrixStack::new(1);
        assert!(!stack.multiply(&Matrix::scale(2.0, 4.0, 8.0)));
        assert!(stack.multiply(&Matrix::scale(0.5, 0.25, 0.125)));
    }
}
