//! Value environment for one instantiation call.

use std::collections::HashMap;

use crate::value::Value;

/// A single frame of SSA bindings.
#[derive(Debug, Clone, Default)]
struct Frame {
    bindings: HashMap<String, Value>,
}

/// Frames with push/pop semantics.
///
/// Frame 0 holds module-level values and lives for the whole call. Each
/// nested class instantiation pushes its own frame; class bodies never see
/// the bindings of the class that instantiated them.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    /// Create a new environment with only the module frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Push a frame for a class instantiation.
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost frame. The module frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Bind a value in the innermost class frame.
    pub fn define_local(&mut self, name: &str, value: Value) {
        if self.frames.len() > 1 {
            if let Some(frame) = self.frames.last_mut() {
                frame.bindings.insert(name.to_string(), value);
            }
        }
    }

    /// Look up a value bound in the innermost class frame.
    pub fn get_local(&self, name: &str) -> Option<&Value> {
        if self.frames.len() > 1 {
            self.frames.last().and_then(|f| f.bindings.get(name))
        } else {
            None
        }
    }

    /// Bind a module-level value.
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.frames[0].bindings.insert(name.to_string(), value);
    }

    pub fn get_global(&self, name: &str) -> Option<&Value> {
        self.frames[0].bindings.get(name)
    }

    /// Number of class frames currently pushed.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
