use std::collections::HashMap;

use crate::object::Object;

/// Handle to a frame in [Environments]. Closures hold one of these instead
/// of owning their frame, so closures that capture each other form no
/// ownership cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnvId(usize);

#[derive(Debug, Default)]
struct Frame {
    bindings: HashMap<String, Object>,
    outer: Option<EnvId>,
}

/// Arena holding every scope frame of a session. Frames are only ever added
/// on top; [Environments::release] drops a suffix once nothing can reach it
/// any more, and the whole arena goes away with the session.
#[derive(Debug)]
pub struct Environments {
    frames: Vec<Frame>,
}

impl Default for Environments {
    fn default() -> Self {
        Self::new()
    }
}

impl Environments {
    pub fn new() -> Self {
        Self { frames: vec![Frame::default()] }
    }

    pub fn global(&self) -> EnvId {
        EnvId(0)
    }

    pub fn new_enclosed(&mut self, outer: EnvId) -> EnvId {
        self.frames.push(Frame { bindings: HashMap::new(), outer: Some(outer) });
        EnvId(self.frames.len() - 1)
    }

    /// Look a name up in `env`, then in each enclosing frame in turn.
    pub fn get(&self, env: EnvId, name: &str) -> Option<Object> {
        let mut current = Some(env);

        while let Some(EnvId(index)) = current {
            let frame = self.frames.get(index)?;
            if let Some(value) = frame.bindings.get(name) {
                return Some(value.clone());
            }
            current = frame.outer;
        }

        None
    }

    /// Bind `name` in `env` itself, shadowing any binding of an outer frame.
    pub fn set(&mut self, env: EnvId, name: impl Into<String>, value: Object) {
        if let Some(frame) = self.frames.get_mut(env.0) {
            frame.bindings.insert(name.into(), value);
        }
    }

    /// Drop `from` and every frame created after it. The global frame is
    /// never released.
    pub(crate) fn release(&mut self, from: EnvId) {
        self.frames.truncate(from.0.max(1));
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    // Never true while the global frame exists; paired with `len`
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let mut environments = Environments::new();
        let global = environments.global();
        environments.set(global, "x", Object::Integer(1));

        let inner = environments.new_enclosed(global);
        environments.set(inner, "y", Object::Integer(2));

        assert_eq!(environments.get(inner, "x"), Some(Object::Integer(1)));
        assert_eq!(environments.get(inner, "y"), Some(Object::Integer(2)));
        assert_eq!(environments.get(global, "y"), None);
        assert_eq!(environments.get(inner, "z"), None);
    }

    #[test]
    fn shadowing_is_local_to_the_frame() {
        let mut environments = Environments::new();
        let global = environments.global();
        environments.set(global, "x", Object::Integer(1));

        let inner = environments.new_enclosed(global);
        environments.set(inner, "x", Object::Integer(10));

        assert_eq!(environments.get(inner, "x"), Some(Object::Integer(10)));
        assert_eq!(environments.get(global, "x"), Some(Object::Integer(1)));
    }

    #[test]
    fn release_keeps_older_frames() {
        let mut environments = Environments::new();
        let global = environments.global();
        let first = environments.new_enclosed(global);
        let second = environments.new_enclosed(first);
        environments.new_enclosed(second);

        environments.release(second);
        assert_eq!(environments.len(), 2);

        environments.release(global);
        assert_eq!(environments.len(), 1);
        assert!(!environments.is_empty());
    }
}
