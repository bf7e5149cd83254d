//! Lexical scopes stored in an arena and addressed by index.
//!
//! Blocks nest strictly, so the arena behaves like a stack: a child scope is
//! always pushed on top of its parent and popped before the parent is.

use std::collections::HashMap;

use crate::lang::{Error, Value};
use crate::sequencer::SongId;

use super::sprite::SpriteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    vars: HashMap<String, Value>,
    sprites: HashMap<String, SpriteId>,
    songs: HashMap<String, SongId>,
    active_sprite: Option<SpriteId>,
    active_song: Option<SongId>,
    active_frame: Option<(SpriteId, usize)>,
    active_sheet: Option<(SongId, usize)>,
}

#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a child scope of `parent`.
    pub fn push(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Close `scope` and everything opened after it.
    pub fn pop(&mut self, scope: ScopeId) {
        if scope.0 > 0 {
            self.scopes.truncate(scope.0);
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Walk from `scope` outward to the root.
    fn chain(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> {
        let mut next = Some(scope);
        std::iter::from_fn(move || {
            let id = next?;
            let s = &self.scopes[id.0];
            next = s.parent;
            Some(s)
        })
    }

    /// Declare (or redeclare) a variable in `scope`.
    pub fn define(&mut self, scope: ScopeId, name: &str, value: Value) {
        self.scopes[scope.0].vars.insert(name.to_string(), value);
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Result<Value, Error> {
        self.chain(scope)
            .find_map(|s| s.vars.get(name))
            .cloned()
            .ok_or_else(|| Error::runtime(format!("undefined variable '{name}'")))
    }

    /// Assign to the nearest declaration of `name`. Fails if there is none.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<(), Error> {
        let mut next = Some(scope);
        while let Some(id) = next {
            let s = &mut self.scopes[id.0];
            if let Some(slot) = s.vars.get_mut(name) {
                *slot = value;
                return Ok(());
            }
            next = s.parent;
        }
        Err(Error::runtime(format!("undefined variable '{name}'")))
    }

    pub fn define_sprite(&mut self, scope: ScopeId, name: &str, id: SpriteId) {
        self.scopes[scope.0].sprites.insert(name.to_string(), id);
    }

    pub fn lookup_sprite(&self, scope: ScopeId, name: &str) -> Result<SpriteId, Error> {
        self.chain(scope)
            .find_map(|s| s.sprites.get(name).copied())
            .ok_or_else(|| Error::runtime(format!("undefined sprite '{name}'")))
    }

    pub fn define_song(&mut self, scope: ScopeId, name: &str, id: SongId) {
        self.scopes[scope.0].songs.insert(name.to_string(), id);
    }

    pub fn lookup_song(&self, scope: ScopeId, name: &str) -> Result<SongId, Error> {
        self.chain(scope)
            .find_map(|s| s.songs.get(name).copied())
            .ok_or_else(|| Error::runtime(format!("undefined song '{name}'")))
    }

    pub fn set_active_sprite(&mut self, scope: ScopeId, id: Option<SpriteId>) {
        self.scopes[scope.0].active_sprite = id;
    }

    /// The sprite whose block encloses `scope`, if any.
    pub fn active_sprite(&self, scope: ScopeId) -> Option<SpriteId> {
        self.chain(scope).find_map(|s| s.active_sprite)
    }

    pub fn set_active_song(&mut self, scope: ScopeId, id: Option<SongId>) {
        self.scopes[scope.0].active_song = id;
    }

    /// The song whose block encloses `scope`, if any.
    pub fn active_song(&self, scope: ScopeId) -> Option<SongId> {
        self.chain(scope).find_map(|s| s.active_song)
    }

    pub fn set_active_frame(&mut self, scope: ScopeId, frame: Option<(SpriteId, usize)>) {
        self.scopes[scope.0].active_frame = frame;
    }

    /// The sprite frame whose FRAME block encloses `scope`, if any.
    pub fn active_frame(&self, scope: ScopeId) -> Option<(SpriteId, usize)> {
        self.chain(scope).find_map(|s| s.active_frame)
    }

    pub fn set_active_sheet(&mut self, scope: ScopeId, sheet: Option<(SongId, usize)>) {
        self.scopes[scope.0].active_sheet = sheet;
    }

    /// The song sheet whose SHEET block encloses `scope`, if any.
    pub fn active_sheet(&self, scope: ScopeId) -> Option<(SongId, usize)> {
        self.chain(scope).find_map(|s| s.active_sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let mut env = Environment::new();
        let root = env.root();
        env.define(root, "X", Value::Number(5.0));
        assert_eq!(env.get(root, "X").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn undefined_variable() {
        let env = Environment::new();
        let err = env.get(env.root(), "NOPE").unwrap_err();
        assert_eq!(err.message(), "undefined variable 'NOPE'");
    }

    #[test]
    fn assign_requires_declaration() {
        let mut env = Environment::new();
        let root = env.root();
        assert!(env.assign(root, "X", Value::Null).is_err());
        env.define(root, "X", Value::Null);
        assert!(env.assign(root, "X", Value::Bool(true)).is_ok());
        assert_eq!(env.get(root, "X").unwrap(), Value::Bool(true));
    }

    #[test]
    fn child_sees_parent_and_assigns_outward() {
        let mut env = Environment::new();
        let root = env.root();
        env.define(root, "X", Value::Number(1.0));
        let child = env.push(root);
        assert_eq!(env.get(child, "X").unwrap(), Value::Number(1.0));
        env.assign(child, "X", Value::Number(2.0)).unwrap();
        env.pop(child);
        assert_eq!(env.get(root, "X").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn child_declarations_vanish_on_pop() {
        let mut env = Environment::new();
        let root = env.root();
        let child = env.push(root);
        env.define(child, "Y", Value::Number(1.0));
        env.pop(child);
        assert!(env.get(root, "Y").is_err());
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn shadowing() {
        let mut env = Environment::new();
        let root = env.root();
        env.define(root, "X", Value::Number(1.0));
        let child = env.push(root);
        env.define(child, "X", Value::Number(2.0));
        assert_eq!(env.get(child, "X").unwrap(), Value::Number(2.0));
        env.pop(child);
        assert_eq!(env.get(root, "X").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn root_cannot_be_popped() {
        let mut env = Environment::new();
        let root = env.root();
        env.pop(root);
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn sprites_and_songs_resolve_outward() {
        let mut env = Environment::new();
        let root = env.root();
        env.define_sprite(root, "hero", SpriteId(0));
        env.define_song(root, "theme", SongId(3));
        let child = env.push(root);
        let grandchild = env.push(child);
        assert_eq!(env.lookup_sprite(grandchild, "hero").unwrap(), SpriteId(0));
        assert_eq!(env.lookup_song(grandchild, "theme").unwrap(), SongId(3));
        assert!(env.lookup_song(grandchild, "other").is_err());
    }

    #[test]
    fn active_targets_walk_outward() {
        let mut env = Environment::new();
        let root = env.root();
        assert!(env.active_sprite(root).is_none());
        env.set_active_sprite(root, Some(SpriteId(1)));
        let child = env.push(root);
        assert_eq!(env.active_sprite(child), Some(SpriteId(1)));
        env.set_active_sprite(root, None);
        assert!(env.active_sprite(child).is_none());

        env.set_active_song(child, Some(SongId(2)));
        assert_eq!(env.active_song(child), Some(SongId(2)));
        assert!(env.active_song(root).is_none());
    }

    #[test]
    fn frame_and_sheet_markers_end_with_their_scope() {
        let mut env = Environment::new();
        let root = env.root();
        let frame = env.push(root);
        env.set_active_frame(frame, Some((SpriteId(0), 1)));
        let inner = env.push(frame);
        assert_eq!(env.active_frame(inner), Some((SpriteId(0), 1)));
        env.pop(frame);
        assert!(env.active_frame(root).is_none());

        let sheet = env.push(root);
        env.set_active_sheet(sheet, Some((SongId(2), 0)));
        assert_eq!(env.active_sheet(sheet), Some((SongId(2), 0)));
        env.pop(sheet);
        assert!(env.active_sheet(root).is_none());
    }
}
