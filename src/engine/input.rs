use std::collections::HashSet;

use crossterm::event::KeyCode;

/// What a physical input means to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<C> {
    /// A game command (move, jump, select-cell, flip-card).
    Play(C),
    Start,
    TogglePause,
    Reset,
}

/// Per-game translation of key codes and pointer targets into actions.
pub trait Keymap {
    type Command;

    fn key(&mut self, code: KeyCode) -> Option<Action<Self::Command>>;

    /// `target` is the cell or card under the pointer, when the renderer found one.
    fn pointer(&mut self, target: Option<usize>) -> Option<Action<Self::Command>> {
        let _ = target;
        None
    }

    /// Keys that may auto-repeat while held (cursor movement).
    fn repeats(&self, code: KeyCode) -> bool {
        let _ = code;
        false
    }
}

/// Edge-triggered input: one action per physical key-down.
///
/// When the terminal reports key releases, a held key is latched until its
/// release arrives and repeated downs are dropped. Terminals without release
/// events cannot tell a held key from a new press, so every down counts.
pub struct InputMapper<K> {
    keymap: K,
    held: HashSet<KeyCode>,
    tracks_release: bool,
}

impl<K: Keymap> InputMapper<K> {
    pub fn new(keymap: K, tracks_release: bool) -> Self {
        Self {
            keymap,
            held: HashSet::new(),
            tracks_release,
        }
    }

    pub fn keymap(&self) -> &K {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut K {
        &mut self.keymap
    }

    pub fn on_key_down(&mut self, code: KeyCode) -> Option<Action<K::Command>> {
        if self.tracks_release && !self.held.insert(code) && !self.keymap.repeats(code) {
            return None;
        }
        self.keymap.key(code)
    }

    pub fn on_key_up(&mut self, code: KeyCode) {
        self.held.remove(&code);
    }

    pub fn on_pointer_down(&mut self, target: Option<usize>) -> Option<Action<K::Command>> {
        self.keymap.pointer(target)
    }

    /// Forget latched keys, e.g. when focus moves to another tab.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}
