use bitflags::bitflags;
use rkyv::{Archive, Deserialize, Serialize};

/// Key codes as produced by the front end (AWT virtual key values).
pub mod key {
    pub const ENTER: u16 = 10;
    pub const LEFT: u16 = 37;
    pub const UP: u16 = 38;
    pub const RIGHT: u16 = 39;
    pub const DOWN: u16 = 40;
    pub const SLASH: u16 = 47;
    pub const A: u16 = 65;
    pub const D: u16 = 68;
    pub const Q: u16 = 81;
    pub const S: u16 = 83;
    pub const W: u16 = 87;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Controls: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const FIRE = 1 << 4;
    }
}

/// Set of currently held key codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct InputSnapshot {
    codes: Vec<u16>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_codes(codes: impl IntoIterator<Item = u16>) -> Self {
        let mut snapshot = Self {
            codes: codes.into_iter().collect(),
        };
        snapshot.normalize();
        snapshot
    }

    /// Restores the sorted, duplicate-free form. Snapshots decoded off the
    /// wire carry whatever order the sender used.
    pub fn normalize(&mut self) {
        self.codes.sort_unstable();
        self.codes.dedup();
    }

    pub fn press(&mut self, code: u16) -> bool {
        match self.codes.binary_search(&code) {
            Ok(_) => false,
            Err(idx) => {
                self.codes.insert(idx, code);
                true
            }
        }
    }

    pub fn release(&mut self, code: u16) -> bool {
        match self.codes.iter().position(|&c| c == code) {
            Some(idx) => {
                self.codes.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, code: u16) -> bool {
        self.codes.binary_search(&code).is_ok()
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn codes(&self) -> &[u16] {
        &self.codes
    }

    /// Builds a snapshot in sender order, as it may arrive from a peer.
    #[cfg(test)]
    pub(crate) fn unnormalized(codes: Vec<u16>) -> Self {
        Self { codes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub left: u16,
    pub right: u16,
    pub up: u16,
    pub down: u16,
    pub fire: u16,
}

impl KeyBindings {
    pub const HOST: Self = Self {
        left: key::A,
        right: key::D,
        up: key::W,
        down: key::S,
        fire: key::Q,
    };

    pub const PEER: Self = Self {
        left: key::LEFT,
        right: key::RIGHT,
        up: key::UP,
        down: key::DOWN,
        fire: key::SLASH,
    };

    pub fn control_for(&self, code: u16) -> Controls {
        let mut controls = Controls::empty();
        controls.set(Controls::LEFT, code == self.left);
        controls.set(Controls::RIGHT, code == self.right);
        controls.set(Controls::UP, code == self.up);
        controls.set(Controls::DOWN, code == self.down);
        controls.set(Controls::FIRE, code == self.fire);
        controls
    }

    pub fn controls(&self, snapshot: &InputSnapshot) -> Controls {
        snapshot
            .codes()
            .iter()
            .fold(Controls::empty(), |acc, &code| acc | self.control_for(code))
    }

    pub fn is_fire(&self, code: u16) -> bool {
        code == self.fire
    }
}
