//! Logical keys and the flags they drive
//!
//! Key handlers write the flags at any time between frames; the update step
//! reads them once at its start and never assumes they change mid-step. A
//! press and release that both land between two steps may be missed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    MoveLeft,
    MoveRight,
    Launch,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value to a logical key
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "a" | "A" | "ArrowLeft" => Some(Key::MoveLeft),
            "d" | "D" | "ArrowRight" => Some(Key::MoveRight),
            " " | "Enter" => Some(Key::Launch),
            _ => None,
        }
    }
}

/// Current held/pressed state of the logical keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub move_left: bool,
    pub move_right: bool,
    /// Set on a launch key press, cleared when an update step consumes it
    pub launch: bool,
    /// Launch key is down; repeated presses before a release are ignored
    launch_held: bool,
}

impl InputState {
    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::MoveLeft => self.move_left = true,
            Key::MoveRight => self.move_right = true,
            Key::Launch => {
                if !self.launch_held {
                    self.launch = true;
                }
                self.launch_held = true;
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::MoveLeft => self.move_left = false,
            Key::MoveRight => self.move_right = false,
            // the pending edge stays until a step consumes it
            Key::Launch => self.launch_held = false,
        }
    }

    /// Take the pending launch edge
    pub fn take_launch(&mut self) -> bool {
        std::mem::take(&mut self.launch)
    }
}
