use std::collections::VecDeque;

use crate::device::Device;
use crate::error::TransportError;
use crate::event::Wheel;

/// Scripted token source. Reports [`TransportError::Closed`] once drained.
#[derive(Debug, Default)]
pub struct VirtualDevice {
    id: String,
    name: String,
    tokens: VecDeque<String>,
}

impl VirtualDevice {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tokens: VecDeque::new(),
        }
    }

    /// Queue a raw token, exactly as the daemon would send it.
    pub fn feed(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push_back(token.into());
        self
    }

    pub fn press(&mut self, control: &str) -> &mut Self {
        self.feed(format!("{control}Press"))
    }

    pub fn release(&mut self, control: &str) -> &mut Self {
        self.feed(format!("{control}Release"))
    }

    /// Queue `detents` turns of `wheel`; negative counts turn backwards.
    pub fn turn(&mut self, wheel: Wheel, detents: i32) -> &mut Self {
        let suffix = match (wheel, detents >= 0) {
            (Wheel::MouseWheel, true) => "Down",
            (Wheel::MouseWheel, false) => "Up",
            (_, true) => "Right",
            (_, false) => "Left",
        };
        for _ in 0..detents.unsigned_abs() {
            self.feed(format!("{}{suffix}", wheel.name()));
        }
        self
    }

    pub fn pending(&self) -> usize {
        self.tokens.len()
    }
}

impl Device for VirtualDevice {
    fn next_token(&mut self) -> Result<Option<String>, TransportError> {
        self.tokens.pop_front().map(Some).ok_or(TransportError::Closed)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.id
    }
}
