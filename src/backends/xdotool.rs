use std::process::Command;

use tracing::{debug, trace};

use crate::config::EffectorConfig;
use crate::error::EffectorError;
use crate::host::Effector;

/// Sends key events by running `xdotool keydown|keyup|key <keys>`.
#[derive(Debug, Clone)]
pub struct XdotoolEffector {
    program: String,
}

impl XdotoolEffector {
    pub fn new(config: &EffectorConfig) -> Self {
        Self {
            program: config.program.clone(),
        }
    }

    fn run<'a>(
        &self,
        action: &str,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), EffectorError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(action).args(keys);
        trace!(?cmd, "spawning effector");
        let status = cmd.status().map_err(|source| EffectorError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(EffectorError::Exit {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

impl Effector for XdotoolEffector {
    fn key_down(&mut self, keys: &[String]) -> Result<(), EffectorError> {
        debug!(?keys, "key down");
        self.run("keydown", keys.iter().map(String::as_str))
    }

    fn key_up(&mut self, keys: &[String]) -> Result<(), EffectorError> {
        debug!(?keys, "key up");
        self.run("keyup", keys.iter().map(String::as_str))
    }

    fn key_chord(&mut self, chord: &str) -> Result<(), EffectorError> {
        debug!(chord, "key chord");
        self.run("key", [chord])
    }
}
