//! Torch control through Linux sysfs flash LEDs
//!
//! Looks for writable `/sys/class/leds/*:flash` entries and drives their
//! `brightness` file. On other platforms discovery always comes back empty,
//! so native tracks report no torch capability.

use std::io;
use std::path::{Path, PathBuf};

const LEDS_DIR: &str = "/sys/class/leds";

/// A writable flash LED
#[derive(Debug, Clone)]
pub struct TorchLed {
    path: PathBuf,
    max_brightness: u32,
    name: String,
}

impl TorchLed {
    /// First writable flash LED on the system, in name order
    pub fn discover() -> Option<TorchLed> {
        if cfg!(target_os = "linux") {
            Self::discover_in(Path::new(LEDS_DIR)).into_iter().next()
        } else {
            None
        }
    }

    /// Scan a sysfs-style LED directory for `*:flash` entries
    pub fn discover_in(leds_dir: &Path) -> Vec<TorchLed> {
        let Ok(entries) = std::fs::read_dir(leds_dir) else {
            log::debug!("Cannot read {}, torch discovery skipped", leds_dir.display());
            return Vec::new();
        };

        let mut leds = Vec::new();
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.ends_with(":flash") {
                continue;
            }

            let led_path = entry.path();
            let max_brightness = match std::fs::read_to_string(led_path.join("max_brightness"))
                .ok()
                .and_then(|s| s.trim().parse::<u32>().ok())
            {
                Some(v) if v > 0 => v,
                _ => {
                    log::warn!("Flash LED {} has no usable max_brightness", name);
                    continue;
                }
            };

            if let Err(e) = std::fs::OpenOptions::new()
                .write(true)
                .open(led_path.join("brightness"))
            {
                log::warn!("Flash LED {} is not writable: {}", name, e);
                continue;
            }

            log::info!("Discovered flash LED {} (max {})", name, max_brightness);
            leds.push(TorchLed {
                path: led_path,
                max_brightness,
                name: name.to_string(),
            });
        }

        leds.sort_by(|a, b| a.name.cmp(&b.name));
        leds
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&self, on: bool) -> io::Result<()> {
        let value = if on { self.max_brightness } else { 0 };
        std::fs::write(self.path.join("brightness"), value.to_string())
    }
}
