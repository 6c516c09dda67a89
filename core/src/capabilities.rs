//! Platform capability descriptor
//!
//! Resolved once at startup and handed to the components that degrade when a
//! feature is missing. Nothing re-probes the platform afterwards.

use std::fmt;

/// Which platform features the host can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// A graphics backend is attached
    pub graphics: bool,
    /// An audio output device may be opened
    pub audio: bool,
    /// The display can switch to fullscreen
    pub fullscreen: bool,
    /// Storage survives process exit
    pub durable_storage: bool,
}

impl PlatformCapabilities {
    /// Log the diagnostics report, one line per feature
    pub fn report(&self) {
        for (name, available) in self.entries() {
            if available {
                tracing::info!("{name}: available");
            } else {
                tracing::warn!("{name}: unavailable");
            }
        }
    }

    /// `(feature, available)` pairs in report order
    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            ("Graphics", self.graphics),
            ("Audio output", self.audio),
            ("Fullscreen", self.fullscreen),
            ("Durable storage", self.durable_storage),
        ]
    }
}

impl fmt::Display for PlatformCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, available) in self.entries() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{name}={}", if available { "yes" } else { "no" })?;
        }
        Ok(())
    }
}
