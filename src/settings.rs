//! Typed settings map (§6, §A.3).

use crate::error::{Error, Result};

/// The settings the core recognises, each with a documented default (§6).
#[derive(Copy, Clone, Debug)]
pub struct Settings {
    pub render_scale: f32,
    pub render_samples: u32,
    pub shadow_point_resolution: (u32, u32),
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            render_scale: 1.0,
            render_samples: 1,
            shadow_point_resolution: (2048, 2048),
        }
    }
}

impl Settings {
    /// Reads the three documented keys from a [`config::Config`], falling
    /// back to the documented default for any key that is absent.
    pub fn from_config(config: &config::Config) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Ok(v) = config.get_float("renderScale") {
            if v <= 0.0 {
                return Err(Error::InvalidState("renderScale must be > 0"));
            }
            settings.render_scale = v as f32;
        }
        if let Ok(v) = config.get_int("renderSamples") {
            if v < 1 {
                return Err(Error::InvalidState("renderSamples must be >= 1"));
            }
            settings.render_samples = v as u32;
        }
        if let Ok(w) = config.get_int("shadowPointResolution.0") {
            let h = config.get_int("shadowPointResolution.1").unwrap_or(w);
            settings.shadow_point_resolution = (w as u32, h as u32);
        }

        Ok(settings)
    }
}
