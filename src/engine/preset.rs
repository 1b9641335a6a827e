/* src/engine/preset.rs */

use serde::{Deserialize, Serialize};

/// A named shortcut that toggles one typed flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
	/// Display label, unique within a configuration.
	pub label: String,
	/// Typed flag the preset drives.
	pub flag: String,
}

impl Preset {
	pub fn new(label: impl Into<String>, flag: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			flag: flag.into(),
		}
	}
}

/// Presets shipped for the stock host.
pub fn builtin_presets() -> Vec<Preset> {
	vec![
		Preset::new("New Player UI", "delhi_modern_web_player"),
		Preset::new("New Icons", "enable_web_delhi_icons"),
	]
}
