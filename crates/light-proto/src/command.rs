use serde::{Deserialize, Serialize};

/// Outbound command for a light entity.
///
/// Every value field is paired with a `has_*` flag. A field is only applied
/// by the device when its flag is set, which keeps "absent" distinguishable
/// from "zero". The red, green and blue fields share the `has_rgb` flag.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCommandRequest {
	pub key: u32,

	pub has_state: bool,
	pub state: bool,

	pub has_brightness: bool,
	pub brightness: f32,

	pub has_color_mode: bool,
	pub color_mode: u32,

	pub has_color_brightness: bool,
	pub color_brightness: f32,

	pub has_rgb: bool,
	pub red: f32,
	pub green: f32,
	pub blue: f32,

	pub has_white: bool,
	pub white: f32,

	/// Color temperature, in mireds.
	pub has_color_temperature: bool,
	pub color_temperature: f32,

	pub has_cold_white: bool,
	pub cold_white: f32,

	pub has_warm_white: bool,
	pub warm_white: f32,

	/// Transition length, in milliseconds.
	pub has_transition_length: bool,
	pub transition_length: u32,

	/// Flash length, in milliseconds.
	pub has_flash_length: bool,
	pub flash_length: u32,

	pub has_effect: bool,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub effect: String,
}

impl LightCommandRequest {
	pub fn new(key: u32) -> Self {
		Self {
			key,
			..Default::default()
		}
	}

	/// Returns `true` if at least one field is flagged as present.
	pub fn has_any(&self) -> bool {
		self.has_state
			|| self.has_brightness
			|| self.has_color_mode
			|| self.has_color_brightness
			|| self.has_rgb
			|| self.has_white
			|| self.has_color_temperature
			|| self.has_cold_white
			|| self.has_warm_white
			|| self.has_transition_length
			|| self.has_flash_length
			|| self.has_effect
	}
}
