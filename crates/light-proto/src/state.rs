use serde::{Deserialize, Serialize};

/// Periodic state report of a light entity.
///
/// The device reports every field on every message, regardless of the
/// color mode it is currently operating in.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightStateResponse {
	pub key: u32,

	/// Whether the light is on.
	pub state: bool,

	/// Master brightness, `0.0..=1.0`.
	pub brightness: f32,

	/// Bitmask of the active color mode.
	pub color_mode: u32,

	/// Brightness of the RGB channels, `0.0..=1.0`.
	pub color_brightness: f32,

	pub red: f32,
	pub green: f32,
	pub blue: f32,
	pub white: f32,

	/// Color temperature, in mireds.
	pub color_temperature: f32,

	pub cold_white: f32,
	pub warm_white: f32,

	/// Currently running effect.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub effect: Option<String>,
}
