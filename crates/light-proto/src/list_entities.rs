use serde::{Deserialize, Serialize};

/// Capability advertisement of a single light entity on a device.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntitiesLightResponse {
	/// Object id of the entity, as configured on the device.
	pub object_id: String,

	/// Key used to address the entity in state messages and commands.
	pub key: u32,

	/// Human readable name of the entity.
	pub name: String,

	/// Globally unique id of the entity.
	pub unique_id: String,

	/// Raw color mode bitmasks the light can operate in.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub supported_color_modes: Vec<u32>,

	/// Coldest supported color temperature, in mireds.
	#[serde(default)]
	pub min_mireds: f32,

	/// Warmest supported color temperature, in mireds.
	#[serde(default)]
	pub max_mireds: f32,

	/// Names of the effects the light supports.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub effects: Vec<String>,
}

impl ListEntitiesLightResponse {
	pub fn new(key: u32, object_id: impl Into<String>) -> Self {
		Self {
			key,
			object_id: object_id.into(),
			..Default::default()
		}
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
		self.unique_id = unique_id.into();
		self
	}

	pub fn supported_color_modes(mut self, modes: impl IntoIterator<Item = u32>) -> Self {
		self.supported_color_modes = modes.into_iter().collect();
		self
	}

	pub fn mireds(mut self, min: f32, max: f32) -> Self {
		self.min_mireds = min;
		self.max_mireds = max;
		self
	}

	pub fn effects<S: Into<String>>(mut self, effects: impl IntoIterator<Item = S>) -> Self {
		self.effects = effects.into_iter().map(Into::into).collect();
		self
	}
}
