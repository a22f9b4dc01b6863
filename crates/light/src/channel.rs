use crate::{
	ColorMode, LightChannelDef, LightChannelGroup, LightOptions, StateValue,
	channel_type::{ChannelType, ChannelTypeUid, ItemType},
	command::Command,
	processor::{Value, ValueError},
};
use enumset::EnumSet;
use esphome_light_proto::{LightCommandRequest, LightStateResponse, ListEntitiesLightResponse};
use slug::slugify;
use std::{borrow::Borrow, fmt, sync::Arc};

/// Host-facing identity of a channel,
/// `<thing_uid>:<module>:<object>:<group>#<kind>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelUid(Arc<str>);

impl ChannelUid {
	pub fn new(value: impl Into<Arc<str>>) -> Self {
		ChannelUid(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ChannelUid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&*self.0, f)
	}
}

impl Borrow<str> for ChannelUid {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ChannelUid {
	fn from(value: &str) -> Self {
		ChannelUid::new(value)
	}
}

impl From<String> for ChannelUid {
	fn from(value: String) -> Self {
		ChannelUid::new(value)
	}
}

/// Object id reduced to the characters allowed in a channel id segment.
pub(crate) fn object_slug(object_id: &str) -> String {
	slugify(object_id).replace('-', "_")
}

/// One materialized channel of a light. Immutable once built.
#[derive(Debug, Clone)]
pub struct LightChannel {
	uid: ChannelUid,
	kind: LightChannelDef,
	channel_type: Arc<ChannelType>,
	label: String,
	modes: EnumSet<ColorMode>,
	key: u32,
}

impl LightChannel {
	pub(crate) fn new(
		options: &LightOptions,
		light: &ListEntitiesLightResponse,
		kind: LightChannelDef,
		modes: EnumSet<ColorMode>,
		channel_type: Arc<ChannelType>,
	) -> Self {
		let uid = ChannelUid::new(format!(
			"{}:{}:{}:{}#{}",
			options.thing_uid,
			options.module,
			object_slug(&light.object_id),
			kind.group(),
			kind,
		));

		LightChannel {
			uid,
			kind,
			channel_type,
			label: format!("{} {}", light.name, kind),
			modes,
			key: light.key,
		}
	}

	pub fn uid(&self) -> &ChannelUid {
		&self.uid
	}

	pub fn kind(&self) -> LightChannelDef {
		self.kind
	}

	pub fn group(&self) -> LightChannelGroup {
		self.kind.group()
	}

	pub fn channel_type(&self) -> &Arc<ChannelType> {
		&self.channel_type
	}

	pub fn type_uid(&self) -> &ChannelTypeUid {
		&self.channel_type.uid
	}

	pub fn item_type(&self) -> ItemType {
		self.channel_type.item_type
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Key of the light this channel belongs to.
	pub fn key(&self) -> u32 {
		self.key
	}

	/// Modes this channel is supported under. Empty for channels that exist
	/// in every mode.
	pub fn modes(&self) -> EnumSet<ColorMode> {
		self.modes
	}

	pub fn is_enabled(&self, mode: ColorMode) -> bool {
		self.modes.is_empty() || self.modes.contains(mode)
	}

	/// Lowercase mode names joined by `, `, or `None` for channels present
	/// in every mode.
	pub fn color_mode_config(&self) -> Option<String> {
		if self.modes.is_empty() {
			return None;
		}

		let names = self
			.modes
			.iter()
			.map(|mode| mode.name().to_ascii_lowercase())
			.collect::<Vec<_>>();

		Some(names.join(", "))
	}

	pub fn handle_command(
		&self,
		request: &mut LightCommandRequest,
		command: &Command,
	) -> Result<Option<Value>, ValueError> {
		self.kind.processor().handle_command(request, command)
	}

	pub fn state(&self, state: &LightStateResponse) -> Result<Option<StateValue>, ValueError> {
		self.kind.processor().state(state)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::channel_type::{ChannelTypeProvider, DefaultChannelTypes};

	fn channel(kind: LightChannelDef, modes: EnumSet<ColorMode>) -> LightChannel {
		let options = LightOptions::new("esphome:device:hall");
		let light = ListEntitiesLightResponse::new(7, "Hall Ceiling")
			.name("Hall ceiling")
			.supported_color_modes([ColorMode::Rgb.bit_mask()]);
		let provider = DefaultChannelTypes::new(&options);
		let uid = provider.type_uid(kind, &light).unwrap();
		let ty = provider.channel_type(&uid, kind, &light).unwrap();

		LightChannel::new(&options, &light, kind, modes, Arc::new(ty))
	}

	#[test]
	fn uid_and_label() {
		let red = channel(LightChannelDef::Red, ColorMode::Rgb.into());

		assert_eq!(
			red.uid().as_str(),
			"esphome:device:hall:light:hall_ceiling:raw_state#red"
		);
		assert_eq!(red.label(), "Hall ceiling red");
		assert_eq!(red.key(), 7);
		assert_eq!(red.item_type(), ItemType::Dimmer);
	}

	#[test]
	fn call_parameters_use_their_group() {
		let flash = channel(LightChannelDef::FlashLength, EnumSet::empty());

		assert!(flash.uid().as_str().ends_with(":raw_call_param#flash_length"));
	}

	#[test]
	fn empty_mode_set_means_every_mode() {
		let on_off = channel(LightChannelDef::OnOff, EnumSet::empty());

		for mode in EnumSet::<ColorMode>::all() {
			assert!(on_off.is_enabled(mode));
		}
		assert_eq!(on_off.color_mode_config(), None);
	}

	#[test]
	fn mode_gated_channel() {
		let brightness = channel(
			LightChannelDef::MasterBrightness,
			ColorMode::Rgb | ColorMode::ColorTemperature,
		);

		assert!(brightness.is_enabled(ColorMode::Rgb));
		assert!(!brightness.is_enabled(ColorMode::OnOff));
		assert_eq!(
			brightness.color_mode_config().as_deref(),
			Some("color_temperature, rgb")
		);
	}

	#[test]
	fn commands_go_through_the_kind_processor() {
		let blue = channel(LightChannelDef::Blue, ColorMode::Rgb.into());
		let mut req = LightCommandRequest::new(blue.key());

		let written = blue.handle_command(&mut req, &Command::from(2.0f64)).unwrap();

		assert_eq!(written, Some(Value::Float(1.0)));
		assert!(req.has_rgb);
		assert_eq!(req.blue, 1.0);
	}
}
