use crate::{
	ChannelUid, ColorMode, Command, LightChannel, LightChannelDef, StateValue,
	processor::ValueError,
};
use enumset::EnumSet;
use esphome_light_proto::{LightCommandRequest, LightStateResponse, ListEntitiesLightResponse};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{Level, debug, error, instrument, trace, warn};

/// State fields fanned out after the color mode, in report order.
const STATE_FIELDS: [LightChannelDef; 11] = [
	LightChannelDef::ColorTemperature,
	LightChannelDef::White,
	LightChannelDef::WarmWhite,
	LightChannelDef::ColdWhite,
	LightChannelDef::Red,
	LightChannelDef::Green,
	LightChannelDef::Blue,
	LightChannelDef::MasterBrightness,
	LightChannelDef::ColorBrightness,
	LightChannelDef::OnOff,
	LightChannelDef::Effect,
];

#[derive(Debug, Error)]
#[error("failed to convert command for '{kind}' channel")]
pub struct CommandError {
	kind: LightChannelDef,
	source: ValueError,
}

impl CommandError {
	pub fn kind(&self) -> LightChannelDef {
		self.kind
	}
}

/// A converted value for one channel, ready to be published by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
	pub uid: ChannelUid,
	pub kind: LightChannelDef,
	pub value: StateValue,
}

/// The channels of a light that are enabled under one color mode.
#[derive(Debug)]
pub struct ColorModeChannels {
	mode: ColorMode,
	by_uid: HashMap<ChannelUid, Arc<LightChannel>>,
	by_kind: HashMap<LightChannelDef, Arc<LightChannel>>,
}

impl ColorModeChannels {
	fn new<'a>(mode: ColorMode, channels: impl IntoIterator<Item = &'a Arc<LightChannel>>) -> Self {
		let channels = channels
			.into_iter()
			.filter(|channel| channel.is_enabled(mode))
			.collect::<Vec<_>>();

		ColorModeChannels {
			mode,
			by_uid: channels
				.iter()
				.map(|channel| (channel.uid().clone(), Arc::clone(channel)))
				.collect(),
			by_kind: channels
				.iter()
				.map(|channel| (channel.kind(), Arc::clone(channel)))
				.collect(),
		}
	}

	pub fn mode(&self) -> ColorMode {
		self.mode
	}

	pub fn get(&self, uid: &str) -> Option<&Arc<LightChannel>> {
		self.by_uid.get(uid)
	}

	pub fn get_kind(&self, kind: LightChannelDef) -> Option<&Arc<LightChannel>> {
		self.by_kind.get(&kind)
	}

	pub fn kinds(&self) -> EnumSet<LightChannelDef> {
		self.by_kind.keys().copied().collect()
	}

	pub fn len(&self) -> usize {
		self.by_uid.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_uid.is_empty()
	}
}

/// A device light and its materialized channels.
///
/// A light is immutable once built. A re-advertised device gets a fresh
/// `Light` that replaces the old one as a whole.
#[derive(Debug)]
pub struct Light {
	key: u32,
	object_id: String,
	unique_id: String,
	name: String,
	supported_modes: EnumSet<ColorMode>,
	channels: Vec<Arc<LightChannel>>,
	by_uid: HashMap<ChannelUid, Arc<LightChannel>>,
	by_kind: HashMap<LightChannelDef, Arc<LightChannel>>,
	by_mode: HashMap<ColorMode, ColorModeChannels>,
}

static_assertions::assert_impl_all!(Light: Send, Sync);

impl Light {
	pub(crate) fn new(
		light: &ListEntitiesLightResponse,
		supported_modes: EnumSet<ColorMode>,
		channels: impl IntoIterator<Item = LightChannel>,
	) -> Self {
		let channels = channels.into_iter().map(Arc::new).collect::<Vec<_>>();
		let by_uid = channels
			.iter()
			.map(|channel| (channel.uid().clone(), Arc::clone(channel)))
			.collect();
		let by_kind = channels
			.iter()
			.map(|channel| (channel.kind(), Arc::clone(channel)))
			.collect();
		let by_mode = supported_modes
			.iter()
			.map(|mode| (mode, ColorModeChannels::new(mode, &channels)))
			.collect();

		Light {
			key: light.key,
			object_id: light.object_id.clone(),
			unique_id: light.unique_id.clone(),
			name: light.name.clone(),
			supported_modes,
			channels,
			by_uid,
			by_kind,
			by_mode,
		}
	}

	pub fn key(&self) -> u32 {
		self.key
	}

	pub fn object_id(&self) -> &str {
		&self.object_id
	}

	pub fn unique_id(&self) -> &str {
		&self.unique_id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Decoded modes the device advertised. Never contains
	/// [ColorMode::Unknown].
	pub fn supported_modes(&self) -> EnumSet<ColorMode> {
		self.supported_modes
	}

	/// Every materialized channel, in catalog order.
	pub fn channels(&self) -> &[Arc<LightChannel>] {
		&self.channels
	}

	pub fn channel(&self, uid: &str) -> Option<&Arc<LightChannel>> {
		self.by_uid.get(uid)
	}

	pub fn channel_by_kind(&self, kind: LightChannelDef) -> Option<&Arc<LightChannel>> {
		self.by_kind.get(&kind)
	}

	pub fn for_color_mode(&self, mode: ColorMode) -> Option<&ColorModeChannels> {
		self.by_mode.get(&mode)
	}

	/// Translates `command` for the channel `uid` into a request for this
	/// light.
	///
	/// Returns `Ok(None)` if the channel does not belong to this light. A
	/// command that does not apply to the channel still yields a request,
	/// with no field set.
	#[instrument(
		level = Level::DEBUG,
		name = "Light::handle_command",
		skip_all,
		fields(
			light.key = self.key,
			channel.uid = %uid,
		)
	)]
	pub fn handle_command(
		&self,
		uid: &str,
		command: &Command,
	) -> Result<Option<LightCommandRequest>, CommandError> {
		let Some(channel) = self.by_uid.get(uid) else {
			warn!("command for unknown channel");
			return Ok(None);
		};

		let mut request = LightCommandRequest::new(self.key);
		match channel.handle_command(&mut request, command) {
			Ok(Some(value)) => {
				trace!(channel.kind = %channel.kind(), ?value, "command value written")
			}
			Ok(None) => trace!(
				channel.kind = %channel.kind(),
				?command,
				"command does not apply to channel"
			),
			Err(source) => {
				return Err(CommandError {
					kind: channel.kind(),
					source,
				});
			}
		}

		Ok(Some(request))
	}

	/// Fans a state report out into one update per materialized channel.
	///
	/// Every field is reported whatever the active mode. Fields that fail
	/// to convert are logged and skipped.
	#[instrument(
		level = Level::DEBUG,
		name = "Light::handle_state",
		skip_all,
		fields(
			light.key = self.key,
			color_mode.mask = state.color_mode,
		)
	)]
	pub fn handle_state(&self, state: &LightStateResponse) -> Vec<StateUpdate> {
		let mut updates = Vec::new();
		if state.key != self.key {
			warn!(report.key = state.key, "state report for another light");
			return updates;
		}

		match self.by_kind.get(&LightChannelDef::ColorMode) {
			Some(channel) => push_state(channel, state, &mut updates),
			None => error!(
				channel.kind = %LightChannelDef::ColorMode,
				"color mode channel is not materialized"
			),
		}

		for kind in STATE_FIELDS {
			match self.by_kind.get(&kind) {
				Some(channel) => push_state(channel, state, &mut updates),
				None => debug!(channel.kind = %kind, "no channel for state field"),
			}
		}

		updates
	}
}

fn push_state(channel: &LightChannel, state: &LightStateResponse, updates: &mut Vec<StateUpdate>) {
	match channel.state(state) {
		Ok(Some(value)) => updates.push(StateUpdate {
			uid: channel.uid().clone(),
			kind: channel.kind(),
			value,
		}),
		Ok(None) => {}
		Err(error) => warn!(
			channel.kind = %channel.kind(),
			%error,
			"failed to convert state value"
		),
	}
}
