use crate::{
	ColorMode, Light, LightChannel, LightChannelDef, LightOptions,
	channel_type::{ChannelTypeCache, ChannelTypeProvider, DefaultChannelTypes},
};
use enumset::EnumSet;
use esphome_light_proto::ListEntitiesLightResponse;
use std::collections::BTreeMap;
use tracing::{Level, debug, instrument, warn};

/// Channel kinds to materialize, each with the modes it is supported under.
/// Mode independent kinds map to an empty set.
pub type ChannelPlan = BTreeMap<LightChannelDef, EnumSet<ColorMode>>;

/// Works out which channels a light advertising `supported_color_modes`
/// gets.
///
/// Masks that do not decode to a known mode are skipped.
pub fn plan_channels(supported_color_modes: &[u32]) -> ChannelPlan {
	let mut plan = LightChannelDef::mode_independent()
		.iter()
		.map(|kind| (kind, EnumSet::empty()))
		.collect::<ChannelPlan>();

	for &mask in supported_color_modes {
		let mode = ColorMode::decode_from_bit_mask(mask);
		if mode == ColorMode::Unknown {
			warn!(color_mode.mask = mask, "skipping unsupported color mode");
			continue;
		}

		for capability in mode.capabilities() {
			for kind in capability.channels() {
				if kind.is_mode_dependent() {
					plan.entry(kind).or_default().insert(mode);
				}
			}
		}
	}

	plan
}

/// Builds [Light]s from device advertisements.
#[derive(Debug, Clone)]
pub struct LightFactory<P = DefaultChannelTypes> {
	options: LightOptions,
	provider: P,
}

impl LightFactory {
	pub fn new(options: LightOptions) -> Self {
		let provider = DefaultChannelTypes::new(&options);
		LightFactory { options, provider }
	}
}

impl<P: ChannelTypeProvider> LightFactory<P> {
	pub fn with_provider(options: LightOptions, provider: P) -> Self {
		LightFactory { options, provider }
	}

	pub fn options(&self) -> &LightOptions {
		&self.options
	}

	pub fn provider(&self) -> &P {
		&self.provider
	}

	/// Materializes every planned channel of `light`, resolving channel
	/// types through `types`.
	///
	/// A channel whose type cannot be provided is left out; the rest of the
	/// light is still built.
	#[instrument(
		level = Level::DEBUG,
		name = "LightFactory::create_light",
		skip_all,
		fields(
			light.key = light.key,
			light.id = %light.object_id,
		)
	)]
	pub fn create_light(
		&self,
		light: &ListEntitiesLightResponse,
		types: &mut ChannelTypeCache,
	) -> Light {
		let supported_modes = light
			.supported_color_modes
			.iter()
			.map(|mask| ColorMode::decode_from_bit_mask(*mask))
			.collect::<EnumSet<_>>()
			- ColorMode::Unknown;

		let channels = plan_channels(&light.supported_color_modes)
			.into_iter()
			.filter_map(|(kind, modes)| match types.get_or_create(&self.provider, kind, light) {
				Ok(channel_type) => Some(LightChannel::new(
					&self.options,
					light,
					kind,
					modes,
					channel_type,
				)),
				Err(error) => {
					warn!(channel.kind = %kind, %error, "omitting channel without a channel type");
					None
				}
			})
			.collect::<Vec<_>>();

		debug!(
			channels = channels.len(),
			modes = ?supported_modes,
			"light created"
		);

		Light::new(light, supported_modes, channels)
	}
}
