//! Host-facing channel type metadata.
//!
//! A [ChannelTypeProvider] names and describes the type of every channel a
//! light exposes. Types are shared between lights with the same shape, so
//! the host keeps them in a [ChannelTypeCache] that the factory fills on
//! demand.

use crate::{
	ColorMode, LightChannelDef, LightOptions,
	color_temp::{self, ColorTempError},
};
use enumset::EnumSet;
use esphome_light_proto::ListEntitiesLightResponse;
use slug::slugify;
use std::{
	collections::{HashMap, hash_map::Entry},
	fmt,
	sync::Arc,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelTypeUid(Arc<str>);

impl ChannelTypeUid {
	pub fn new(value: impl Into<Arc<str>>) -> Self {
		ChannelTypeUid(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ChannelTypeUid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&*self.0, f)
	}
}

/// Kind of host item a channel binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
	Switch,
	Dimmer,
	Number,
	NumberTime,
	String,
}

impl ItemType {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Switch => "Switch",
			Self::Dimmer => "Dimmer",
			Self::Number => "Number",
			Self::NumberTime => "Number:Time",
			Self::String => "String",
		}
	}
}

impl fmt::Display for ItemType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateOption {
	pub value: String,
	pub label: String,
}

impl StateOption {
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		StateOption {
			value: value.into(),
			label: label.into(),
		}
	}
}

/// Description of a channel type: item type, value range and options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelType {
	pub uid: ChannelTypeUid,
	pub label: String,
	pub item_type: ItemType,
	pub description: Option<String>,
	pub read_only: bool,
	pub minimum: Option<f64>,
	pub maximum: Option<f64>,
	pub step: Option<f64>,
	pub pattern: Option<String>,
	pub tags: Vec<String>,
	pub options: Vec<StateOption>,
}

impl ChannelType {
	pub fn new(uid: ChannelTypeUid, label: impl Into<String>, item_type: ItemType) -> Self {
		ChannelType {
			uid,
			label: label.into(),
			item_type,
			description: None,
			read_only: false,
			minimum: None,
			maximum: None,
			step: None,
			pattern: None,
			tags: Vec::new(),
			options: Vec::new(),
		}
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn read_only(mut self, read_only: bool) -> Self {
		self.read_only = read_only;
		self
	}

	pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
		self.minimum = Some(minimum);
		self.maximum = Some(maximum);
		self
	}

	pub fn step(mut self, step: f64) -> Self {
		self.step = Some(step);
		self
	}

	pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
		self.pattern = Some(pattern.into());
		self
	}

	pub fn tag(mut self, tag: impl Into<String>) -> Self {
		self.tags.push(tag.into());
		self
	}

	pub fn options(mut self, options: impl IntoIterator<Item = StateOption>) -> Self {
		self.options.extend(options);
		self
	}
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelTypeError {
	#[error("channel type for '{kind}' is not implemented")]
	NotImplemented { kind: LightChannelDef },

	#[error(transparent)]
	ColorTemperature(#[from] ColorTempError),
}

impl ChannelTypeError {
	pub fn not_implemented(kind: LightChannelDef) -> Self {
		Self::NotImplemented { kind }
	}
}

/// Source of channel type metadata.
///
/// `type_uid` must be cheap and deterministic for a given kind and
/// advertisement; `channel_type` is only called for ids that are not cached
/// yet.
pub trait ChannelTypeProvider {
	fn type_uid(
		&self,
		kind: LightChannelDef,
		light: &ListEntitiesLightResponse,
	) -> Result<ChannelTypeUid, ChannelTypeError>;

	fn channel_type(
		&self,
		uid: &ChannelTypeUid,
		kind: LightChannelDef,
		light: &ListEntitiesLightResponse,
	) -> Result<ChannelType, ChannelTypeError>;
}

const SYSTEM_POWER: &str = "system:power";
const SYSTEM_BRIGHTNESS: &str = "system:brightness";
const SYSTEM_COLOR_TEMPERATURE_ABS: &str = "system:color-temperature-abs";

/// Channel types derived from the shared system types where one fits, and
/// from `<binding_id>:<module>` otherwise.
#[derive(Debug, Clone)]
pub struct DefaultChannelTypes {
	prefix: Arc<str>,
}

impl DefaultChannelTypes {
	pub fn new(options: &LightOptions) -> Self {
		DefaultChannelTypes {
			prefix: options.type_prefix().into(),
		}
	}

	fn own_uid(&self, kind: LightChannelDef, subtype: Option<&str>) -> ChannelTypeUid {
		match subtype.filter(|subtype| !subtype.is_empty()) {
			Some(subtype) => ChannelTypeUid::new(format!("{}:{kind}:{subtype}", self.prefix)),
			None => ChannelTypeUid::new(format!("{}:{kind}", self.prefix)),
		}
	}
}

fn extend_system_uid(base: &str, kind: LightChannelDef, subtype: Option<&str>) -> ChannelTypeUid {
	match subtype {
		Some(subtype) => ChannelTypeUid::new(format!("{base}:{kind}:{subtype}")),
		None => ChannelTypeUid::new(format!("{base}:{kind}")),
	}
}

fn unit_dimmer(uid: &ChannelTypeUid, kind: LightChannelDef) -> ChannelType {
	ChannelType::new(uid.clone(), format!("Brightness, {kind}"), ItemType::Dimmer)
		.description(format!("Brightness, {kind}"))
		.range(0.0, 1.0)
		.tag("Control")
		.tag("Brightness")
}

/// Whole Kelvin value of the white point a cold or warm white output sits at.
fn white_point(
	kind: LightChannelDef,
	light: &ListEntitiesLightResponse,
) -> Result<String, ChannelTypeError> {
	let mired = match kind {
		LightChannelDef::ColdWhite => light.min_mireds,
		LightChannelDef::WarmWhite => light.max_mireds,
		_ => return Err(ChannelTypeError::not_implemented(kind)),
	};

	Ok(color_temp::format_kelvin(color_temp::mired_to_kelvin(mired)?))
}

/// Advertised color temperature range in Kelvin, lowest first.
fn kelvin_range(light: &ListEntitiesLightResponse) -> Result<(f32, f32), ChannelTypeError> {
	let a = color_temp::mired_to_kelvin(light.min_mireds)?;
	let b = color_temp::mired_to_kelvin(light.max_mireds)?;

	Ok((a.min(b), a.max(b)))
}

/// Advertised mired bounds as given, so lights with different bounds never
/// share a type even when their Kelvin display matches.
fn mired_subtype(light: &ListEntitiesLightResponse) -> String {
	format!("{}-{}", light.min_mireds, light.max_mireds)
}

fn kelvin_subtype((min, max): (f32, f32)) -> String {
	format!(
		"{}-{}",
		color_temp::format_kelvin(min),
		color_temp::format_kelvin(max)
	)
}

/// Decodable advertised modes, in declaration order and without duplicates.
fn advertised_modes(light: &ListEntitiesLightResponse) -> EnumSet<ColorMode> {
	let modes = light
		.supported_color_modes
		.iter()
		.map(|mask| ColorMode::decode_from_bit_mask(*mask))
		.collect::<EnumSet<_>>();

	modes - ColorMode::Unknown
}

fn modes_subtype(light: &ListEntitiesLightResponse) -> String {
	advertised_modes(light)
		.iter()
		.map(|mode| mode.name().to_ascii_lowercase())
		.collect::<Vec<_>>()
		.join("-")
}

/// Readable slug of the effect list followed by a checksum of the exact
/// names, so lists that slug alike still get their own type.
fn effects_subtype(light: &ListEntitiesLightResponse) -> String {
	let mut hasher = crc32fast::Hasher::new();
	for effect in &light.effects {
		hasher.update(&(effect.len() as u64).to_le_bytes());
		hasher.update(effect.as_bytes());
	}

	let slug = light
		.effects
		.iter()
		.map(slugify)
		.collect::<Vec<_>>()
		.join("_");

	format!("{slug}-{:08x}", hasher.finalize())
}

impl ChannelTypeProvider for DefaultChannelTypes {
	fn type_uid(
		&self,
		kind: LightChannelDef,
		light: &ListEntitiesLightResponse,
	) -> Result<ChannelTypeUid, ChannelTypeError> {
		use LightChannelDef as D;

		let uid = match kind {
			D::OnOff => ChannelTypeUid::new(SYSTEM_POWER),
			D::MasterBrightness
			| D::ColorBrightness
			| D::Red
			| D::Green
			| D::Blue
			| D::White => extend_system_uid(SYSTEM_BRIGHTNESS, kind, None),
			D::ColdWhite | D::WarmWhite => {
				let kelvin = white_point(kind, light)?;
				extend_system_uid(SYSTEM_BRIGHTNESS, kind, Some(&format!("{kelvin}k")))
			}
			D::ColorTemperature => {
				kelvin_range(light)?;
				let subtype = mired_subtype(light);
				extend_system_uid(SYSTEM_COLOR_TEMPERATURE_ABS, kind, Some(&subtype))
			}
			D::ColorMode => self.own_uid(kind, Some(&modes_subtype(light))),
			D::TransitionLength | D::FlashLength => self.own_uid(kind, None),
			D::Effect => self.own_uid(kind, Some(&effects_subtype(light))),
		};

		Ok(uid)
	}

	fn channel_type(
		&self,
		uid: &ChannelTypeUid,
		kind: LightChannelDef,
		light: &ListEntitiesLightResponse,
	) -> Result<ChannelType, ChannelTypeError> {
		use LightChannelDef as D;

		let channel_type = match kind {
			D::OnOff => ChannelType::new(uid.clone(), "Power", ItemType::Switch)
				.description("Device is operable when channel has state ON")
				.tag("Switch")
				.tag("Power"),
			D::MasterBrightness
			| D::ColorBrightness
			| D::Red
			| D::Green
			| D::Blue
			| D::White => unit_dimmer(uid, kind),
			D::ColdWhite | D::WarmWhite => {
				let kelvin = white_point(kind, light)?;
				let name = kind.name().to_ascii_uppercase();
				unit_dimmer(uid, kind).tag(format!("{name}-{kelvin}K"))
			}
			D::ColorTemperature => {
				let range = kelvin_range(light)?;
				let subtype = kelvin_subtype(range);
				ChannelType::new(
					uid.clone(),
					format!("Color Temperature, {kind}"),
					ItemType::Number,
				)
				.description(format!("Color temperature in Kelvin, {kind}"))
				.range(f64::from(range.0), f64::from(range.1))
				.pattern("%.0f K")
				.tag("Control")
				.tag("ColorTemperature")
				.tag(format!("ColorTemperatureRange-{subtype}"))
			}
			D::ColorMode => ChannelType::new(uid.clone(), "Light mode", ItemType::String)
				.read_only(true)
				.options(
					advertised_modes(light)
						.iter()
						.map(|mode| StateOption::new(mode.name(), mode.description())),
				),
			D::TransitionLength | D::FlashLength => {
				ChannelType::new(uid.clone(), kind.name(), ItemType::NumberTime)
					.description("Length in ms")
					.range(0.0, f64::from(i32::MAX) * 2.0)
					.step(1.0)
			}
			D::Effect => ChannelType::new(uid.clone(), "Effect", ItemType::String).options(
				light
					.effects
					.iter()
					.map(|effect| StateOption::new(effect.as_str(), effect.as_str())),
			),
		};

		Ok(channel_type)
	}
}

/// Channel types already handed out, keyed by type id.
#[derive(Debug, Default)]
pub struct ChannelTypeCache {
	types: HashMap<ChannelTypeUid, Arc<ChannelType>>,
}

impl ChannelTypeCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, uid: &ChannelTypeUid) -> Option<&Arc<ChannelType>> {
		self.types.get(uid)
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<ChannelType>> {
		self.types.values()
	}

	/// Looks up the type `provider` names for `kind`, describing and
	/// storing it first if it is not known yet.
	pub fn get_or_create<P>(
		&mut self,
		provider: &P,
		kind: LightChannelDef,
		light: &ListEntitiesLightResponse,
	) -> Result<Arc<ChannelType>, ChannelTypeError>
	where
		P: ChannelTypeProvider + ?Sized,
	{
		let uid = provider.type_uid(kind, light)?;
		match self.types.entry(uid) {
			Entry::Occupied(entry) => Ok(entry.get().clone()),
			Entry::Vacant(entry) => {
				let channel_type = provider.channel_type(entry.key(), kind, light)?;
				Ok(entry.insert(Arc::new(channel_type)).clone())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	fn provider() -> DefaultChannelTypes {
		DefaultChannelTypes::new(&LightOptions::new("esphome:device:test"))
	}

	fn light() -> ListEntitiesLightResponse {
		ListEntitiesLightResponse::new(1, "desk")
			.supported_color_modes([
				ColorMode::Rgb.bit_mask(),
				ColorMode::ColorTemperature.bit_mask(),
			])
			.mireds(153.0, 500.0)
			.effects(["Rainbow", "Fast Pulse"])
	}

	fn uid(kind: LightChannelDef) -> String {
		provider().type_uid(kind, &light()).unwrap().to_string()
	}

	#[test]
	fn system_derived_ids() {
		assert_eq!(uid(LightChannelDef::OnOff), "system:power");
		assert_eq!(uid(LightChannelDef::Red), "system:brightness:red");
		assert_eq!(uid(LightChannelDef::ColdWhite), "system:brightness:cold_white:6536k");
		assert_eq!(uid(LightChannelDef::WarmWhite), "system:brightness:warm_white:2000k");
		assert_eq!(
			uid(LightChannelDef::ColorTemperature),
			"system:color-temperature-abs:color_temperature:153-500"
		);
	}

	#[test]
	fn own_ids() {
		assert_eq!(
			uid(LightChannelDef::ColorMode),
			"esphome:light:color_mode:color_temperature-rgb"
		);
		assert_eq!(uid(LightChannelDef::FlashLength), "esphome:light:flash_length");

		let effect = uid(LightChannelDef::Effect);
		let checksum = effect
			.strip_prefix("esphome:light:effect:rainbow_fast-pulse-")
			.unwrap();
		assert_eq!(checksum.len(), 8);
		assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[test]
	fn color_temperature_range_in_kelvin() {
		let light = light();
		let provider = provider();
		let uid = provider.type_uid(LightChannelDef::ColorTemperature, &light).unwrap();
		let ct = provider
			.channel_type(&uid, LightChannelDef::ColorTemperature, &light)
			.unwrap();

		assert_eq!(ct.item_type, ItemType::Number);
		assert_eq!(ct.minimum, Some(2000.0));
		assert!((ct.maximum.unwrap() - 6535.947).abs() < 0.01);
		assert_eq!(ct.pattern.as_deref(), Some("%.0f K"));
		assert!(ct.tags.contains(&"ColorTemperatureRange-2000-6536".to_owned()));
	}

	#[test]
	fn color_mode_options_describe_advertised_modes() {
		let light = light();
		let provider = provider();
		let uid = provider.type_uid(LightChannelDef::ColorMode, &light).unwrap();
		let ty = provider
			.channel_type(&uid, LightChannelDef::ColorMode, &light)
			.unwrap();

		assert!(ty.read_only);
		assert_eq!(
			ty.options,
			vec![
				StateOption::new("COLOR_TEMPERATURE", "Color temperature controlled"),
				StateOption::new("RGB", "RGB channels light"),
			]
		);
	}

	#[test]
	fn durations_are_milliseconds() {
		let light = light();
		let provider = provider();
		let uid = provider.type_uid(LightChannelDef::TransitionLength, &light).unwrap();
		let ty = provider
			.channel_type(&uid, LightChannelDef::TransitionLength, &light)
			.unwrap();

		assert_eq!(ty.item_type.as_str(), "Number:Time");
		assert_eq!(ty.description.as_deref(), Some("Length in ms"));
		assert_eq!(ty.maximum, Some(4_294_967_294.0));
		assert_eq!(ty.step, Some(1.0));
	}

	#[test]
	fn zero_mireds_fail_white_point_types() {
		let light = ListEntitiesLightResponse::new(1, "bad")
			.supported_color_modes([ColorMode::ColdWarmWhite.bit_mask()]);

		assert_matches!(
			provider().type_uid(LightChannelDef::WarmWhite, &light),
			Err(ChannelTypeError::ColorTemperature(_))
		);
		assert!(provider().type_uid(LightChannelDef::Red, &light).is_ok());
	}

	#[test]
	fn cache_shares_types_between_lights() {
		let provider = provider();
		let mut cache = ChannelTypeCache::new();
		let other = ListEntitiesLightResponse::new(2, "shelf").mireds(153.0, 500.0);

		let a = cache
			.get_or_create(&provider, LightChannelDef::Green, &light())
			.unwrap();
		let b = cache
			.get_or_create(&provider, LightChannelDef::Green, &other)
			.unwrap();

		assert!(Arc::ptr_eq(&a, &b));
		assert_eq!(cache.len(), 1);
		assert!(cache.get(&a.uid).is_some());
	}

	fn effect_options(cache: &mut ChannelTypeCache, effects: &[&str]) -> Vec<String> {
		let light = ListEntitiesLightResponse::new(3, "strip").effects(effects.iter().copied());
		cache
			.get_or_create(&provider(), LightChannelDef::Effect, &light)
			.unwrap()
			.options
			.iter()
			.map(|option| option.value.clone())
			.collect()
	}

	#[test]
	fn effect_lists_that_slug_alike_keep_their_own_type() {
		let mut cache = ChannelTypeCache::new();

		assert_eq!(effect_options(&mut cache, &["Fast Pulse"]), ["Fast Pulse"]);
		assert_eq!(effect_options(&mut cache, &["Fast", "Pulse"]), ["Fast", "Pulse"]);
		assert_eq!(effect_options(&mut cache, &["fast-pulse"]), ["fast-pulse"]);
		assert_eq!(cache.len(), 3);

		assert_eq!(effect_options(&mut cache, &["Fast", "Pulse"]), ["Fast", "Pulse"]);
		assert_eq!(cache.len(), 3);
	}

	#[test]
	fn mired_bounds_with_equal_kelvin_display_keep_their_own_type() {
		let provider = provider();
		let mut cache = ChannelTypeCache::new();
		let a = ListEntitiesLightResponse::new(1, "a").mireds(153.0, 500.0);
		let b = ListEntitiesLightResponse::new(2, "b").mireds(153.01, 500.01);

		let a = cache
			.get_or_create(&provider, LightChannelDef::ColorTemperature, &a)
			.unwrap();
		let b = cache
			.get_or_create(&provider, LightChannelDef::ColorTemperature, &b)
			.unwrap();

		assert_ne!(a.uid, b.uid);
		assert_eq!(a.tags, b.tags);
		assert_ne!(a.minimum, b.minimum);
	}
}
