use crate::processor::{self, Processor};
use enumset::{EnumSet, EnumSetType, enum_set};
use std::fmt;

/// Logical channel kinds a light can expose.
#[derive(EnumSetType, Debug, Hash, PartialOrd, Ord)]
pub enum LightChannelDef {
	OnOff,
	MasterBrightness,
	ColorMode,
	ColorBrightness,
	Red,
	Green,
	Blue,
	White,
	ColorTemperature,
	ColdWhite,
	WarmWhite,
	TransitionLength,
	FlashLength,
	Effect,
}

/// Channel group a kind is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightChannelGroup {
	/// Values mirrored from device state.
	RawState,

	/// Parameters sent along with a command but never reported back.
	RawCallParam,
}

impl LightChannelGroup {
	pub const fn id(self) -> &'static str {
		match self {
			Self::RawState => "raw_state",
			Self::RawCallParam => "raw_call_param",
		}
	}
}

impl fmt::Display for LightChannelGroup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.id())
	}
}

const MODE_INDEPENDENT: EnumSet<LightChannelDef> = enum_set!(
	LightChannelDef::OnOff
		| LightChannelDef::ColorMode
		| LightChannelDef::TransitionLength
		| LightChannelDef::FlashLength
		| LightChannelDef::Effect
);

impl LightChannelDef {
	/// Kinds every light gets, whatever its supported modes.
	pub const fn mode_independent() -> EnumSet<LightChannelDef> {
		MODE_INDEPENDENT
	}

	/// Kinds that are only reachable through the capabilities of a color mode.
	pub fn mode_dependent() -> EnumSet<LightChannelDef> {
		MODE_INDEPENDENT.complement()
	}

	pub fn is_mode_dependent(self) -> bool {
		!MODE_INDEPENDENT.contains(self)
	}

	pub const fn group(self) -> LightChannelGroup {
		match self {
			Self::TransitionLength | Self::FlashLength => LightChannelGroup::RawCallParam,
			_ => LightChannelGroup::RawState,
		}
	}

	/// Lowercase identifier of the kind, used in channel and type ids.
	pub const fn name(self) -> &'static str {
		match self {
			Self::OnOff => "on_off",
			Self::MasterBrightness => "master_brightness",
			Self::ColorMode => "color_mode",
			Self::ColorBrightness => "color_brightness",
			Self::Red => "red",
			Self::Green => "green",
			Self::Blue => "blue",
			Self::White => "white",
			Self::ColorTemperature => "color_temperature",
			Self::ColdWhite => "cold_white",
			Self::WarmWhite => "warm_white",
			Self::TransitionLength => "transition_length",
			Self::FlashLength => "flash_length",
			Self::Effect => "effect",
		}
	}

	pub fn processor(self) -> Processor {
		match self {
			Self::OnOff => Processor::Bool(&processor::ON_OFF),
			Self::MasterBrightness => Processor::Float(&processor::MASTER_BRIGHTNESS),
			Self::ColorMode => Processor::Int(&processor::COLOR_MODE),
			Self::ColorBrightness => Processor::Float(&processor::COLOR_BRIGHTNESS),
			Self::Red => Processor::Float(&processor::RED),
			Self::Green => Processor::Float(&processor::GREEN),
			Self::Blue => Processor::Float(&processor::BLUE),
			Self::White => Processor::Float(&processor::WHITE),
			Self::ColorTemperature => Processor::Float(&processor::COLOR_TEMPERATURE),
			Self::ColdWhite => Processor::Float(&processor::COLD_WHITE),
			Self::WarmWhite => Processor::Float(&processor::WARM_WHITE),
			Self::TransitionLength => Processor::Int(&processor::TRANSITION_LENGTH),
			Self::FlashLength => Processor::Int(&processor::FLASH_LENGTH),
			Self::Effect => Processor::Text(&processor::EFFECT),
		}
	}
}

impl fmt::Display for LightChannelDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ColorCapability;

	#[test]
	fn mode_sets_partition_all_kinds() {
		let independent = LightChannelDef::mode_independent();
		let dependent = LightChannelDef::mode_dependent();

		assert!(independent.is_disjoint(dependent));
		assert_eq!(independent | dependent, EnumSet::all());
		assert_eq!(independent.len(), 5);
	}

	#[test]
	fn master_brightness_is_mode_dependent() {
		assert!(LightChannelDef::MasterBrightness.is_mode_dependent());
		assert!(!LightChannelDef::OnOff.is_mode_dependent());
		assert!(!LightChannelDef::Effect.is_mode_dependent());
	}

	#[test]
	fn capabilities_only_pull_in_dependent_kinds_or_on_off() {
		for cap in EnumSet::<ColorCapability>::all() {
			let channels = cap.channels() - LightChannelDef::OnOff;
			assert!(
				channels.is_subset(LightChannelDef::mode_dependent()),
				"{cap:?}: {channels:?}"
			);
		}
	}

	#[test]
	fn call_parameters_are_grouped_apart() {
		assert_eq!(
			LightChannelDef::TransitionLength.group(),
			LightChannelGroup::RawCallParam
		);
		assert_eq!(LightChannelDef::FlashLength.group().id(), "raw_call_param");
		assert_eq!(LightChannelDef::Red.group(), LightChannelGroup::RawState);
	}

	#[test]
	fn only_call_parameters_lack_state() {
		for def in EnumSet::<LightChannelDef>::all() {
			assert_eq!(
				def.processor().reports_state(),
				def.group() == LightChannelGroup::RawState,
				"{def}"
			);
		}
	}
}
