use crate::LightChannelDef;
use enumset::{EnumSet, EnumSetType, enum_set};

/// A single controllable aspect of a light.
///
/// Variants are declared in ascending bit order, so iterating an
/// `EnumSet<ColorCapability>` yields capabilities least significant bit
/// first.
#[derive(EnumSetType, Debug, Hash, PartialOrd, Ord)]
pub enum ColorCapability {
	OnOff,
	Brightness,
	White,
	ColorTemperature,
	ColdWarmWhite,
	Rgb,
}

impl ColorCapability {
	/// The bit this capability occupies in a color mode bitmask.
	#[inline]
	pub const fn bit(self) -> u32 {
		1 << self as u32
	}

	/// Logical channels this capability pulls in.
	pub const fn channels(self) -> EnumSet<LightChannelDef> {
		match self {
			Self::OnOff => enum_set!(LightChannelDef::OnOff),
			Self::Brightness => enum_set!(LightChannelDef::MasterBrightness),
			Self::White => enum_set!(LightChannelDef::White),
			Self::ColorTemperature => enum_set!(LightChannelDef::ColorTemperature),
			Self::ColdWarmWhite => {
				enum_set!(LightChannelDef::ColdWhite | LightChannelDef::WarmWhite)
			}
			Self::Rgb => enum_set!(
				LightChannelDef::ColorBrightness
					| LightChannelDef::Red
					| LightChannelDef::Green
					| LightChannelDef::Blue
			),
		}
	}

	/// Union of the bits of all capabilities in `capabilities`.
	pub fn mask_of(capabilities: EnumSet<ColorCapability>) -> u32 {
		capabilities.iter().fold(0, |mask, cap| mask | cap.bit())
	}
}
