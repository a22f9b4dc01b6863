use crate::ColorCapability;
use enumset::{EnumSet, EnumSetType, enum_set};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;

/// A coherent operating mode a light can report, made up of a fixed set of
/// [ColorCapability] flags.
#[derive(EnumSetType, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorMode {
	/// No color mode configured. Never a supported mode, only reported while
	/// the light is off.
	Unknown,

	/// Only on/off control.
	OnOff,

	/// Dimmable light.
	Brightness,

	/// White output only. Only meaningful alongside another mode such as
	/// [ColorMode::Rgb].
	White,

	/// Controllable color temperature output.
	ColorTemperature,

	/// Cold and warm white output with individually controllable brightness.
	ColdWarmWhite,

	/// RGB color output.
	Rgb,

	/// RGB color output and a separate white output.
	RgbWhite,

	/// RGB color output and a separate white output with controllable color
	/// temperature.
	RgbColorTemperature,

	/// RGB color output, and separate cold and warm white outputs.
	RgbColdWarmWhite,
}

static MODES_BY_MASK: Lazy<HashMap<u32, ColorMode>> = Lazy::new(|| {
	EnumSet::<ColorMode>::all()
		.iter()
		.filter(|mode| *mode != ColorMode::Unknown)
		.map(|mode| (mode.bit_mask(), mode))
		.collect()
});

impl ColorMode {
	/// Capabilities making up this mode. Iteration is ascending by bit value.
	pub const fn capabilities(self) -> EnumSet<ColorCapability> {
		use ColorCapability as C;

		match self {
			Self::Unknown => EnumSet::empty(),
			Self::OnOff => enum_set!(C::OnOff),
			Self::Brightness => enum_set!(C::OnOff | C::Brightness),
			Self::White => enum_set!(C::OnOff | C::Brightness | C::White),
			Self::ColorTemperature => enum_set!(C::OnOff | C::Brightness | C::ColorTemperature),
			Self::ColdWarmWhite => enum_set!(C::OnOff | C::Brightness | C::ColdWarmWhite),
			Self::Rgb => enum_set!(C::OnOff | C::Brightness | C::Rgb),
			Self::RgbWhite => enum_set!(C::OnOff | C::Brightness | C::Rgb | C::White),
			Self::RgbColorTemperature => {
				enum_set!(C::OnOff | C::Brightness | C::Rgb | C::White | C::ColorTemperature)
			}
			Self::RgbColdWarmWhite => {
				enum_set!(C::OnOff | C::Brightness | C::Rgb | C::ColdWarmWhite)
			}
		}
	}

	/// Bitwise union of the capability bits of this mode.
	pub fn bit_mask(self) -> u32 {
		ColorCapability::mask_of(self.capabilities())
	}

	/// Exact lookup of a reported bitmask.
	///
	/// Masks that are not exactly the union of a defined mode's capabilities
	/// decode to [ColorMode::Unknown], including supersets and subsets of
	/// known masks.
	pub fn decode_from_bit_mask(mask: u32) -> Self {
		MODES_BY_MASK
			.get(&mask)
			.copied()
			.unwrap_or(ColorMode::Unknown)
	}

	pub const fn name(self) -> &'static str {
		match self {
			Self::Unknown => "UNKNOWN",
			Self::OnOff => "ON_OFF",
			Self::Brightness => "BRIGHTNESS",
			Self::White => "WHITE",
			Self::ColorTemperature => "COLOR_TEMPERATURE",
			Self::ColdWarmWhite => "COLD_WARM_WHITE",
			Self::Rgb => "RGB",
			Self::RgbWhite => "RGB_WHITE",
			Self::RgbColorTemperature => "RGB_COLOR_TEMPERATURE",
			Self::RgbColdWarmWhite => "RGB_COLD_WARM_WHITE",
		}
	}

	pub const fn description(self) -> &'static str {
		match self {
			Self::Unknown => "Unknown mode",
			Self::OnOff => "On/Off",
			Self::Brightness => "On/Off and brightness controls",
			Self::White => "White light with on/off and brightness control",
			Self::ColorTemperature => "Color temperature controlled",
			Self::ColdWarmWhite => "Cold/Warm white channels light",
			Self::Rgb => "RGB channels light",
			Self::RgbWhite => "RGB + White channels light",
			Self::RgbColorTemperature => "RGB + Color temperature channels light",
			Self::RgbColdWarmWhite => "RGB + Cold white + Warm white channels light",
		}
	}
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color mode: {name}")]
pub struct ParseColorModeError {
	name: String,
}

impl FromStr for ColorMode {
	type Err = ParseColorModeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim();
		EnumSet::<ColorMode>::all()
			.iter()
			.find(|mode| mode.name().eq_ignore_ascii_case(name))
			.ok_or_else(|| ParseColorModeError { name: name.into() })
	}
}
