use serde::{Deserialize, Serialize};
use std::fmt;

/// A generic command addressed to a channel by the host controller.
///
/// Channels coerce commands to their own value type. A command that cannot
/// be coerced does not apply to the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
	OnOff(bool),
	Decimal(f64),
	Text(String),

	/// Request to re-publish the current state. Never coerces to a value.
	Refresh,
}

impl Command {
	/// Boolean view. Decimals count as on when non-zero.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::OnOff(on) => Some(*on),
			Self::Decimal(value) => Some(*value != 0.0),
			Self::Text(_) | Self::Refresh => None,
		}
	}

	/// Numeric view. On/off map to `1.0` and `0.0`.
	pub fn as_f32(&self) -> Option<f32> {
		match self {
			Self::OnOff(on) => Some(if *on { 1.0 } else { 0.0 }),
			Self::Decimal(value) => Some(*value as f32),
			Self::Text(_) | Self::Refresh => None,
		}
	}

	/// Integer view. Decimals are truncated and saturate at the bounds of
	/// `u32`.
	pub fn as_u32(&self) -> Option<u32> {
		match self {
			Self::OnOff(on) => Some(u32::from(*on)),
			Self::Decimal(value) => Some(value.trunc() as u32),
			Self::Text(_) | Self::Refresh => None,
		}
	}

	/// Textual view. Empty text does not count as a value.
	pub fn as_text(&self) -> Option<String> {
		let text = match self {
			Self::OnOff(true) => "ON".to_owned(),
			Self::OnOff(false) => "OFF".to_owned(),
			Self::Decimal(value) => value.to_string(),
			Self::Text(text) => text.clone(),
			Self::Refresh => return None,
		};

		Some(text).filter(|text| !text.is_empty())
	}
}

impl From<bool> for Command {
	fn from(value: bool) -> Self {
		Self::OnOff(value)
	}
}

impl From<f64> for Command {
	fn from(value: f64) -> Self {
		Self::Decimal(value)
	}
}

impl From<f32> for Command {
	fn from(value: f32) -> Self {
		Self::Decimal(f64::from(value))
	}
}

impl From<u32> for Command {
	fn from(value: u32) -> Self {
		Self::Decimal(f64::from(value))
	}
}

impl From<&str> for Command {
	fn from(value: &str) -> Self {
		Self::Text(value.into())
	}
}

impl From<String> for Command {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

/// A converted state value, ready for the host controller to publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
	Decimal(f32),
	Text(String),
}

impl StateValue {
	pub fn as_decimal(&self) -> Option<f32> {
		match self {
			Self::Decimal(value) => Some(*value),
			Self::Text(_) => None,
		}
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Decimal(_) => None,
			Self::Text(text) => Some(text),
		}
	}
}

impl fmt::Display for StateValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Decimal(value) => fmt::Display::fmt(value, f),
			Self::Text(text) => f.write_str(text),
		}
	}
}
