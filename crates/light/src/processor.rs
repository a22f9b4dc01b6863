//! Per-channel translation between generic commands, outbound requests and
//! reported state.
//!
//! Every [LightChannelDef](crate::LightChannelDef) is bound to exactly one
//! of the processors in this module. Processors are stateless and shared by
//! all lights.

use crate::{
	ColorMode, Command, StateValue,
	color_temp::{self, ColorTempError},
};
use esphome_light_proto::{LightCommandRequest, LightStateResponse};
use thiserror::Error;

/// A value that could be coerced but not converted to its native unit.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValueError {
	#[error(transparent)]
	ColorTemperature(#[from] ColorTempError),
}

type Transform<V> = fn(&Command) -> Result<Option<V>, ValueError>;
type Apply<V> = fn(&mut LightCommandRequest, V);
type Extract = fn(&LightStateResponse) -> Result<Option<StateValue>, ValueError>;

/// Translation strategy for one channel kind with native value type `V`.
#[derive(Debug)]
pub struct CommandProcessor<V> {
	transform: Transform<V>,
	apply: Apply<V>,
	extract: Option<Extract>,
}

impl<V> CommandProcessor<V> {
	const fn new(transform: Transform<V>, apply: Apply<V>) -> Self {
		Self {
			transform,
			apply,
			extract: None,
		}
	}

	const fn with_state(transform: Transform<V>, apply: Apply<V>, extract: Extract) -> Self {
		Self {
			transform,
			apply,
			extract: Some(extract),
		}
	}

	/// Interprets `command` as this channel's native value.
	///
	/// `Ok(None)` means the command does not apply to this channel.
	pub fn value(&self, command: &Command) -> Result<Option<V>, ValueError> {
		(self.transform)(command)
	}

	/// Writes the value of `command` into `request` and flags the field as
	/// present. The request is left untouched when the command does not
	/// apply. Returns the value that was written.
	pub fn handle_command(
		&self,
		request: &mut LightCommandRequest,
		command: &Command,
	) -> Result<Option<V>, ValueError>
	where
		V: Clone,
	{
		let value = self.value(command)?;
		if let Some(value) = &value {
			(self.apply)(request, value.clone());
		}

		Ok(value)
	}

	/// Extracts this channel's field from a state report. Channels that are
	/// only ever sent as call parameters always yield `Ok(None)`.
	pub fn state(&self, state: &LightStateResponse) -> Result<Option<StateValue>, ValueError> {
		match self.extract {
			Some(extract) => extract(state),
			None => Ok(None),
		}
	}

	pub fn reports_state(&self) -> bool {
		self.extract.is_some()
	}
}

/// A value written into an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Bool(bool),
	Float(f32),
	Int(u32),
	Text(String),
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f32> for Value {
	fn from(value: f32) -> Self {
		Self::Float(value)
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Self::Int(value)
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

/// A [CommandProcessor] with its value type erased.
#[derive(Debug, Clone, Copy)]
pub enum Processor {
	Bool(&'static CommandProcessor<bool>),
	Float(&'static CommandProcessor<f32>),
	Int(&'static CommandProcessor<u32>),
	Text(&'static CommandProcessor<String>),
}

macro_rules! each_processor {
	($self:expr, $p:ident => $body:expr) => {
		match $self {
			Processor::Bool($p) => $body,
			Processor::Float($p) => $body,
			Processor::Int($p) => $body,
			Processor::Text($p) => $body,
		}
	};
}

impl Processor {
	pub fn value(&self, command: &Command) -> Result<Option<Value>, ValueError> {
		each_processor!(*self, p => Ok(p.value(command)?.map(Value::from)))
	}

	pub fn handle_command(
		&self,
		request: &mut LightCommandRequest,
		command: &Command,
	) -> Result<Option<Value>, ValueError> {
		each_processor!(*self, p => Ok(p.handle_command(request, command)?.map(Value::from)))
	}

	pub fn state(&self, state: &LightStateResponse) -> Result<Option<StateValue>, ValueError> {
		each_processor!(*self, p => p.state(state))
	}

	pub fn reports_state(&self) -> bool {
		each_processor!(*self, p => p.reports_state())
	}
}

/// Saturates `value` into `0.0..=1.0`. `NaN` saturates to `0.0`.
#[inline]
pub fn clamp01(value: f32) -> f32 {
	value.max(0.0).min(1.0)
}

fn on_off(command: &Command) -> Result<Option<bool>, ValueError> {
	Ok(command.as_bool())
}

fn clamped_float(command: &Command) -> Result<Option<f32>, ValueError> {
	Ok(command.as_f32().map(clamp01))
}

fn int(command: &Command) -> Result<Option<u32>, ValueError> {
	Ok(command.as_u32())
}

fn text(command: &Command) -> Result<Option<String>, ValueError> {
	Ok(command.as_text())
}

fn color_mode(command: &Command) -> Result<Option<u32>, ValueError> {
	Ok(command
		.as_text()
		.and_then(|name| name.parse::<ColorMode>().ok())
		.filter(|mode| *mode != ColorMode::Unknown)
		.map(ColorMode::bit_mask))
}

/// Commands carry Kelvin, the device expects mireds. Only decimals are
/// temperatures; on/off has no Kelvin reading.
fn kelvin_as_mired(command: &Command) -> Result<Option<f32>, ValueError> {
	match command {
		Command::Decimal(kelvin) => Ok(Some(color_temp::kelvin_to_mired(*kelvin as f32)?)),
		_ => Ok(None),
	}
}

const fn clamped(apply: Apply<f32>, extract: Extract) -> CommandProcessor<f32> {
	CommandProcessor::with_state(clamped_float, apply, extract)
}

pub static ON_OFF: CommandProcessor<bool> = CommandProcessor::<bool>::with_state(
	on_off,
	|req, on| {
		req.state = on;
		req.has_state = true;
	},
	|state| {
		// Inverted: an off light publishes 1 and an on light 0. Existing
		// installations depend on this mapping; do not flip it without
		// confirming with the product owner.
		Ok(Some(StateValue::Decimal(if state.state { 0.0 } else { 1.0 })))
	},
);

pub static COLOR_MODE: CommandProcessor<u32> = CommandProcessor::<u32>::with_state(
	color_mode,
	|req, mask| {
		req.color_mode = mask;
		req.has_color_mode = true;
	},
	|state| {
		let mode = ColorMode::decode_from_bit_mask(state.color_mode);
		Ok(Some(StateValue::Text(mode.name().into())))
	},
);

pub static MASTER_BRIGHTNESS: CommandProcessor<f32> = clamped(
	|req, value| {
		req.brightness = value;
		req.has_brightness = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.brightness))),
);

pub static COLOR_BRIGHTNESS: CommandProcessor<f32> = clamped(
	|req, value| {
		req.color_brightness = value;
		req.has_color_brightness = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.color_brightness))),
);

pub static RED: CommandProcessor<f32> = clamped(
	|req, value| {
		req.red = value;
		req.has_rgb = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.red))),
);

pub static GREEN: CommandProcessor<f32> = clamped(
	|req, value| {
		req.green = value;
		req.has_rgb = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.green))),
);

pub static BLUE: CommandProcessor<f32> = clamped(
	|req, value| {
		req.blue = value;
		req.has_rgb = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.blue))),
);

pub static WHITE: CommandProcessor<f32> = clamped(
	|req, value| {
		req.white = value;
		req.has_white = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.white))),
);

pub static COLD_WHITE: CommandProcessor<f32> = clamped(
	|req, value| {
		req.cold_white = value;
		req.has_cold_white = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.cold_white))),
);

pub static WARM_WHITE: CommandProcessor<f32> = clamped(
	|req, value| {
		req.warm_white = value;
		req.has_warm_white = true;
	},
	|state| Ok(Some(StateValue::Decimal(state.warm_white))),
);

pub static COLOR_TEMPERATURE: CommandProcessor<f32> = CommandProcessor::<f32>::with_state(
	kelvin_as_mired,
	|req, mired| {
		req.color_temperature = mired;
		req.has_color_temperature = true;
	},
	|state| {
		let kelvin = color_temp::mired_to_kelvin(state.color_temperature)?;
		Ok(Some(StateValue::Decimal(kelvin)))
	},
);

pub static TRANSITION_LENGTH: CommandProcessor<u32> = CommandProcessor::<u32>::new(int, |req, ms| {
	req.transition_length = ms;
	req.has_transition_length = true;
});

pub static FLASH_LENGTH: CommandProcessor<u32> = CommandProcessor::<u32>::new(int, |req, ms| {
	req.flash_length = ms;
	req.has_flash_length = true;
});

pub static EFFECT: CommandProcessor<String> = CommandProcessor::<String>::with_state(
	text,
	|req, effect| {
		req.effect = effect;
		req.has_effect = true;
	},
	|state| {
		Ok(state
			.effect
			.clone()
			.filter(|effect| !effect.is_empty())
			.map(StateValue::Text))
	},
);
