//! Color mode aware channel model for ESPHome lights.
//!
//! A device advertises the color modes a light supports as raw capability
//! bitmasks. [`LightFactory`] decodes those into [`ColorMode`]s and
//! materializes one [`LightChannel`] per logical channel kind the modes
//! reach. The resulting [`Light`] translates generic [`Command`]s into
//! populated [`LightCommandRequest`]s, and fans decoded state reports out
//! into per-channel [`StateUpdate`]s.

mod capability;
mod channel;
mod channel_def;
mod color_mode;
mod command;
mod factory;
mod light;
mod options;
mod registry;

pub mod channel_type;
pub mod color_temp;
pub mod processor;

pub use capability::ColorCapability;
pub use channel::{ChannelUid, LightChannel};
pub use channel_def::{LightChannelDef, LightChannelGroup};
pub use color_mode::{ColorMode, ParseColorModeError};
pub use command::{Command, StateValue};
pub use factory::{ChannelPlan, LightFactory, plan_channels};
pub use light::{ColorModeChannels, CommandError, Light, StateUpdate};
pub use options::LightOptions;
pub use registry::{LightCommandSender, LightRegistry};

#[doc(no_inline)]
pub use esphome_light_proto::{LightCommandRequest, LightStateResponse, ListEntitiesLightResponse};
