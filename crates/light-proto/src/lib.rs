//! Decoded messages of the ESPHome native API light component.
//!
//! These are the structured values the transport hands over after decoding,
//! and the outbound request it serializes before sending. The wire encoding
//! itself lives with the transport.

mod command;
mod list_entities;
mod state;

#[doc(inline)]
pub use command::LightCommandRequest;
#[doc(inline)]
pub use list_entities::ListEntitiesLightResponse;
#[doc(inline)]
pub use state::LightStateResponse;
