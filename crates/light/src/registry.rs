use crate::{
	Command, Light, LightFactory, StateUpdate,
	channel_type::{ChannelTypeCache, ChannelTypeProvider, DefaultChannelTypes},
};
use esphome_light_proto::{LightCommandRequest, LightStateResponse, ListEntitiesLightResponse};
use std::{
	collections::HashMap,
	error::Error,
	sync::{Arc, PoisonError, RwLock},
};
use tracing::{Level, debug, error, instrument, warn};

/// Transport that delivers requests to the device.
pub trait LightCommandSender {
	type Error: Error + Send + Sync + 'static;

	fn send(&self, request: LightCommandRequest) -> Result<(), Self::Error>;
}

impl<F, E> LightCommandSender for F
where
	F: Fn(LightCommandRequest) -> Result<(), E>,
	E: Error + Send + Sync + 'static,
{
	type Error = E;

	fn send(&self, request: LightCommandRequest) -> Result<(), Self::Error> {
		self(request)
	}
}

/// The lights of one device, keyed by entity key.
///
/// Lights are replaced as a whole. Readers hold on to the [Light] they
/// looked up and never see a partially built one.
#[derive(Debug)]
pub struct LightRegistry<P = DefaultChannelTypes> {
	factory: LightFactory<P>,
	lights: RwLock<HashMap<u32, Arc<Light>>>,
}

static_assertions::assert_impl_all!(LightRegistry: Send, Sync);

impl<P: ChannelTypeProvider> LightRegistry<P> {
	pub fn new(factory: LightFactory<P>) -> Self {
		LightRegistry {
			factory,
			lights: RwLock::new(HashMap::new()),
		}
	}

	pub fn factory(&self) -> &LightFactory<P> {
		&self.factory
	}

	/// Builds a light from `light` and publishes it, replacing any light
	/// previously registered under the same key.
	#[instrument(
		level = Level::DEBUG,
		name = "LightRegistry::register",
		skip_all,
		fields(
			light.key = light.key,
			light.id = %light.object_id,
		)
	)]
	pub fn register(
		&self,
		light: &ListEntitiesLightResponse,
		types: &mut ChannelTypeCache,
	) -> Arc<Light> {
		let built = Arc::new(self.factory.create_light(light, types));

		let previous = self
			.lights
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(built.key(), Arc::clone(&built));

		if previous.is_some() {
			debug!("replaced light");
		}

		built
	}

	pub fn remove(&self, key: u32) -> Option<Arc<Light>> {
		self.lights
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&key)
	}

	pub fn get(&self, key: u32) -> Option<Arc<Light>> {
		self.lights
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&key)
			.cloned()
	}

	/// Snapshot of all registered lights, ordered by key.
	pub fn lights(&self) -> Vec<Arc<Light>> {
		let mut lights = self
			.lights
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.values()
			.cloned()
			.collect::<Vec<_>>();

		lights.sort_by_key(|light| light.key());
		lights
	}

	/// Translates `command` and hands the request to `sender`.
	///
	/// Returns the request that was handed over, whether or not sending it
	/// succeeded. Failures are logged.
	#[instrument(
		level = Level::DEBUG,
		name = "LightRegistry::handle_command",
		skip_all,
		fields(
			light.key = key,
			channel.uid = %uid,
		)
	)]
	pub fn handle_command<S>(
		&self,
		key: u32,
		uid: &str,
		command: &Command,
		sender: &S,
	) -> Option<LightCommandRequest>
	where
		S: LightCommandSender + ?Sized,
	{
		let Some(light) = self.get(key) else {
			warn!("command for unknown light");
			return None;
		};

		let request = match light.handle_command(uid, command) {
			Ok(request) => request?,
			Err(error) => {
				warn!(error = &error as &(dyn Error + 'static), "dropping command");
				return None;
			}
		};

		if let Err(error) = sender.send(request.clone()) {
			error!(error = &error as &(dyn Error + 'static), "failed to send light command");
		}

		Some(request)
	}

	/// Routes a state report to the light it belongs to.
	pub fn handle_state(&self, state: &LightStateResponse) -> Vec<StateUpdate> {
		match self.get(state.key) {
			Some(light) => light.handle_state(state),
			None => {
				warn!(light.key = state.key, "state report for unknown light");
				Vec::new()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ColorMode, LightChannelDef, LightOptions, StateValue};
	use enumset::EnumSet;
	use std::{fmt, sync::Mutex, thread};

	#[derive(Debug)]
	struct Offline;

	impl fmt::Display for Offline {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str("device offline")
		}
	}

	impl Error for Offline {}

	fn registry() -> LightRegistry {
		LightRegistry::new(LightFactory::new(LightOptions::new("esphome:device:living_room")))
	}

	fn advertisement(key: u32, modes: &[ColorMode]) -> ListEntitiesLightResponse {
		ListEntitiesLightResponse::new(key, format!("light_{key}"))
			.name(format!("Light {key}"))
			.supported_color_modes(modes.iter().map(|mode| mode.bit_mask()))
			.mireds(153.0, 500.0)
	}

	fn kinds(light: &Light) -> EnumSet<LightChannelDef> {
		light.channels().iter().map(|channel| channel.kind()).collect()
	}

	#[test]
	fn forwards_populated_request() {
		let registry = registry();
		let mut types = ChannelTypeCache::new();
		let light = registry.register(&advertisement(1, &[ColorMode::Rgb]), &mut types);
		let red = light.channel_by_kind(LightChannelDef::Red).unwrap().uid().clone();

		let sent = Mutex::new(Vec::new());
		let sender = |request: LightCommandRequest| -> Result<(), Offline> {
			sent.lock().unwrap().push(request);
			Ok(())
		};

		let request = registry.handle_command(1, red.as_str(), &Command::from(0.5f64), &sender);

		let sent = sent.into_inner().unwrap();
		assert_eq!(sent.len(), 1);
		assert_eq!(Some(&sent[0]), request.as_ref());
		assert_eq!(sent[0].red, 0.5);
	}

	#[test]
	fn send_failure_is_not_fatal() {
		let registry = registry();
		let mut types = ChannelTypeCache::new();
		let light = registry.register(&advertisement(1, &[ColorMode::OnOff]), &mut types);
		let on_off = light.channel_by_kind(LightChannelDef::OnOff).unwrap().uid().clone();

		let request = registry.handle_command(
			1,
			on_off.as_str(),
			&Command::from(true),
			&|_: LightCommandRequest| -> Result<(), Offline> { Err(Offline) },
		);

		assert!(request.unwrap().state);
	}

	#[test]
	fn unknown_light_or_channel_sends_nothing() {
		let registry = registry();
		registry.register(&advertisement(1, &[ColorMode::OnOff]), &mut ChannelTypeCache::new());

		let sender = |_: LightCommandRequest| -> Result<(), Offline> { panic!("nothing to send") };

		assert_eq!(registry.handle_command(2, "any", &Command::from(true), &sender), None);
		assert_eq!(registry.handle_command(1, "any", &Command::from(true), &sender), None);
	}

	#[test]
	fn state_is_routed_by_key() {
		let registry = registry();
		let mut types = ChannelTypeCache::new();
		registry.register(&advertisement(1, &[ColorMode::OnOff]), &mut types);
		registry.register(&advertisement(2, &[ColorMode::Brightness]), &mut types);

		let updates = registry.handle_state(&LightStateResponse {
			key: 2,
			state: true,
			brightness: 0.25,
			color_mode: ColorMode::Brightness.bit_mask(),
			..Default::default()
		});

		assert!(updates.iter().any(|update| update.kind == LightChannelDef::MasterBrightness
			&& update.value == StateValue::Decimal(0.25)));
		assert!(registry
			.handle_state(&LightStateResponse {
				key: 3,
				..Default::default()
			})
			.is_empty());
	}

	#[test]
	fn register_replaces_and_remove_drops() {
		let registry = registry();
		let mut types = ChannelTypeCache::new();
		let old = registry.register(&advertisement(1, &[ColorMode::OnOff]), &mut types);
		let new = registry.register(&advertisement(1, &[ColorMode::Rgb]), &mut types);

		assert!(!Arc::ptr_eq(&old, &new));
		assert!(Arc::ptr_eq(&registry.get(1).unwrap(), &new));
		assert!(old.channel_by_kind(LightChannelDef::Red).is_none());
		assert_eq!(registry.lights().len(), 1);

		assert!(registry.remove(1).is_some());
		assert!(registry.get(1).is_none());
	}

	#[test]
	fn channel_uids_follow_factory_options() {
		let registry = registry();
		let mut types = ChannelTypeCache::new();
		let light = registry.register(&advertisement(7, &[ColorMode::OnOff]), &mut types);
		let on_off = light.channel_by_kind(LightChannelDef::OnOff).unwrap();
		let thing_uid = registry.factory().options().thing_uid();

		assert_eq!(
			on_off.uid().as_str(),
			format!("{thing_uid}:light:light_7:raw_state#on_off")
		);
	}

	#[test]
	fn readers_never_see_a_mixed_channel_set() {
		let registry = registry();
		let mut types = ChannelTypeCache::new();
		let rgb = advertisement(1, &[ColorMode::Rgb]);
		let ct = advertisement(1, &[ColorMode::ColorTemperature]);

		let rgb_kinds = kinds(&registry.register(&rgb, &mut types));
		let ct_kinds = kinds(&registry.register(&ct, &mut types));
		assert_ne!(rgb_kinds, ct_kinds);

		thread::scope(|scope| {
			scope.spawn(|| {
				for i in 0..200 {
					let next = if i % 2 == 0 { &rgb } else { &ct };
					registry.register(next, &mut types);
				}
			});

			for _ in 0..4 {
				scope.spawn(|| {
					for _ in 0..500 {
						let light = registry.get(1).unwrap();
						let seen = kinds(&light);
						assert!(seen == rgb_kinds || seen == ct_kinds, "{seen:?}");
						for channel in light.channels() {
							assert!(Arc::ptr_eq(
								light.channel(channel.uid().as_str()).unwrap(),
								channel
							));
						}
					}
				});
			}
		});
	}
}
