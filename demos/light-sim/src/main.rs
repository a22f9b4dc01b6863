use error_stack::{Report, ResultExt};
use esphome_light::{
	ColorMode, Command, LightChannelDef, LightCommandRequest, LightFactory, LightOptions,
	LightRegistry, LightStateResponse, ListEntitiesLightResponse, channel_type::ChannelTypeCache,
};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, Registry, prelude::*};
use tracing_tree::HierarchicalLayer;

#[derive(Debug, Error)]
enum ApplicationError {
	#[error("parse advertisement")]
	ParseAdvertisement,

	#[error("missing channel: {0}")]
	MissingChannel(LightChannelDef),
}

const ADVERTISEMENT: &str = r#"{
	"object_id": "living_room_strip",
	"key": 3172581542,
	"name": "Living room strip",
	"unique_id": "livingroomstriplight",
	"supported_color_modes": [35, 11, 64],
	"min_mireds": 153.0,
	"max_mireds": 500.0,
	"effects": ["Rainbow", "Strobe"]
}"#;

fn send(request: LightCommandRequest) -> Result<(), serde_json::Error> {
	let json = serde_json::to_string(&request)?;
	println!("-> {json}");
	Ok(())
}

fn main() -> Result<(), Report<ApplicationError>> {
	Registry::default()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
		.with(HierarchicalLayer::new(2))
		.init();

	let advertisement: ListEntitiesLightResponse =
		serde_json::from_str(ADVERTISEMENT).change_context(ApplicationError::ParseAdvertisement)?;

	let registry = LightRegistry::new(LightFactory::new(LightOptions::new(
		"esphome:device:living_room",
	)));
	let mut types = ChannelTypeCache::new();

	println!("registering light");
	let light = registry.register(&advertisement, &mut types);
	for channel in light.channels() {
		println!(
			"  {} [{}] type={} modes={}",
			channel.uid(),
			channel.item_type(),
			channel.type_uid(),
			channel.color_mode_config().as_deref().unwrap_or("*"),
		);
	}

	let uid = |kind| {
		light
			.channel_by_kind(kind)
			.map(|channel| channel.uid().clone())
			.ok_or(ApplicationError::MissingChannel(kind))
	};

	let commands = [
		(LightChannelDef::OnOff, Command::from(true)),
		(LightChannelDef::MasterBrightness, Command::from(1.5f64)),
		(LightChannelDef::MasterBrightness, Command::from("dim")),
		(LightChannelDef::ColorMode, Command::from("color_temperature")),
		(LightChannelDef::ColorTemperature, Command::from(2700.0f64)),
		(LightChannelDef::Effect, Command::from("Rainbow")),
		(LightChannelDef::TransitionLength, Command::from(1500u32)),
	];

	println!("sending commands");
	for (kind, command) in commands {
		let uid = uid(kind)?;
		registry.handle_command(light.key(), uid.as_str(), &command, &send);
	}

	let reports = [
		LightStateResponse {
			key: light.key(),
			state: true,
			brightness: 1.0,
			color_mode: ColorMode::ColorTemperature.bit_mask(),
			color_temperature: 370.0,
			effect: Some("Rainbow".into()),
			..Default::default()
		},
		LightStateResponse {
			key: light.key(),
			state: false,
			brightness: 0.4,
			color_mode: ColorMode::Rgb.bit_mask(),
			color_brightness: 0.8,
			red: 1.0,
			green: 0.5,
			blue: 0.1,
			color_temperature: 370.0,
			..Default::default()
		},
	];

	println!("publishing state");
	for report in &reports {
		for update in registry.handle_state(report) {
			println!("<- {} = {}", update.uid, update.value);
		}
	}

	Ok(())
}
