/// Identity settings shared by every light a factory builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightOptions {
	pub(crate) thing_uid: String,
	pub(crate) binding_id: String,
	pub(crate) module: String,
}

impl LightOptions {
	const DEFAULT_BINDING_ID: &'static str = "esphome";
	const DEFAULT_MODULE: &'static str = "light";

	pub fn new(thing_uid: impl Into<String>) -> Self {
		LightOptions {
			thing_uid: thing_uid.into(),
			binding_id: Self::DEFAULT_BINDING_ID.into(),
			module: Self::DEFAULT_MODULE.into(),
		}
	}

	pub fn binding_id(mut self, binding_id: impl Into<String>) -> Self {
		self.binding_id = binding_id.into();
		self
	}

	pub fn module(mut self, module: impl Into<String>) -> Self {
		self.module = module.into();
		self
	}

	pub fn thing_uid(&self) -> &str {
		&self.thing_uid
	}

	/// Prefix of channel type ids, `<binding_id>:<module>`.
	pub(crate) fn type_prefix(&self) -> String {
		format!("{}:{}", self.binding_id, self.module)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let options = LightOptions::new("esphome:device:kitchen");

		assert_eq!(options.thing_uid(), "esphome:device:kitchen");
		assert_eq!(options.type_prefix(), "esphome:light");
	}

	#[test]
	fn overrides() {
		let options = LightOptions::new("t").binding_id("acme").module("lamp");

		assert_eq!(options.type_prefix(), "acme:lamp");
	}
}
