//! Mired and Kelvin conversions.
//!
//! See <https://en.wikipedia.org/wiki/Mired>.

use thiserror::Error;

const MIRED_BASE: f32 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ColorTempError {
	#[error("invalid color temperature: {mired} mired")]
	InvalidMired { mired: f32 },

	#[error("invalid color temperature: {kelvin} K")]
	InvalidKelvin { kelvin: f32 },
}

/// Converts a reciprocal color temperature to Kelvin.
///
/// Zero, negative and non-finite inputs have no physical meaning and are
/// rejected instead of producing an infinite or negative temperature.
pub fn mired_to_kelvin(mired: f32) -> Result<f32, ColorTempError> {
	if !(mired.is_finite() && mired > 0.0) {
		return Err(ColorTempError::InvalidMired { mired });
	}

	Ok(MIRED_BASE / mired)
}

pub fn kelvin_to_mired(kelvin: f32) -> Result<f32, ColorTempError> {
	if !(kelvin.is_finite() && kelvin > 0.0) {
		return Err(ColorTempError::InvalidKelvin { kelvin });
	}

	Ok(MIRED_BASE / kelvin)
}

/// Formats a Kelvin value for display, rounded to a whole number.
pub fn format_kelvin(kelvin: f32) -> String {
	format!("{}", kelvin.round() as i64)
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	#[test]
	fn round_trips_through_mired() {
		for kelvin in [1000.0f32, 2000.0, 2700.0, 4000.0, 6500.0, 10_000.0] {
			let mired = MIRED_BASE / kelvin;
			let back = mired_to_kelvin(mired).expect("positive mired");

			assert!((back - kelvin).abs() / kelvin < 1e-5, "{kelvin} -> {back}");
		}
	}

	#[test]
	fn zero_mired_is_rejected() {
		assert_matches!(
			mired_to_kelvin(0.0),
			Err(ColorTempError::InvalidMired { mired }) if mired == 0.0
		);
	}

	#[test]
	fn non_physical_inputs_are_rejected() {
		assert_matches!(mired_to_kelvin(-153.0), Err(ColorTempError::InvalidMired { .. }));
		assert_matches!(mired_to_kelvin(f32::NAN), Err(ColorTempError::InvalidMired { .. }));
		assert_matches!(kelvin_to_mired(0.0), Err(ColorTempError::InvalidKelvin { .. }));
	}

	#[test]
	fn kelvin_to_mired_inverts() {
		assert_eq!(kelvin_to_mired(2000.0), Ok(500.0));
		assert_eq!(mired_to_kelvin(500.0), Ok(2000.0));
	}

	#[test]
	fn formats_whole_kelvin() {
		assert_eq!(format_kelvin(6535.9478), "6536");
		assert_eq!(format_kelvin(2000.0), "2000");
		assert_eq!(format_kelvin(2702.4), "2702");
	}
}
