//! JSON records printed by the `m3di` driver.
//!
//! Non-finite numbers have no JSON representation, so every component of a
//! result goes through [`Component`], which replaces infinities and NaNs by
//! [`SINGULAR_LABEL`].

use num_complex::Complex64;
use serde::Serialize;

use crate::sampler::IntegrandSample;
use crate::stats::StatsReport;

/// Printed in place of a non-finite real or imaginary part.
pub const SINGULAR_LABEL: &str = "infinity or removable singularity";

/// A real number, or the singular label when it is not finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Component {
    Value(f64),
    Singular(&'static str),
}

impl From<f64> for Component {
    fn from(x: f64) -> Self {
        if x.is_finite() {
            Component::Value(x)
        } else {
            Component::Singular(SINGULAR_LABEL)
        }
    }
}

impl Component {
    pub fn is_singular(&self) -> bool {
        matches!(self, Component::Singular(_))
    }
}

/// `ħ` the way the user typed it, e.g. `-0.1+0.0i`.
///
/// The `+` is left out only when the parsed imaginary part `im` is
/// negative, so a typed `-0.0` comes out as `+-0.0i`.
pub fn format_hbar(re_text: &str, im_text: &str, im: f64) -> String {
    let sign = if im < 0.0 { "" } else { "+" };
    format!("{}{}{}i", re_text, sign, im_text)
}

/// Output of `m3di integrate`.
#[derive(Debug, Clone, Serialize)]
pub struct IntegralReport {
    pub hbar_given: String,
    pub samples: usize,
    pub hbar_real_part: f64,
    pub hbar_imag_part: f64,
    pub int_real_part: Component,
    pub int_imag_part: Component,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsReport>,
}

impl IntegralReport {
    pub fn new(hbar_given: String, samples: usize, hbar: Complex64, value: Complex64) -> Self {
        Self {
            hbar_given,
            samples,
            hbar_real_part: hbar.re,
            hbar_imag_part: hbar.im,
            int_real_part: value.re.into(),
            int_imag_part: value.im.into(),
            stats: None,
        }
    }

    pub fn with_stats(mut self, stats: StatsReport) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Output of `m3di write`.
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub hbar_given: String,
    pub samples: usize,
    pub hbar_real_part: f64,
    pub hbar_imag_part: f64,
    pub points: Vec<IntegrandSample>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finite_value_serializes_as_numbers() {
        let report = IntegralReport::new(
            "-0.1+0i".to_string(),
            1000,
            Complex64::new(-0.1, 0.0),
            Complex64::new(-4.25, 0.5),
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["int_real_part"], json!(-4.25));
        assert_eq!(value["int_imag_part"], json!(0.5));
        assert_eq!(value["samples"], json!(1000));
        assert!(value.get("stats").is_none());
    }

    #[test]
    fn test_nan_value_serializes_as_label() {
        let report = IntegralReport::new(
            "-0.1+0i".to_string(),
            20,
            Complex64::new(-0.1, 0.0),
            Complex64::new(f64::NAN, f64::INFINITY),
        );
        assert!(report.int_real_part.is_singular());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["int_real_part"], json!(SINGULAR_LABEL));
        assert_eq!(value["int_imag_part"], json!(SINGULAR_LABEL));
    }

    #[test]
    fn test_format_hbar_inserts_sign() {
        assert_eq!(format_hbar("-0.1", "0.0", 0.0), "-0.1+0.0i");
        assert_eq!(format_hbar("-0.1", "-0.02", -0.02), "-0.1-0.02i");
        assert_eq!(format_hbar("-0.1", "1e-3", 1e-3), "-0.1+1e-3i");
    }

    #[test]
    fn test_format_hbar_negative_zero_keeps_plus() {
        let im: f64 = "-0.0".parse().unwrap();
        assert_eq!(format_hbar("-0.1", "-0.0", im), "-0.1+-0.0i");
    }
}
