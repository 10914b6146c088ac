//! Editable system parameters.
//!
//! Every value the parameter panel can show or change is a named field of
//! [`SystemParams`]. Section headings exist only as [`ParameterGroup`] titles.

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning raw panel input into a parameter update
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterParseError {
    #[error("Unknown parameter label: {0:?}")]
    UnknownLabel(String),

    #[error("Invalid value {input:?} for {label}")]
    InvalidValue {
        label: String,
        input: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Panel section a parameter is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterGroup {
    Model,
    OuterLoop,
    InnerLoop,
}

impl ParameterGroup {
    /// Section heading shown above the group
    pub fn title(&self) -> &'static str {
        match self {
            ParameterGroup::Model => "MODEL SPECIFICATIONS",
            ParameterGroup::OuterLoop => "OUTER LOOP PID",
            ParameterGroup::InnerLoop => "INNER LOOP PID",
        }
    }
}

/// A single editable parameter
///
/// Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    BeamLength,
    MotorMaxRpm,
    EncoderPpr,
    PwmResolution,
    SensorNoise,
    PositionFilterAlpha,
    OuterP,
    OuterI,
    OuterD,
    InnerP,
    InnerI,
    InnerD,
}

impl Parameter {
    /// All parameters in display order
    pub const ALL: [Parameter; 12] = [
        Parameter::BeamLength,
        Parameter::MotorMaxRpm,
        Parameter::EncoderPpr,
        Parameter::PwmResolution,
        Parameter::SensorNoise,
        Parameter::PositionFilterAlpha,
        Parameter::OuterP,
        Parameter::OuterI,
        Parameter::OuterD,
        Parameter::InnerP,
        Parameter::InnerI,
        Parameter::InnerD,
    ];

    /// Human-readable label used by the parameter panel
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::BeamLength => "Beam Length (m)",
            Parameter::MotorMaxRpm => "Motor Max RPM",
            Parameter::EncoderPpr => "Encoder PPR",
            Parameter::PwmResolution => "PWM Resolution",
            Parameter::SensorNoise => "Sensor Noise (m)",
            Parameter::PositionFilterAlpha => "LPF Alpha (Sensor)",
            Parameter::OuterP => "Outer P",
            Parameter::OuterI => "Outer I",
            Parameter::OuterD => "Outer D",
            Parameter::InnerP => "Inner P",
            Parameter::InnerI => "Inner I",
            Parameter::InnerD => "Inner D",
        }
    }

    pub fn group(&self) -> ParameterGroup {
        match self {
            Parameter::OuterP | Parameter::OuterI | Parameter::OuterD => ParameterGroup::OuterLoop,
            Parameter::InnerP | Parameter::InnerI | Parameter::InnerD => ParameterGroup::InnerLoop,
            _ => ParameterGroup::Model,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Parameter {
    type Err = ParameterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Parameter::ALL
            .into_iter()
            .find(|p| p.label() == label)
            .ok_or_else(|| ParameterParseError::UnknownLabel(label.to_string()))
    }
}

/// Typed snapshot of every editable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemParams {
    // ---- MODEL ----
    /// Units: meters
    pub beam_length: f64,
    /// Motor speed limit. Units: revolutions per minute (infinite = unbounded,
    /// `null` in serialized form)
    #[serde(with = "unbounded")]
    pub motor_max_rpm: f64,
    /// Encoder pulses per revolution
    pub encoder_ppr: f64,
    /// PWM steps per polarity
    pub pwm_resolution: f64,
    /// Position sensor noise half-width. Units: meters
    pub sensor_noise: f64,
    /// Position EMA smoothing constant
    pub position_filter_alpha: f64,

    // ---- OUTER LOOP ----
    pub outer_p: f64,
    pub outer_i: f64,
    pub outer_d: f64,

    // ---- INNER LOOP ----
    pub inner_p: f64,
    pub inner_i: f64,
    pub inner_d: f64,
}

impl SystemParams {
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::BeamLength => self.beam_length,
            Parameter::MotorMaxRpm => self.motor_max_rpm,
            Parameter::EncoderPpr => self.encoder_ppr,
            Parameter::PwmResolution => self.pwm_resolution,
            Parameter::SensorNoise => self.sensor_noise,
            Parameter::PositionFilterAlpha => self.position_filter_alpha,
            Parameter::OuterP => self.outer_p,
            Parameter::OuterI => self.outer_i,
            Parameter::OuterD => self.outer_d,
            Parameter::InnerP => self.inner_p,
            Parameter::InnerI => self.inner_i,
            Parameter::InnerD => self.inner_d,
        }
    }

    pub fn set(&mut self, parameter: Parameter, value: f64) {
        let slot = match parameter {
            Parameter::BeamLength => &mut self.beam_length,
            Parameter::MotorMaxRpm => &mut self.motor_max_rpm,
            Parameter::EncoderPpr => &mut self.encoder_ppr,
            Parameter::PwmResolution => &mut self.pwm_resolution,
            Parameter::SensorNoise => &mut self.sensor_noise,
            Parameter::PositionFilterAlpha => &mut self.position_filter_alpha,
            Parameter::OuterP => &mut self.outer_p,
            Parameter::OuterI => &mut self.outer_i,
            Parameter::OuterD => &mut self.outer_d,
            Parameter::InnerP => &mut self.inner_p,
            Parameter::InnerI => &mut self.inner_i,
            Parameter::InnerD => &mut self.inner_d,
        };
        *slot = value;
    }

    /// Overwrite every parameter named in `update`
    pub fn apply(&mut self, update: &ParameterUpdate) {
        for (parameter, value) in update.iter() {
            self.set(parameter, value);
        }
    }

    /// (parameter, value) pairs in display order
    pub fn entries(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        Parameter::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

impl Default for SystemParams {
    /// Values a freshly built simulation runs with
    fn default() -> Self {
        Self {
            beam_length: 0.8,
            motor_max_rpm: f64::INFINITY,
            encoder_ppr: 600.0,
            pwm_resolution: 255.0,
            sensor_noise: 0.003,
            position_filter_alpha: 0.1,
            outer_p: 0.8,
            outer_i: 0.02,
            outer_d: 0.6,
            inner_p: 20.0,
            inner_i: 0.5,
            inner_d: 8.0,
        }
    }
}

/// Serde adapter storing `+inf` as `null`, which JSON can represent
mod unbounded {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if *value == f64::INFINITY {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Subset of parameters to change before the next batch of sub-steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdate(BTreeMap<Parameter, f64>);

impl ParameterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        self.insert(parameter, value);
        self
    }

    pub fn insert(&mut self, parameter: Parameter, value: f64) {
        self.0.insert(parameter, value);
    }

    /// Parse a panel label and raw text into a typed entry
    pub fn parse(label: &str, raw: &str) -> Result<(Parameter, f64), ParameterParseError> {
        let parameter: Parameter = label.parse()?;
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|source| ParameterParseError::InvalidValue {
                label: parameter.label().to_string(),
                input: raw.to_string(),
                source,
            })?;
        Ok((parameter, value))
    }

    /// Parse and insert; on error the update is left untouched
    pub fn insert_raw(&mut self, label: &str, raw: &str) -> Result<(), ParameterParseError> {
        let (parameter, value) = Self::parse(label, raw)?;
        self.insert(parameter, value);
        Ok(())
    }

    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.0.get(&parameter).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        self.0.iter().map(|(p, v)| (*p, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(Parameter, f64)> for ParameterUpdate {
    fn from_iter<I: IntoIterator<Item = (Parameter, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for parameter in Parameter::ALL {
            assert_eq!(parameter.label().parse::<Parameter>().unwrap(), parameter);
        }
    }

    #[test]
    fn test_unknown_label() {
        let err = "--- OUTER LOOP PID ---".parse::<Parameter>().unwrap_err();
        assert!(matches!(err, ParameterParseError::UnknownLabel(_)));
    }

    #[test]
    fn test_groups_follow_display_order() {
        let groups: Vec<_> = Parameter::ALL.iter().map(|p| p.group()).collect();
        assert_eq!(groups[..6], [ParameterGroup::Model; 6]);
        assert_eq!(groups[6..9], [ParameterGroup::OuterLoop; 3]);
        assert_eq!(groups[9..], [ParameterGroup::InnerLoop; 3]);
        assert_eq!(ParameterGroup::InnerLoop.title(), "INNER LOOP PID");
    }

    #[test]
    fn test_parse_valid_entry() {
        let (parameter, value) = ParameterUpdate::parse("Outer D", " 2.5 ").unwrap();
        assert_eq!(parameter, Parameter::OuterD);
        assert_eq!(value, 2.5);
    }

    #[test]
    fn test_invalid_value_leaves_update_untouched() {
        let mut update = ParameterUpdate::new().with(Parameter::InnerP, 20.0);

        let err = update.insert_raw("Inner P", "1.2.3").unwrap_err();
        assert!(matches!(err, ParameterParseError::InvalidValue { .. }));
        assert_eq!(update.get(Parameter::InnerP), Some(20.0));
        assert_eq!(update.len(), 1);
    }

    #[test]
    fn test_apply_changes_only_named_fields() {
        let mut params = SystemParams::default();
        let update = ParameterUpdate::new()
            .with(Parameter::BeamLength, 1.2)
            .with(Parameter::InnerD, 3.0);

        params.apply(&update);

        assert_eq!(params.beam_length, 1.2);
        assert_eq!(params.inner_d, 3.0);
        assert_eq!(params.outer_p, SystemParams::default().outer_p);
    }

    #[test]
    fn test_default_params_json_round_trip() {
        let params = SystemParams::default();
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains(r#""motor_max_rpm":null"#));

        let back: SystemParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
        assert!(back.motor_max_rpm.is_infinite());
    }

    #[test]
    fn test_bounded_rpm_serialized_as_number() {
        let params = SystemParams {
            motor_max_rpm: 150.0,
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["motor_max_rpm"], 150.0);

        let back: SystemParams = serde_json::from_value(value).unwrap();
        assert_eq!(back.motor_max_rpm, 150.0);
    }

    #[test]
    fn test_entries_in_display_order() {
        let params = SystemParams::default();
        let entries: Vec<_> = params.entries().collect();
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0], (Parameter::BeamLength, 0.8));
        assert_eq!(entries[11], (Parameter::InnerD, 8.0));
    }
}
