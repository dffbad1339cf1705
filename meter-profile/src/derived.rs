//! Derived channels: var, VA and power factor
//!
//! Derived values are computed per interval from a watt channel and one
//! second input (VA, var or Q). Domain anomalies such as a negative
//! square-root argument clamp to zero; they are never reported as errors.

use crate::interval::Interval;
use meter_core::quantity_names::energy_to_demand_name;
use meter_core::{DisplayScale, MeterError, MeterResult, StatusSet};
use serde::{Deserialize, Serialize};

/// `var = sqrt(VA² - W²)`, `0` when `W > VA`
pub fn calculate_var(watt: f64, va: f64) -> f64 {
    if watt <= va {
        (va * va - watt * watt).max(0.0).sqrt()
    } else {
        0.0
    }
}

/// var from a Q reading: `(2Q - W) / √3`
pub fn calculate_var_from_q(watt: f64, q: f64) -> f64 {
    (2.0 * q - watt) / 3f64.sqrt()
}

/// `VA = sqrt(W² + var²)`
pub fn calculate_va(watt: f64, var: f64) -> f64 {
    if watt == 0.0 && var == 0.0 {
        return 0.0;
    }
    (watt * watt + var * var).sqrt()
}

pub fn calculate_va_from_q(watt: f64, q: f64) -> f64 {
    calculate_va(watt, calculate_var_from_q(watt, q))
}

/// `PF = W / VA`, never above `1.0`
///
/// Both inputs zero gives `0`; a zero VA with non-zero watts gives `1`.
pub fn calculate_pf(watt: f64, va: f64) -> f64 {
    if va == 0.0 {
        return if watt == 0.0 { 0.0 } else { 1.0 };
    }
    (watt / va).min(1.0)
}

pub fn calculate_pf_from_var(watt: f64, var: f64) -> f64 {
    calculate_pf(watt, calculate_va(watt, var))
}

pub fn calculate_pf_from_q(watt: f64, q: f64) -> f64 {
    calculate_pf(watt, calculate_va_from_q(watt, q))
}

/// Derived quantity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedKind {
    Var,
    Va,
    Pf,
}

impl DerivedKind {
    pub const ALL: [DerivedKind; 3] = [DerivedKind::Var, DerivedKind::Va, DerivedKind::Pf];

    /// Name of a freshly created channel of this kind, before scale and
    /// demand rewriting
    pub fn base_name(self) -> &'static str {
        match self {
            DerivedKind::Var => "varh (Calculated)",
            DerivedKind::Va => "VAh (Calculated)",
            DerivedKind::Pf => "PF (Calculated)",
        }
    }

    /// Channel name for a profile in `scale`, rewritten for demand data
    ///
    /// Power factor is dimensionless and never takes a scale prefix.
    pub fn channel_name(self, scale: DisplayScale, demand: bool) -> String {
        let base = self.base_name();
        let name = match (self, scale.prefix()) {
            (DerivedKind::Pf, _) | (_, None) => base.to_string(),
            (_, Some(prefix)) => format!("{}{}", prefix, base),
        };
        if demand {
            energy_to_demand_name(&name)
        } else {
            name
        }
    }
}

impl std::fmt::Display for DerivedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DerivedKind::Var => "var",
            DerivedKind::Va => "VA",
            DerivedKind::Pf => "PF",
        };
        write!(f, "{}", name)
    }
}

/// Second input of a derived computation, resolved from [`DerivedSources`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondInput {
    Var(usize),
    Va(usize),
    Q(usize),
}

impl SecondInput {
    pub fn channel(self) -> usize {
        match self {
            SecondInput::Var(channel) | SecondInput::Va(channel) | SecondInput::Q(channel) => {
                channel
            }
        }
    }
}

/// Source channel indices of a derived channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSources {
    pub watt: usize,
    pub var: Option<usize>,
    pub va: Option<usize>,
    pub q: Option<usize>,
}

impl DerivedSources {
    pub fn new(watt: usize) -> Self {
        Self {
            watt,
            var: None,
            va: None,
            q: None,
        }
    }

    pub fn with_var(mut self, var: usize) -> Self {
        self.var = Some(var);
        self
    }

    pub fn with_va(mut self, va: usize) -> Self {
        self.va = Some(va);
        self
    }

    pub fn with_q(mut self, q: usize) -> Self {
        self.q = Some(q);
        self
    }

    /// Pick the second input for `kind`
    ///
    /// Priority is VA, var, Q for power factor; VA, Q for var; var, Q for VA.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when none of the usable inputs is set.
    pub fn second_input(&self, kind: DerivedKind) -> MeterResult<SecondInput> {
        let candidate = match kind {
            DerivedKind::Pf => self
                .va
                .map(SecondInput::Va)
                .or(self.var.map(SecondInput::Var))
                .or(self.q.map(SecondInput::Q)),
            DerivedKind::Var => self.va.map(SecondInput::Va).or(self.q.map(SecondInput::Q)),
            DerivedKind::Va => self.var.map(SecondInput::Var).or(self.q.map(SecondInput::Q)),
        };
        candidate.ok_or_else(|| {
            MeterError::InvalidArgument(format!("No source channel available to derive {}", kind))
        })
    }

    /// Every channel index referenced by these sources
    pub fn channels(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.watt).chain(self.var).chain(self.va).chain(self.q)
    }

    /// Derived value and status for one interval
    ///
    /// The status is the union of the two source channel statuses.
    pub fn compute(&self, kind: DerivedKind, interval: &Interval) -> MeterResult<(f64, StatusSet)> {
        let second = self.second_input(kind)?;
        let (watt, watt_status) = interval.cell(self.watt)?;
        let (other, other_status) = interval.cell(second.channel())?;

        let value = match (kind, second) {
            (DerivedKind::Var, SecondInput::Va(_)) => calculate_var(watt, other),
            (DerivedKind::Var, _) => calculate_var_from_q(watt, other),
            (DerivedKind::Va, SecondInput::Var(_)) => calculate_va(watt, other),
            (DerivedKind::Va, _) => calculate_va_from_q(watt, other),
            (DerivedKind::Pf, SecondInput::Va(_)) => calculate_pf(watt, other),
            (DerivedKind::Pf, SecondInput::Var(_)) => calculate_pf_from_var(watt, other),
            (DerivedKind::Pf, SecondInput::Q(_)) => calculate_pf_from_q(watt, other),
        };
        Ok((value, watt_status.concatenate(other_status)))
    }
}

/// Request state of one derived kind on a load profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DerivedState {
    #[default]
    NotRequested,
    /// Requested on pulse data; computed on conversion
    Pending(DerivedSources),
    /// Present as the given channel
    Computed(usize),
}

impl DerivedState {
    pub fn is_pending(&self) -> bool {
        matches!(self, DerivedState::Pending(_))
    }

    pub fn channel(&self) -> Option<usize> {
        match self {
            DerivedState::Computed(channel) => Some(*channel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_var_clamp() {
        assert_eq!(calculate_var(10.0, 5.0), 0.0);
        assert_eq!(calculate_var(-10.0, 5.0), 0.0);
        assert!(approx(calculate_var(3.0, 5.0), 4.0));
    }

    #[test]
    fn test_pf_clamp() {
        assert_eq!(calculate_pf(100.0, 50.0), 1.0);
        assert_eq!(calculate_pf(0.0, 0.0), 0.0);
        assert_eq!(calculate_pf(5.0, 0.0), 1.0);
        assert!(approx(calculate_pf(-3.0, 5.0), -0.6));
    }

    #[test]
    fn test_va_and_q_formulas() {
        assert!(approx(calculate_va(3.0, 4.0), 5.0));
        assert_eq!(calculate_va(0.0, 0.0), 0.0);
        assert!(approx(calculate_var_from_q(1.0, 2.0), 3f64.sqrt()));
        assert!(approx(calculate_va_from_q(1.0, 2.0), 2.0));
        assert!(approx(calculate_pf_from_var(3.0, 4.0), 0.6));
        assert!(approx(calculate_pf_from_q(1.0, 2.0), 0.5));
    }

    #[test]
    fn test_second_input_priority() {
        let all = DerivedSources::new(0).with_var(1).with_va(2).with_q(3);
        assert_eq!(all.second_input(DerivedKind::Pf).unwrap(), SecondInput::Va(2));
        assert_eq!(all.second_input(DerivedKind::Var).unwrap(), SecondInput::Va(2));
        assert_eq!(all.second_input(DerivedKind::Va).unwrap(), SecondInput::Var(1));

        let var_only = DerivedSources::new(0).with_var(1);
        assert_eq!(var_only.second_input(DerivedKind::Pf).unwrap(), SecondInput::Var(1));
        assert!(var_only.second_input(DerivedKind::Var).is_err());

        let q_only = DerivedSources::new(0).with_q(3);
        assert_eq!(q_only.second_input(DerivedKind::Va).unwrap(), SecondInput::Q(3));
        assert!(DerivedSources::new(0).second_input(DerivedKind::Pf).is_err());
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(DerivedKind::Var.channel_name(DisplayScale::Units, false), "varh (Calculated)");
        assert_eq!(DerivedKind::Va.channel_name(DisplayScale::Kilo, false), "kVAh (Calculated)");
        assert_eq!(DerivedKind::Var.channel_name(DisplayScale::Mega, true), "Mvar (Calculated)");
        assert_eq!(DerivedKind::Pf.channel_name(DisplayScale::Kilo, true), "PF (Calculated)");
    }

    #[test]
    fn test_compute_status_union() {
        let time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 15, 0)
            .unwrap();
        let interval = Interval::new(
            0,
            vec![3.0, 5.0],
            vec![StatusSet::from("D"), StatusSet::from("SD")],
            StatusSet::new(),
            time,
            DisplayScale::Units,
        )
        .unwrap();
        let sources = DerivedSources::new(0).with_va(1);
        let (value, status) = sources.compute(DerivedKind::Var, &interval).unwrap();
        assert!(approx(value, 4.0));
        assert_eq!(status.as_str(), "DS");

        let missing = DerivedSources::new(0).with_va(4);
        assert!(matches!(
            missing.compute(DerivedKind::Pf, &interval),
            Err(MeterError::ChannelOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn test_state() {
        assert_eq!(DerivedState::default(), DerivedState::NotRequested);
        assert!(DerivedState::Pending(DerivedSources::new(0)).is_pending());
        assert_eq!(DerivedState::Computed(3).channel(), Some(3));
    }
}
