//! Quantity-name tables
//!
//! Two parallel tables map every energy quantity name to its demand
//! counterpart (`Wh d` to `W d`, `VARh d` to `VAR d`). The tables also
//! drive channel renaming when the display scale changes: a known name
//! carries the scale as a `k`/`M` prefix, any other name as a
//! `" (Kilo)"`/`" (Mega)"` suffix.

use crate::scale::DisplayScale;

/// Energy quantity names, parallel to [`DEMAND_NAMES`]
pub const ENERGY_NAMES: [&str; 47] = [
    "Wh",
    "Wh d",
    "Wh r",
    "Wh net",
    "Wh total",
    "Wh Q1",
    "Wh Q2",
    "Wh Q3",
    "Wh Q4",
    "varh",
    "varh d",
    "varh r",
    "varh net",
    "varh total",
    "varh Q1",
    "varh Q2",
    "varh Q3",
    "varh Q4",
    "VARh",
    "VARh d",
    "VARh r",
    "VARh net",
    "VARh total",
    "VARh Q1",
    "VARh Q2",
    "VARh Q3",
    "VARh Q4",
    "VAh",
    "VAh d",
    "VAh r",
    "VAh net",
    "VAh total",
    "VAh Q1",
    "VAh Q2",
    "VAh Q3",
    "VAh Q4",
    "Qh",
    "Qh d",
    "Qh r",
    "Qh net",
    "Qh total",
    "Qh Q1",
    "Qh Q2",
    "Qh Q3",
    "Qh Q4",
    "varh (Calculated)",
    "VAh (Calculated)",
];

/// Demand quantity names, parallel to [`ENERGY_NAMES`]
pub const DEMAND_NAMES: [&str; 47] = [
    "W",
    "W d",
    "W r",
    "W net",
    "W total",
    "W Q1",
    "W Q2",
    "W Q3",
    "W Q4",
    "var",
    "var d",
    "var r",
    "var net",
    "var total",
    "var Q1",
    "var Q2",
    "var Q3",
    "var Q4",
    "VAR",
    "VAR d",
    "VAR r",
    "VAR net",
    "VAR total",
    "VAR Q1",
    "VAR Q2",
    "VAR Q3",
    "VAR Q4",
    "VA",
    "VA d",
    "VA r",
    "VA net",
    "VA total",
    "VA Q1",
    "VA Q2",
    "VA Q3",
    "VA Q4",
    "Q",
    "Q d",
    "Q r",
    "Q net",
    "Q total",
    "Q Q1",
    "Q Q2",
    "Q Q3",
    "Q Q4",
    "var (Calculated)",
    "VA (Calculated)",
];

/// `true` if `name` is an unprefixed energy or demand quantity name
pub fn is_known_quantity_name(name: &str) -> bool {
    ENERGY_NAMES.contains(&name) || DEMAND_NAMES.contains(&name)
}

/// `true` if `name` labels a power factor quantity
///
/// Power factor is dimensionless, so these channels are never rescaled,
/// renamed or converted between energy and demand.
pub fn is_power_factor_name(name: &str) -> bool {
    let name = name.trim();
    name == "PF" || name.starts_with("PF ") || name.contains("Power Factor")
}

/// Split a known quantity name into its scale prefix and base name
///
/// Returns `None` when the name (with or without a `k`/`M` prefix) is not
/// in the quantity-name tables.
pub fn split_scale_prefix(name: &str) -> Option<(Option<char>, &str)> {
    if is_known_quantity_name(name) {
        return Some((None, name));
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(prefix @ ('k' | 'M')) => {
            let base = chars.as_str();
            if is_known_quantity_name(base) {
                Some((Some(prefix), base))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn strip_scale_suffix(name: &str) -> &str {
    [DisplayScale::Kilo, DisplayScale::Mega]
        .iter()
        .filter_map(|scale| scale.suffix())
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

/// Rename a channel for a new display scale
///
/// Known quantity names get the scale prefix (`Wh d` becomes `kWh d`),
/// other names get the scale suffix (`Pulses` becomes `Pulses (Kilo)`).
/// Any prefix or suffix from a previous scale is replaced.
pub fn rescale_name(name: &str, scale: DisplayScale) -> String {
    match split_scale_prefix(name) {
        Some((_, base)) => match scale.prefix() {
            Some(prefix) => format!("{}{}", prefix, base),
            None => base.to_string(),
        },
        None => {
            let base = strip_scale_suffix(name);
            match scale.suffix() {
                Some(suffix) => format!("{}{}", base, suffix),
                None => base.to_string(),
            }
        }
    }
}

/// Rewrite an energy quantity name into its demand counterpart
///
/// Any `k`/`M` prefix is preserved. Names without a mapping are returned
/// unchanged.
pub fn energy_to_demand_name(name: &str) -> String {
    let Some((prefix, base)) = split_scale_prefix(name) else {
        return name.to_string();
    };
    match ENERGY_NAMES.iter().position(|energy| *energy == base) {
        Some(index) => {
            let demand = DEMAND_NAMES[index];
            match prefix {
                Some(prefix) => format!("{}{}", prefix, demand),
                None => demand.to_string(),
            }
        }
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_parallel() {
        assert_eq!(ENERGY_NAMES.len(), DEMAND_NAMES.len());
    }

    #[test]
    fn test_split_scale_prefix() {
        assert_eq!(split_scale_prefix("Wh d"), Some((None, "Wh d")));
        assert_eq!(split_scale_prefix("kWh d"), Some((Some('k'), "Wh d")));
        assert_eq!(split_scale_prefix("MVAh r"), Some((Some('M'), "VAh r")));
        assert_eq!(split_scale_prefix("Pulses"), None);
        assert_eq!(split_scale_prefix("kPulses"), None);
    }

    #[test]
    fn test_rescale_known_name() {
        assert_eq!(rescale_name("Wh d", DisplayScale::Kilo), "kWh d");
        assert_eq!(rescale_name("kWh d", DisplayScale::Mega), "MWh d");
        assert_eq!(rescale_name("MW", DisplayScale::Units), "W");
    }

    #[test]
    fn test_rescale_unknown_name() {
        assert_eq!(rescale_name("Pulses", DisplayScale::Kilo), "Pulses (Kilo)");
        assert_eq!(rescale_name("Pulses (Kilo)", DisplayScale::Mega), "Pulses (Mega)");
        assert_eq!(rescale_name("Pulses (Mega)", DisplayScale::Units), "Pulses");
    }

    #[test]
    fn test_energy_to_demand_name() {
        assert_eq!(energy_to_demand_name("Wh"), "W");
        assert_eq!(energy_to_demand_name("VARh d"), "VAR d");
        assert_eq!(energy_to_demand_name("kvarh (Calculated)"), "kvar (Calculated)");
        assert_eq!(energy_to_demand_name("W d"), "W d");
        assert_eq!(energy_to_demand_name("PF (Calculated)"), "PF (Calculated)");
    }

    #[test]
    fn test_power_factor_name() {
        assert!(is_power_factor_name("PF"));
        assert!(is_power_factor_name("PF (Calculated)"));
        assert!(is_power_factor_name("Power Factor A"));
        assert!(!is_power_factor_name("PFC Pulses"));
        assert!(!is_power_factor_name("Wh d"));
    }
}
