//! Minimal display helpers shared with the UI layer.

/// Format a power value given in kilowatts with an auto-selected unit.
pub fn format_power(kilowatts: f64) -> String {
    if kilowatts >= 1_000_000_000.0 {
        format!("{:.2} TW", kilowatts / 1_000_000_000.0)
    } else if kilowatts >= 1_000_000.0 {
        format!("{:.2} GW", kilowatts / 1_000_000.0)
    } else if kilowatts >= 1_000.0 {
        format!("{:.2} MW", kilowatts / 1_000.0)
    } else {
        format!("{} kW", kilowatts as i64)
    }
}
