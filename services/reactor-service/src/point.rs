//! Reactor snapshots as InfluxDB line protocol points.
//!
//! ```text
//! reactor,label=R1,reactor_type=fission energy_stored=1000,fuel_amount=100i,status="online" 1700000000
//! ```
//! Timestamps are whole seconds; writes must use `precision=s`.

use std::fmt;

use crate::models::Snapshot;

pub const MEASUREMENT: &str = "reactor";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    String(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(value) => write!(f, "{value}"),
            FieldValue::Integer(value) => write!(f, "{value}i"),
            FieldValue::String(value) => {
                write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: Vec<(&'static str, String)>,
    pub fields: Vec<(&'static str, FieldValue)>,
    pub timestamp_secs: i64,
}

impl Point {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            measurement: MEASUREMENT.to_string(),
            tags: vec![
                ("label", snapshot.computer_label.clone()),
                ("reactor_type", snapshot.reactor_type.clone()),
            ],
            fields: vec![
                ("energy_stored", FieldValue::Float(snapshot.energy_stored)),
                (
                    "energy_produced",
                    FieldValue::Float(snapshot.energy_produced_last_tick),
                ),
                ("fuel_temp", FieldValue::Float(snapshot.fuel_temp)),
                ("casing_temp", FieldValue::Float(snapshot.casing_temp)),
                ("fuel_amount", FieldValue::Integer(snapshot.fuel_amount)),
                ("waste_amount", FieldValue::Integer(snapshot.waste_amount)),
                (
                    "fuel_used",
                    FieldValue::Float(snapshot.fuel_consumed_last_tick),
                ),
                ("reactivity", FieldValue::Float(snapshot.fuel_reactivity)),
                (
                    "rod_insertion",
                    FieldValue::Float(snapshot.control_rod_insertion),
                ),
                ("status", FieldValue::String(snapshot.status.clone())),
            ],
            timestamp_secs: snapshot.timestamp,
        }
    }

    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement);

        // Empty tag values are not representable, so those tags are dropped.
        let mut tags: Vec<_> = self
            .tags
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        tags.sort_by_key(|(key, _)| *key);
        for (key, value) in tags {
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&value.to_string());
        }

        line.push(' ');
        line.push_str(&self.timestamp_secs.to_string());
        line
    }
}

fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

// Tag keys, tag values and field keys share one escaping rule.
fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

fn escape(s: &str, specials: &[char]) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            // Doubling backslashes keeps a trailing one from swallowing the next separator.
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{c}' => escaped.push_str("\\f"),
            c if specials.contains(&c) => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            status: "online".to_string(),
            energy_stored: 1000.0,
            energy_produced_last_tick: 12.5,
            fuel_temp: 500.0,
            casing_temp: 310.25,
            fuel_amount: 100,
            waste_amount: 3,
            fuel_consumed_last_tick: 0.125,
            fuel_reactivity: 1.5,
            computer_id: 1,
            computer_label: "R1".to_string(),
            control_rod_insertion: 50.0,
            reactor_type: "fission".to_string(),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn maps_snapshot_fields() {
        let point = Point::from_snapshot(&sample());
        assert_eq!(point.measurement, "reactor");
        assert_eq!(point.fields.len(), 10);
        assert_eq!(point.timestamp_secs, 1_700_000_000);
        assert!(point
            .fields
            .contains(&("fuel_amount", FieldValue::Integer(100))));
        assert!(point
            .fields
            .contains(&("status", FieldValue::String("online".to_string()))));
    }

    #[test]
    fn renders_full_line() {
        let line = Point::from_snapshot(&sample()).to_line_protocol();
        assert_eq!(
            line,
            "reactor,label=R1,reactor_type=fission \
             energy_stored=1000,energy_produced=12.5,fuel_temp=500,casing_temp=310.25,\
             fuel_amount=100i,waste_amount=3i,fuel_used=0.125,reactivity=1.5,\
             rod_insertion=50,status=\"online\" 1700000000"
        );
    }

    #[test]
    fn escapes_tags_and_strings() {
        let snapshot = Snapshot {
            computer_label: "Main Reactor,A".to_string(),
            status: "say \"hi\"".to_string(),
            ..sample()
        };
        let line = Point::from_snapshot(&snapshot).to_line_protocol();
        assert!(line.starts_with("reactor,label=Main\\ Reactor\\,A,reactor_type=fission "));
        assert!(line.contains("status=\"say \\\"hi\\\"\""));
    }

    #[test]
    fn escapes_control_characters_in_tags() {
        let snapshot = Snapshot {
            computer_label: "R1\nR2\tx".to_string(),
            reactor_type: "fission\\".to_string(),
            ..sample()
        };
        let line = Point::from_snapshot(&snapshot).to_line_protocol();
        assert!(line.starts_with("reactor,label=R1\\nR2\\tx,reactor_type=fission\\\\ energy_stored="));
        assert!(!line.contains('\n'));
        assert!(!line.contains('\t'));
    }

    #[test]
    fn trailing_backslash_does_not_escape_separator() {
        let snapshot = Snapshot {
            computer_label: "R1\\".to_string(),
            ..sample()
        };
        let line = Point::from_snapshot(&snapshot).to_line_protocol();
        assert!(line.starts_with("reactor,label=R1\\\\,reactor_type=fission "));
    }

    #[test]
    fn drops_empty_tags() {
        let line = Point::from_snapshot(&Snapshot::default()).to_line_protocol();
        assert!(line.starts_with("reactor energy_stored=0,"));
        assert!(line.ends_with("status=\"\" 0"));
    }
}
