use serde::Serialize;
use std::fmt;

/// Reporting frequency declared in a series' metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Semiannual,
    Annual,
    #[default]
    Unknown,
}

impl Frequency {
    /// Map a provider frequency code (`m`, `M`, `Monthly`, ...) to a frequency.
    /// Unrecognized codes map to `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "d" | "D" | "Daily" => Frequency::Daily,
            "w" | "W" | "Weekly" => Frequency::Weekly,
            "bw" | "BW" | "Biweekly" => Frequency::Biweekly,
            "m" | "M" | "Monthly" => Frequency::Monthly,
            "q" | "Q" | "Quarterly" => Frequency::Quarterly,
            "sa" | "SA" | "Semiannual" => Frequency::Semiannual,
            "a" | "A" | "Annual" => Frequency::Annual,
            _ => Frequency::Unknown,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Semiannual => "semiannual",
            Frequency::Annual => "annual",
            Frequency::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
