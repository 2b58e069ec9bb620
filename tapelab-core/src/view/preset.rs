//! Named range presets mapping labels to visible bar counts.

use serde::{Deserialize, Serialize};

/// Preset display ranges. `All` is unbounded (the whole history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangePreset {
    M1,
    M3,
    M6,
    Y1,
    Y2,
    Y5,
    All,
}

impl RangePreset {
    pub const ALL: [RangePreset; 7] = [
        RangePreset::M1,
        RangePreset::M3,
        RangePreset::M6,
        RangePreset::Y1,
        RangePreset::Y2,
        RangePreset::Y5,
        RangePreset::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::M1 => "1M",
            RangePreset::M3 => "3M",
            RangePreset::M6 => "6M",
            RangePreset::Y1 => "1Y",
            RangePreset::Y2 => "2Y",
            RangePreset::Y5 => "5Y",
            RangePreset::All => "ALL",
        }
    }

    /// Visible bars for the preset; None means the full history.
    pub fn bar_count(&self) -> Option<usize> {
        match self {
            RangePreset::M1 => Some(21),
            RangePreset::M3 => Some(63),
            RangePreset::M6 => Some(126),
            RangePreset::Y1 => Some(252),
            RangePreset::Y2 => Some(504),
            RangePreset::Y5 => Some(1260),
            RangePreset::All => None,
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<RangePreset> {
        Self::ALL.get(i).copied()
    }

    pub fn next(&self) -> RangePreset {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> RangePreset {
        let n = Self::ALL.len();
        Self::ALL[(self.index() + n - 1) % n]
    }
}

impl Default for RangePreset {
    fn default() -> Self {
        RangePreset::Y1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_counts() {
        assert_eq!(RangePreset::M1.label(), "1M");
        assert_eq!(RangePreset::M1.bar_count(), Some(21));
        assert_eq!(RangePreset::M3.bar_count(), Some(63));
        assert_eq!(RangePreset::M6.bar_count(), Some(126));
        assert_eq!(RangePreset::Y1.bar_count(), Some(252));
        assert_eq!(RangePreset::Y2.bar_count(), Some(504));
        assert_eq!(RangePreset::Y5.bar_count(), Some(1260));
        assert_eq!(RangePreset::All.bar_count(), None);
        assert_eq!(RangePreset::All.label(), "ALL");
    }

    #[test]
    fn cycling_wraps() {
        assert_eq!(RangePreset::M1.next(), RangePreset::M3);
        assert_eq!(RangePreset::All.next(), RangePreset::M1);
        assert_eq!(RangePreset::M1.prev(), RangePreset::All);
    }

    #[test]
    fn index_roundtrip() {
        for preset in RangePreset::ALL {
            assert_eq!(RangePreset::from_index(preset.index()), Some(preset));
        }
        assert_eq!(RangePreset::from_index(99), None);
    }
}
