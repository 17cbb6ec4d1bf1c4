//! Utilization → color category.

/// Exactly this value is idle.
pub const IDLE: u64 = 0;
/// First value classified as medium.
pub const MEDIUM_FROM: u64 = 50;
/// First value classified as high.
pub const HIGH_FROM: u64 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadLevel {
    Idle,
    Low,
    Medium,
    High,
}

impl LoadLevel {
    pub fn classify(percent: u64) -> Self {
        if percent == IDLE {
            Self::Idle
        } else if percent >= HIGH_FROM {
            Self::High
        } else if percent >= MEDIUM_FROM {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Integer made of the leading ASCII digits: `"45%"` → 45, `"12.7%"` → 12, `"x"` → None.
pub fn leading_number(value: &str) -> Option<u64> {
    let trimmed = value.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}
