use serde::{Deserialize, Serialize};

/// Share of stored results that landed in one quadrant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStatistics {
    /// Rounded to the nearest whole percent, halves rounding up.
    pub percentage: u8,
    pub total: u64,
    pub type_count: u64,
}

impl TypeStatistics {
    pub fn compute(type_count: u64, total: u64) -> Self {
        if total == 0 {
            return Self::default();
        }
        let type_count = type_count.min(total);
        let scaled = (u128::from(type_count) * 200 + u128::from(total)) / (u128::from(total) * 2);
        Self {
            percentage: u8::try_from(scaled).unwrap_or(100),
            total,
            type_count,
        }
    }
}
