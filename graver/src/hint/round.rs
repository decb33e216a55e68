//! Rounding state.

use super::math;

/// Rounding strategies selectable by the round state instructions.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub enum RoundMode {
    /// Round to the closest grid line (`RTG`).
    #[default]
    Grid,
    /// Round to the nearest half grid line (`RTHG`).
    HalfGrid,
    /// Round to the closest half or integer pixel (`RTDG`).
    DoubleGrid,
    /// Round down to the grid (`RDTG`).
    DownToGrid,
    /// Round up to the grid (`RUTG`).
    UpToGrid,
    /// Rounding off (`ROFF`).
    Off,
    /// Custom period/phase/threshold (`SROUND`).
    Super,
    /// Like `Super` with a sqrt(2)/2 pixel grid period (`S45ROUND`).
    Super45,
}

/// The active rounding mode with the super-round parameters.
#[derive(Copy, Clone, Debug)]
pub struct RoundState {
    pub mode: RoundMode,
    pub threshold: i32,
    pub phase: i32,
    pub period: i32,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            mode: RoundMode::Grid,
            threshold: 0,
            phase: 0,
            period: 64,
        }
    }
}

impl RoundState {
    /// Rounds a 26.6 distance. Every mode preserves the sign of the
    /// input: positive distances never round below zero and negative
    /// ones never above.
    pub fn round(&self, distance: i32) -> i32 {
        use RoundMode::*;
        match self.mode {
            Off => distance,
            Grid => {
                if distance >= 0 {
                    math::round(distance).max(0)
                } else {
                    (-math::round(-distance)).min(0)
                }
            }
            HalfGrid => {
                if distance >= 0 {
                    (math::floor(distance) + 32).max(0)
                } else {
                    (-(math::floor(-distance) + 32)).min(0)
                }
            }
            DoubleGrid => {
                if distance >= 0 {
                    math::round_pad(distance, 32).max(0)
                } else {
                    (-math::round_pad(-distance, 32)).min(0)
                }
            }
            DownToGrid => {
                if distance >= 0 {
                    math::floor(distance).max(0)
                } else {
                    (-math::floor(-distance)).min(0)
                }
            }
            UpToGrid => {
                if distance >= 0 {
                    math::ceil(distance).max(0)
                } else {
                    (-math::ceil(-distance)).min(0)
                }
            }
            Super => {
                if distance >= 0 {
                    let value =
                        ((distance + (self.threshold - self.phase)) & -self.period) + self.phase;
                    if value < 0 {
                        self.phase
                    } else {
                        value
                    }
                } else {
                    let value =
                        -(((self.threshold - self.phase) - distance) & -self.period) - self.phase;
                    if value > 0 {
                        -self.phase
                    } else {
                        value
                    }
                }
            }
            // The 45 degree period is not a power of two, so the
            // masking trick is replaced by a division.
            Super45 => {
                if distance >= 0 {
                    let value = ((distance + (self.threshold - self.phase)) / self.period)
                        * self.period
                        + self.phase;
                    if value < 0 {
                        self.phase
                    } else {
                        value
                    }
                } else {
                    let value = -((((self.threshold - self.phase) - distance) / self.period)
                        * self.period)
                        - self.phase;
                    if value > 0 {
                        -self.phase
                    } else {
                        value
                    }
                }
            }
        }
    }
}
