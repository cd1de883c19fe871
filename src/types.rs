// src/types.rs
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;

/// Pressure channels of the sensor log. CH5 carries the trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorChannel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
    Ch5,
}

/// Channels that get aligned and plotted, in display order.
pub const TRACKED_CHANNELS: [SensorChannel; 4] = [
    SensorChannel::Ch1,
    SensorChannel::Ch2,
    SensorChannel::Ch3,
    SensorChannel::Ch4,
];

impl SensorChannel {
    pub fn label(self) -> &'static str {
        match self {
            SensorChannel::Ch1 => "CH1",
            SensorChannel::Ch2 => "CH2",
            SensorChannel::Ch3 => "CH3",
            SensorChannel::Ch4 => "CH4",
            SensorChannel::Ch5 => "CH5",
        }
    }

    /// Fixed trace colour (blue / green / red / purple), identical in every shell.
    pub fn color_rgb(self) -> [u8; 3] {
        match self {
            SensorChannel::Ch1 => [0, 0, 255],
            SensorChannel::Ch2 => [0, 128, 0],
            SensorChannel::Ch3 => [255, 0, 0],
            SensorChannel::Ch4 => [128, 0, 128],
            SensorChannel::Ch5 => [96, 96, 96],
        }
    }
}

/// Operator phase offsets, in degrees of one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetConfiguration {
    pub global: u16,
    pub ch1: u16,
    pub ch2: u16,
    pub ch3: u16,
    pub ch4: u16,
}

impl Default for OffsetConfiguration {
    fn default() -> Self {
        Self {
            global: 165,
            ch1: 90,
            ch2: 270,
            ch3: 0,
            ch4: 180,
        }
    }
}

impl OffsetConfiguration {
    pub const MAX_DEGREES: u16 = 360;

    /// All-zero offsets; alignment becomes the identity.
    pub fn zero() -> Self {
        Self {
            global: 0,
            ch1: 0,
            ch2: 0,
            ch3: 0,
            ch4: 0,
        }
    }

    /// Per-channel offset. The trigger channel is never shifted on its own.
    pub fn channel(&self, channel: SensorChannel) -> u16 {
        match channel {
            SensorChannel::Ch1 => self.ch1,
            SensorChannel::Ch2 => self.ch2,
            SensorChannel::Ch3 => self.ch3,
            SensorChannel::Ch4 => self.ch4,
            SensorChannel::Ch5 => 0,
        }
    }

    pub fn channel_mut(&mut self, channel: SensorChannel) -> Option<&mut u16> {
        match channel {
            SensorChannel::Ch1 => Some(&mut self.ch1),
            SensorChannel::Ch2 => Some(&mut self.ch2),
            SensorChannel::Ch3 => Some(&mut self.ch3),
            SensorChannel::Ch4 => Some(&mut self.ch4),
            SensorChannel::Ch5 => None,
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let named = [
            ("global", self.global),
            ("CH1", self.ch1),
            ("CH2", self.ch2),
            ("CH3", self.ch3),
            ("CH4", self.ch4),
        ];
        for (label, degrees) in named {
            if degrees > Self::MAX_DEGREES {
                return Err(AnalysisError::OffsetOutOfRange { label, degrees });
            }
        }
        Ok(())
    }
}
