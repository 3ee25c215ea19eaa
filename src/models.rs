//! Typed values decoded from the board's GATT characteristics

use time::OffsetDateTime;

/// Acceleration on the three axes, in m/s²
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Position reported by the Location and Speed characteristic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Degrees, positive north
    pub latitude: f64,
    /// Degrees, positive east
    pub longitude: f64,
    /// Meters, only present when the board flags it
    pub elevation: Option<f64>,
}

/// State of the RGB and white LEDs plus the audio buzzer
///
/// Travels as a single byte with one bit per output:
/// - Bit 0: Red LED
/// - Bit 1: Green LED
/// - Bit 2: Blue LED
/// - Bit 3: White LED
/// - Bit 4: Buzzer
///
/// Bits 5-7 carry no meaning and are ignored when decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedState {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub white: bool,
    pub buzzer: bool,
}

impl LedState {
    pub const RED: u8 = 1 << 0;
    pub const GREEN: u8 = 1 << 1;
    pub const BLUE: u8 = 1 << 2;
    pub const WHITE: u8 = 1 << 3;
    pub const BUZZER: u8 = 1 << 4;

    pub fn from_byte(value: u8) -> Self {
        LedState {
            red: value & Self::RED != 0,
            green: value & Self::GREEN != 0,
            blue: value & Self::BLUE != 0,
            white: value & Self::WHITE != 0,
            buzzer: value & Self::BUZZER != 0,
        }
    }

    /// Encode the state as the byte written to the Digital characteristic
    pub fn to_byte(self) -> u8 {
        [
            (self.red, Self::RED),
            (self.green, Self::GREEN),
            (self.blue, Self::BLUE),
            (self.white, Self::WHITE),
            (self.buzzer, Self::BUZZER),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .fold(0u8, |acc, (_, bit)| acc | bit)
    }

    /// True if any of the four LEDs is lit (the buzzer does not count)
    pub fn any_led_on(&self) -> bool {
        self.red || self.green || self.blue || self.white
    }
}

/// One decoded characteristic value, tagged with what it measures
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// °C
    Temperature(f64),
    /// mbar
    Pressure(f64),
    /// lux
    Illuminance(f64),
    /// W/m²
    AmbientInfrared(f64),
    BatteryPercentage(u8),
    Acceleration(Acceleration),
    Location(Location),
    /// `true` when running on battery, `false` when plugged in
    OnBattery(bool),
    DebugLog(String),
    /// dBm, 0 means not connected
    CellularSignal(i8),
    CellularImei(String),
    WifiName(String),
    /// dBm, 0 means not connected
    WifiSignal(i8),
    Led(LedState),
    ButtonPressed(bool),
}

/// A single stored history value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub value: f64,
    pub timestamp: OffsetDateTime,
}

/// Whether a location fix is known for the board
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum BoardLocation {
    #[default]
    Undetermined,
    Located {
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
        timestamp: OffsetDateTime,
    },
}

impl BoardLocation {
    /// Latitude and longitude, if located
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match self {
            BoardLocation::Located {
                latitude,
                longitude,
                ..
            } => Some((*latitude, *longitude)),
            BoardLocation::Undetermined => None,
        }
    }
}
