//! Decoding of DevKit board characteristic values into typed readings
//!
//! Each parser takes the raw value of one characteristic, which may be absent
//! when nothing has been read yet, and returns `None` whenever the value is
//! missing, too short, or not valid text. Bytes beyond a field's width are
//! never inspected.

use log::debug;

use crate::bluetooth::bytes::{
    null_terminated_str, read_i16_le, read_i24_le, read_i32_le, read_i8, read_u16_le,
    read_u24_le, read_u32_le, read_u64_le, read_u8, value_debug_string,
};
use crate::models::{Acceleration, LedState, Location};

// Scaling applied by the board firmware before transmission
const TEMPERATURE_DIVISOR: f64 = 100.0; // 100 * °C
const PRESSURE_DIVISOR: f64 = 1000.0; // 1000 * mbar
const ILLUMINANCE_DIVISOR: f64 = 100.0; // 100 * lux
const AMBIENT_IR_DIVISOR: f64 = 10.0; // 10 * W/m²
const ACCELERATION_DIVISOR: f32 = 100.0; // 100 * m/s²
const COORDINATE_DIVISOR: f64 = 10_000_000.0; // 1e7 * degrees
const ELEVATION_DIVISOR: f64 = 100.0; // 100 * meters

// Location and Speed flag bits
const FLAG_SPEED_PRESENT: u16 = 1 << 0;
const FLAG_DISTANCE_PRESENT: u16 = 1 << 1;
const FLAG_LOCATION_PRESENT: u16 = 1 << 2;
const FLAG_ELEVATION_PRESENT: u16 = 1 << 3;

const FLAGS_LEN: usize = 2;
const SPEED_LEN: usize = 2;
const DISTANCE_LEN: usize = 3;
const MIN_LOCATION_LEN: usize = FLAGS_LEN + 4 + 4;

/// Decode temperature in °C
///
/// Transmitted as a signed 16-bit value of 100 * °C. For example
/// `[26, 9]` is `0x091A = 2330`, i.e. 23.30 °C.
pub fn parse_temperature(data: Option<&[u8]>) -> Option<f64> {
    let data = data?;
    let temperature = read_i16_le(data, 0)? as f64 / TEMPERATURE_DIVISOR;
    debug!(
        "Temperature is: {}°C, {}",
        temperature,
        value_debug_string(Some(data))
    );
    Some(temperature)
}

/// Decode air pressure in mbar from an unsigned 32-bit value of 1000 * mbar
pub fn parse_pressure(data: Option<&[u8]>) -> Option<f64> {
    let pressure = read_u32_le(data?, 0)? as f64 / PRESSURE_DIVISOR;
    debug!("Pressure is: {} mbar", pressure);
    Some(pressure)
}

/// Decode visible light level in lux
///
/// The GATT Illuminance characteristic is a 24-bit unsigned value of
/// 100 * lux, so it is widened to 32 bits before scaling.
pub fn parse_illuminance(data: Option<&[u8]>) -> Option<f64> {
    let data = data?;
    let illuminance = read_u24_le(data, 0)? as f64 / ILLUMINANCE_DIVISOR;
    debug!(
        "Visible light level is {} lx, {}",
        illuminance,
        value_debug_string(Some(data))
    );
    Some(illuminance)
}

/// Decode infrared light level in W/m² from an unsigned 16-bit value of 10 * W/m²
pub fn parse_ambient_ir(data: Option<&[u8]>) -> Option<f64> {
    let data = data?;
    let ambient_ir = read_u16_le(data, 0)? as f64 / AMBIENT_IR_DIVISOR;
    debug!(
        "Infrared light level is {} W/m², {}",
        ambient_ir,
        value_debug_string(Some(data))
    );
    Some(ambient_ir)
}

pub fn parse_battery_percentage(data: Option<&[u8]>) -> Option<u8> {
    let percentage = read_u8(data?, 0)?;
    debug!("Battery level is {}%", percentage);
    Some(percentage)
}

/// Decode acceleration on all three axes
///
/// Three signed 16-bit values of 100 * m/s², at offsets 0, 2 and 4 for
/// the x, y and z axes.
pub fn parse_acceleration(data: Option<&[u8]>) -> Option<Acceleration> {
    let data = data?;
    if data.len() < 6 {
        return None;
    }

    let axis = |offset| read_i16_le(data, offset).map(|v| v as f32 / ACCELERATION_DIVISOR);

    Some(Acceleration {
        x: axis(0)?,
        y: axis(2)?,
        z: axis(4)?,
    })
}

/// Decode the Location and Speed characteristic (GATT 0x2A67)
///
/// The value starts with a 16-bit flags field followed by optional fields
/// packed in flag-bit order:
/// - Bit 0: Instantaneous speed present (2 bytes)
/// - Bit 1: Total distance present (3 bytes)
/// - Bit 2: Location present (latitude and longitude, 4 signed bytes each, 1e-7 degrees)
/// - Bit 3: Elevation present (3 signed bytes, 0.01 m)
///
/// Speed and distance are skipped; the board is only located when bit 2 is set.
/// A value that is truncated anywhere inside a flagged field yields `None`.
///
/// # Arguments
/// * `data` - Raw characteristic value
///
/// # Returns
/// Some(Location) if a position is present, None otherwise
pub fn parse_location(data: Option<&[u8]>) -> Option<Location> {
    let data = data?;

    // Flags plus latitude and longitude is the smallest useful record
    if data.len() < MIN_LOCATION_LEN {
        return None;
    }

    let flags = read_u16_le(data, 0)?;
    let speed_present = flags & FLAG_SPEED_PRESENT != 0;
    let distance_present = flags & FLAG_DISTANCE_PRESENT != 0;
    let location_present = flags & FLAG_LOCATION_PRESENT != 0;
    let elevation_present = flags & FLAG_ELEVATION_PRESENT != 0;

    if !location_present {
        debug!(
            "Location data: {} \nFlags: {} - - {:b}",
            value_debug_string(Some(data)),
            flags,
            flags
        );
        return None;
    }

    let mut coordinate_start = FLAGS_LEN;
    if speed_present {
        coordinate_start += SPEED_LEN;
    }
    if distance_present {
        coordinate_start += DISTANCE_LEN;
    }

    let latitude = read_i32_le(data, coordinate_start)? as f64 / COORDINATE_DIVISOR;
    let longitude = read_i32_le(data, coordinate_start + 4)? as f64 / COORDINATE_DIVISOR;

    let elevation = if elevation_present {
        Some(read_i24_le(data, coordinate_start + 8)? as f64 / ELEVATION_DIVISOR)
    } else {
        None
    };

    debug!(
        "Location data: {} \nLat: {}, Long: {}, Elevation: {}, Flags: {} - - {:b}",
        value_debug_string(Some(data)),
        latitude,
        longitude,
        elevation.map_or_else(|| "n/a".to_string(), |e| e.to_string()),
        flags,
        flags
    );

    Some(Location {
        latitude,
        longitude,
        elevation,
    })
}

/// Decode the power source
///
/// Returns `true` if the board runs on battery, `false` if it is plugged in.
pub fn parse_power_source(data: Option<&[u8]>) -> Option<bool> {
    let on_battery = read_u8(data?, 0)? == 1;
    debug!(
        "Power source is: {}",
        if on_battery { "Battery" } else { "Plugged in" }
    );
    Some(on_battery)
}

pub fn parse_debug_log(data: Option<&[u8]>) -> Option<String> {
    // ASCII is a subset of UTF-8, so ASCII logs decode the same way
    null_terminated_str(data?)
}

/// Decode cellular signal strength in dBm (0 means not connected)
pub fn parse_cellular_signal(data: Option<&[u8]>) -> Option<i8> {
    let signal = read_i8(data?, 0)?;
    debug!("Cellular signal: {} dBm", signal);
    Some(signal)
}

/// Decode the modem IMEI, sent as an unsigned 64-bit integer
pub fn parse_cellular_imei(data: Option<&[u8]>) -> Option<String> {
    let imei = read_u64_le(data?, 0)?;
    debug!("Cellular IMEI: {}", imei);
    Some(imei.to_string())
}

/// Decode the name of the connected Wi-Fi network
///
/// An empty name means the network name is not available.
pub fn parse_wifi_name(data: Option<&[u8]>) -> Option<String> {
    let wifi_name = null_terminated_str(data?).filter(|name| !name.is_empty());
    debug!("Wi-fi name: '{}'", wifi_name.as_deref().unwrap_or("n/a"));
    wifi_name
}

/// Decode Wi-Fi signal strength in dBm (0 means not connected)
pub fn parse_wifi_signal(data: Option<&[u8]>) -> Option<i8> {
    let signal = read_i8(data?, 0)?;
    debug!("Wi-fi signal: {} dBm", signal);
    Some(signal)
}

/// Decode the LED and audio buzzer state byte
///
/// Common values:
/// - 0: All off
/// - 1/2/4: Only the red/green/blue channel of the RGB LED on
/// - 8: White LED on
/// - 15: All LEDs on
/// - 16: Buzzer active, all LEDs off
pub fn parse_led(data: Option<&[u8]>) -> Option<LedState> {
    let value = read_u8(data?, 0)?;
    debug!("LED and audio buzzer state: {}", value);
    Some(LedState::from_byte(value))
}

/// Decode the button state, `true` while the button is pressed
pub fn parse_button(data: Option<&[u8]>) -> Option<bool> {
    let value = read_u8(data?, 0)?;
    debug!("Button state: {}", value);
    Some(value == 1)
}
