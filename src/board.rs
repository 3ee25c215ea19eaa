//! State of the connected DevKit board, owned by the monitoring session
//!
//! Every decoded reading is applied here. When no board is connected all
//! values are cleared, so the formatted accessors fall back to placeholders
//! instead of stale or zero values.

use log::info;
use time::OffsetDateTime;

use crate::history::DataHistory;
use crate::models::{Acceleration, BoardLocation, LedState, Reading};

const PLACEHOLDER: &str = "-";
const NOT_CONNECTED: &str = "Not Connected";

#[derive(Debug, Clone)]
pub struct Board {
    sensor_cache_size: usize,

    pub name: String,
    pub imei: Option<String>,
    is_connected: bool,

    pub is_on_battery: Option<bool>,
    pub battery_percentage: Option<u8>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub ambient_visible_light: Option<f64>,
    pub ambient_infrared_light: Option<f64>,

    pub button_pressed: bool,
    pub leds: LedState,
    pub acceleration: Acceleration,
    pub location: BoardLocation,

    pub cell_signal_strength: Option<i8>,
    pub wifi_name: Option<String>,
    pub wifi_signal_strength: Option<i8>,

    pub temperature_history: DataHistory,
    pub pressure_history: DataHistory,
    pub ambient_visible_light_history: DataHistory,
    pub ambient_infrared_light_history: DataHistory,
    pub acceleration_history_x: DataHistory,
    pub acceleration_history_y: DataHistory,
    pub acceleration_history_z: DataHistory,
}

impl Board {
    pub fn new(sensor_cache_size: usize) -> Self {
        Board {
            sensor_cache_size,
            name: String::new(),
            imei: None,
            is_connected: false,
            is_on_battery: None,
            battery_percentage: None,
            temperature: None,
            pressure: None,
            ambient_visible_light: None,
            ambient_infrared_light: None,
            button_pressed: false,
            leds: LedState::default(),
            acceleration: Acceleration::default(),
            location: BoardLocation::Undetermined,
            cell_signal_strength: None,
            wifi_name: None,
            wifi_signal_strength: None,
            temperature_history: DataHistory::new(sensor_cache_size),
            pressure_history: DataHistory::new(sensor_cache_size),
            ambient_visible_light_history: DataHistory::new(sensor_cache_size),
            ambient_infrared_light_history: DataHistory::new(sensor_cache_size),
            acceleration_history_x: DataHistory::new(sensor_cache_size),
            acceleration_history_y: DataHistory::new(sensor_cache_size),
            acceleration_history_z: DataHistory::new(sensor_cache_size),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Record a connection or disconnection
    ///
    /// Stored values and histories are reset on both edges.
    pub fn set_connected(&mut self, connected: bool) {
        self.is_connected = connected;
        self.reset_values();
    }

    /// Store a decoded reading and extend the matching history
    pub fn apply(&mut self, reading: Reading) {
        match reading {
            Reading::Temperature(value) => {
                self.temperature = Some(value);
                self.temperature_history.append(value);
            }
            Reading::Pressure(value) => {
                self.pressure = Some(value);
                self.pressure_history.append(value);
            }
            Reading::Illuminance(value) => {
                self.ambient_visible_light = Some(value);
                self.ambient_visible_light_history.append(value);
            }
            Reading::AmbientInfrared(value) => {
                self.ambient_infrared_light = Some(value);
                self.ambient_infrared_light_history.append(value);
            }
            Reading::BatteryPercentage(value) => self.battery_percentage = Some(value),
            Reading::Acceleration(value) => {
                self.acceleration = value;
                self.acceleration_history_x.append(value.x as f64);
                self.acceleration_history_y.append(value.y as f64);
                self.acceleration_history_z.append(value.z as f64);
            }
            Reading::Location(location) => {
                self.location = BoardLocation::Located {
                    latitude: location.latitude,
                    longitude: location.longitude,
                    elevation: location.elevation,
                    timestamp: OffsetDateTime::now_utc(),
                };
            }
            Reading::OnBattery(value) => self.is_on_battery = Some(value),
            Reading::DebugLog(message) => {
                if !message.is_empty() {
                    info!(target: "board", "{}", message);
                }
            }
            Reading::CellularSignal(value) => self.cell_signal_strength = Some(value),
            Reading::CellularImei(value) => self.imei = Some(value),
            Reading::WifiName(value) => self.wifi_name = Some(value),
            Reading::WifiSignal(value) => self.wifi_signal_strength = Some(value),
            Reading::Led(state) => self.leds = state,
            Reading::ButtonPressed(pressed) => self.button_pressed = pressed,
        }
    }

    /// Record the desired LED and buzzer state and return the byte to write
    pub fn set_led(&mut self, state: LedState) -> u8 {
        self.leds = state;
        state.to_byte()
    }

    /// A signal strength of 0 means the board has no Wi-Fi connection
    pub fn is_wifi_connected(&self) -> bool {
        matches!(self.wifi_signal_strength, Some(s) if s != 0)
    }

    /// A signal strength of 0 means the board has no cellular connection
    pub fn is_cell_network_connected(&self) -> bool {
        matches!(self.cell_signal_strength, Some(s) if s != 0)
    }

    // Formatted values for presentation

    pub fn formatted_name(&self) -> String {
        if self.is_connected {
            self.name.clone()
        } else {
            NOT_CONNECTED.to_string()
        }
    }

    pub fn formatted_imei(&self) -> String {
        self.imei.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn formatted_battery_level(&self) -> String {
        format_or_placeholder(self.battery_percentage, |p| format!("{}%", p))
    }

    pub fn formatted_temperature(&self) -> String {
        format_or_placeholder(self.temperature, |t| format!("{:.0}ºC", t))
    }

    pub fn formatted_pressure(&self) -> String {
        format_or_placeholder(self.pressure, |p| format!("{:.0} mbar", p))
    }

    pub fn formatted_ambient_visible_light(&self) -> String {
        format_or_placeholder(self.ambient_visible_light, |l| format!("{:.0} lx", l))
    }

    pub fn formatted_ambient_infrared_light(&self) -> String {
        format_or_placeholder(self.ambient_infrared_light, |ir| format!("{:.0} W/m²", ir))
    }

    pub fn formatted_light_status(&self) -> String {
        if !self.is_connected {
            return PLACEHOLDER.to_string();
        }
        if self.leds.any_led_on() {
            "LED on".to_string()
        } else {
            "LED off".to_string()
        }
    }

    pub fn formatted_ac_status(&self) -> String {
        format_or_placeholder(self.is_on_battery, |on_battery| {
            if on_battery {
                "Not plugged in".to_string()
            } else {
                "Plugged in".to_string()
            }
        })
    }

    pub fn formatted_wifi_name(&self) -> String {
        match &self.wifi_name {
            Some(name) if self.is_wifi_connected() => name.clone(),
            // Connected over BLE, but not to a Wi-Fi network
            _ if self.is_connected => NOT_CONNECTED.to_string(),
            _ => PLACEHOLDER.to_string(),
        }
    }

    /// Shown next to the Wi-Fi name, e.g. `My network (-55 dBm)`
    pub fn formatted_wifi_signal_strength(&self) -> String {
        match self.wifi_signal_strength {
            Some(strength) if strength != 0 => format!("({} dBm)", strength),
            _ => String::new(),
        }
    }

    pub fn formatted_cell_signal_strength(&self) -> String {
        format_or_placeholder(self.cell_signal_strength, |s| format!("{} dBm", s))
    }

    fn reset_values(&mut self) {
        let size = self.sensor_cache_size;

        self.imei = None;
        self.is_on_battery = None;
        self.battery_percentage = None;
        self.temperature = None;
        self.pressure = None;
        self.ambient_visible_light = None;
        self.ambient_infrared_light = None;
        self.button_pressed = false;
        self.leds = LedState::default();
        self.acceleration = Acceleration::default();
        self.location = BoardLocation::Undetermined;
        self.cell_signal_strength = None;
        self.wifi_name = None;
        self.wifi_signal_strength = None;

        for history in [
            &mut self.temperature_history,
            &mut self.pressure_history,
            &mut self.ambient_visible_light_history,
            &mut self.ambient_infrared_light_history,
            &mut self.acceleration_history_x,
            &mut self.acceleration_history_y,
            &mut self.acceleration_history_z,
        ] {
            history.reset(size);
        }
    }
}

fn format_or_placeholder<T>(value: Option<T>, format: impl FnOnce(T) -> String) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn connected_board() -> Board {
        let mut board = Board::new(60);
        board.name = "DevEdge-01".to_string();
        board.set_connected(true);
        board
    }

    #[test]
    fn disconnected_board_shows_placeholders() {
        let board = Board::new(60);
        assert_eq!(board.formatted_name(), "Not Connected");
        assert_eq!(board.formatted_battery_level(), "-");
        assert_eq!(board.formatted_temperature(), "-");
        assert_eq!(board.formatted_pressure(), "-");
        assert_eq!(board.formatted_ambient_visible_light(), "-");
        assert_eq!(board.formatted_ambient_infrared_light(), "-");
        assert_eq!(board.formatted_light_status(), "-");
        assert_eq!(board.formatted_ac_status(), "-");
        assert_eq!(board.formatted_wifi_name(), "-");
        assert_eq!(board.formatted_wifi_signal_strength(), "");
        assert_eq!(board.formatted_cell_signal_strength(), "-");
        assert_eq!(board.formatted_imei(), "-");
    }

    #[test]
    fn readings_are_formatted() {
        let mut board = connected_board();
        board.apply(Reading::Temperature(23.3));
        board.apply(Reading::Pressure(1013.25));
        board.apply(Reading::Illuminance(655.36));
        board.apply(Reading::AmbientInfrared(12.0));
        board.apply(Reading::BatteryPercentage(87));
        board.apply(Reading::OnBattery(true));
        board.apply(Reading::CellularSignal(-75));
        board.apply(Reading::CellularImei("123456789012345".to_string()));

        assert_eq!(board.formatted_name(), "DevEdge-01");
        assert_eq!(board.formatted_temperature(), "23ºC");
        assert_eq!(board.formatted_pressure(), "1013 mbar");
        assert_eq!(board.formatted_ambient_visible_light(), "655 lx");
        assert_eq!(board.formatted_ambient_infrared_light(), "12 W/m²");
        assert_eq!(board.formatted_battery_level(), "87%");
        assert_eq!(board.formatted_ac_status(), "Not plugged in");
        assert_eq!(board.formatted_cell_signal_strength(), "-75 dBm");
        assert_eq!(board.formatted_imei(), "123456789012345");
        assert!(board.is_cell_network_connected());
    }

    #[test]
    fn wifi_name_depends_on_signal() {
        let mut board = connected_board();
        board.apply(Reading::WifiName("Home".to_string()));
        assert_eq!(board.formatted_wifi_name(), "Not Connected");

        board.apply(Reading::WifiSignal(0));
        assert!(!board.is_wifi_connected());
        assert_eq!(board.formatted_wifi_name(), "Not Connected");
        assert_eq!(board.formatted_wifi_signal_strength(), "");

        board.apply(Reading::WifiSignal(-55));
        assert_eq!(board.formatted_wifi_name(), "Home");
        assert_eq!(board.formatted_wifi_signal_strength(), "(-55 dBm)");
    }

    #[test]
    fn led_status_ignores_buzzer() {
        let mut board = connected_board();
        assert_eq!(board.formatted_light_status(), "LED off");
        board.apply(Reading::Led(LedState::from_byte(LedState::BUZZER)));
        assert_eq!(board.formatted_light_status(), "LED off");
        assert_eq!(board.set_led(LedState::from_byte(LedState::RED | LedState::WHITE)), 9);
        assert_eq!(board.formatted_light_status(), "LED on");
    }

    #[test]
    fn readings_extend_histories() {
        let mut board = connected_board();
        board.apply(Reading::Temperature(20.0));
        board.apply(Reading::Temperature(21.0));
        board.apply(Reading::Acceleration(Acceleration {
            x: 1.0,
            y: -2.0,
            z: 9.5,
        }));
        assert_eq!(board.temperature_history.values(), vec![20.0, 21.0]);
        assert_eq!(board.acceleration_history_y.values(), vec![-2.0]);
        assert_eq!(board.acceleration_history_z.values(), vec![9.5]);
        assert!(board.pressure_history.is_empty());
    }

    #[test]
    fn location_reading_locates_board() {
        let mut board = connected_board();
        board.apply(Reading::Location(Location {
            latitude: 47.606649,
            longitude: -122.3325242,
            elevation: Some(10.66),
        }));
        assert_eq!(board.location.coordinate(), Some((47.606649, -122.3325242)));
    }

    #[test]
    fn reconnect_resets_everything() {
        let mut board = connected_board();
        board.apply(Reading::Temperature(20.0));
        board.apply(Reading::WifiSignal(-40));
        board.apply(Reading::ButtonPressed(true));
        board.apply(Reading::Location(Location {
            latitude: 1.0,
            longitude: 2.0,
            elevation: None,
        }));

        board.set_connected(false);
        assert!(!board.is_connected());
        assert_eq!(board.temperature, None);
        assert!(board.temperature_history.is_empty());
        assert_eq!(board.wifi_signal_strength, None);
        assert!(!board.button_pressed);
        assert_eq!(board.location, BoardLocation::Undetermined);
        assert_eq!(board.formatted_temperature(), "-");
    }
}
