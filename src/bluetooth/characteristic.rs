//! GATT identifiers exposed by the DevKit board and the decoder lookup table

use log::debug;
use uuid::Uuid;

use crate::bluetooth::bytes::value_debug_string;
use crate::bluetooth::parser;
use crate::models::Reading;

/// Expand a 16-bit Bluetooth SIG assigned number onto the Bluetooth base UUID
pub const fn sig_uuid(short: u16) -> Uuid {
    Uuid::from_u128(0x0000_0000_0000_1000_8000_0080_5f9b_34fb | ((short as u128) << 96))
}

// Standard services
pub const AUTOMATION_IO_SERVICE: Uuid = sig_uuid(0x1815);
pub const BATTERY_SERVICE: Uuid = sig_uuid(0x180F);
pub const ENVIRONMENTAL_SENSING_SERVICE: Uuid = sig_uuid(0x181A);
pub const LOCATION_AND_NAVIGATION_SERVICE: Uuid = sig_uuid(0x1819);

// Vendor services
pub const CELLULAR_SERVICE: Uuid = Uuid::from_u128(0x2618484C_7465_441D_BC3F_35F1AF1C6F16);
pub const DEBUG_SERVICE: Uuid = Uuid::from_u128(0xEB8AEA80_88A7_42E4_BB93_68421259CDFE);
pub const INERTIAL_MEASUREMENT_SERVICE: Uuid =
    Uuid::from_u128(0xA4E649F4_4BE5_11E5_885D_FEFF819CDC9F);
pub const POWER_SOURCE_SERVICE: Uuid = Uuid::from_u128(0xEC61A454_ED00_A5E8_B8F9_DE9EC026EC51);
pub const WIFI_SERVICE: Uuid = Uuid::from_u128(0x75C7E8DF_376A_4171_A096_41D486BB3D72);

const SERVICES: [(Uuid, &str); 9] = [
    (AUTOMATION_IO_SERVICE, "Automation IO"),
    (BATTERY_SERVICE, "Battery"),
    (ENVIRONMENTAL_SENSING_SERVICE, "Environmental Sensing"),
    (LOCATION_AND_NAVIGATION_SERVICE, "Location and Navigation"),
    (CELLULAR_SERVICE, "Cellular"),
    (DEBUG_SERVICE, "Debug"),
    (INERTIAL_MEASUREMENT_SERVICE, "Inertial Measurement"),
    (POWER_SOURCE_SERVICE, "Power Source"),
    (WIFI_SERVICE, "Wi-Fi"),
];

/// Name of a service the board exposes, if it is one we know
pub fn service_name(uuid: &Uuid) -> Option<&'static str> {
    SERVICES
        .iter()
        .find(|(service, _)| service == uuid)
        .map(|(_, name)| *name)
}

/// Every characteristic the board is known to expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    BatteryLevel,
    Pressure,
    Temperature,
    Illuminance,
    LocationAndNavigationFeature,
    LocationAndSpeed,
    /// LED and buzzer state, written by the app
    DigitalToBoard,
    /// Button state, notified by the board
    DigitalFromBoard,
    AmbientInfrared,
    Acceleration,
    PowerSource,
    DebugLog,
    CellularSignal,
    CellularImei,
    WifiName,
    WifiSignal,
}

impl Characteristic {
    pub const ALL: [Characteristic; 16] = [
        Characteristic::BatteryLevel,
        Characteristic::Pressure,
        Characteristic::Temperature,
        Characteristic::Illuminance,
        Characteristic::LocationAndNavigationFeature,
        Characteristic::LocationAndSpeed,
        Characteristic::DigitalToBoard,
        Characteristic::DigitalFromBoard,
        Characteristic::AmbientInfrared,
        Characteristic::Acceleration,
        Characteristic::PowerSource,
        Characteristic::DebugLog,
        Characteristic::CellularSignal,
        Characteristic::CellularImei,
        Characteristic::WifiName,
        Characteristic::WifiSignal,
    ];

    /// Characteristics read on every poll tick
    pub const POLLED: [Characteristic; 11] = [
        Characteristic::Temperature,
        Characteristic::Pressure,
        Characteristic::Illuminance,
        Characteristic::AmbientInfrared,
        Characteristic::PowerSource,
        Characteristic::DebugLog,
        Characteristic::CellularSignal,
        Characteristic::WifiName,
        Characteristic::WifiSignal,
        Characteristic::BatteryLevel,
        Characteristic::LocationAndSpeed,
    ];

    pub const fn uuid(self) -> Uuid {
        match self {
            Characteristic::BatteryLevel => sig_uuid(0x2A19),
            Characteristic::Pressure => sig_uuid(0x2A6D),
            Characteristic::Temperature => sig_uuid(0x2A6E),
            Characteristic::Illuminance => sig_uuid(0x2AFB),
            Characteristic::LocationAndNavigationFeature => sig_uuid(0x2A6A),
            Characteristic::LocationAndSpeed => sig_uuid(0x2A67),
            Characteristic::DigitalToBoard => sig_uuid(0x2A56),
            Characteristic::DigitalFromBoard => sig_uuid(0x2A57),
            Characteristic::AmbientInfrared => {
                Uuid::from_u128(0xEEDC804D_AF50_4488_942E_B4E9043F1687)
            }
            Characteristic::Acceleration => {
                Uuid::from_u128(0xC4C1F6E2_4BE5_11E5_885D_FEFF819CDC9F)
            }
            Characteristic::PowerSource => Uuid::from_u128(0xEC61A454_ED01_A5E8_88F9_DE9EC026EC51),
            Characteristic::DebugLog => Uuid::from_u128(0xD3BEC995_37F9_4FEE_97C0_6F494A95530D),
            Characteristic::CellularSignal => {
                Uuid::from_u128(0xE3B403A4_E97D_4401_8D09_87B6AF705298)
            }
            Characteristic::CellularImei => {
                Uuid::from_u128(0x02D93BC0_46DA_4444_9527_A063F082023B)
            }
            Characteristic::WifiName => Uuid::from_u128(0x2618484D_7465_BC3F_B8F9_35F1AF1C6F16),
            Characteristic::WifiSignal => Uuid::from_u128(0x5ED074FA_7205_4395_A95C_2223928BDC64),
        }
    }

    pub fn from_uuid(uuid: &Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.uuid() == *uuid)
    }

    pub fn name(self) -> &'static str {
        match self {
            Characteristic::BatteryLevel => "Battery Level",
            Characteristic::Pressure => "Pressure",
            Characteristic::Temperature => "Temperature",
            Characteristic::Illuminance => "Illuminance",
            Characteristic::LocationAndNavigationFeature => "LN Feature",
            Characteristic::LocationAndSpeed => "Location and Speed",
            Characteristic::DigitalToBoard => "Digital (LED/buzzer)",
            Characteristic::DigitalFromBoard => "Digital (button)",
            Characteristic::AmbientInfrared => "Ambient Infrared",
            Characteristic::Acceleration => "Acceleration",
            Characteristic::PowerSource => "Power Source",
            Characteristic::DebugLog => "Debug Log",
            Characteristic::CellularSignal => "Cellular Signal",
            Characteristic::CellularImei => "Cellular IMEI",
            Characteristic::WifiName => "Wi-Fi Name",
            Characteristic::WifiSignal => "Wi-Fi Signal",
        }
    }
}

/// Maps a raw characteristic value to a reading
pub type Decoder = fn(Option<&[u8]>) -> Option<Reading>;

static DECODERS: [(Characteristic, Decoder); 15] = [
    (Characteristic::Temperature, |d| {
        parser::parse_temperature(d).map(Reading::Temperature)
    }),
    (Characteristic::Pressure, |d| {
        parser::parse_pressure(d).map(Reading::Pressure)
    }),
    (Characteristic::Illuminance, |d| {
        parser::parse_illuminance(d).map(Reading::Illuminance)
    }),
    (Characteristic::AmbientInfrared, |d| {
        parser::parse_ambient_ir(d).map(Reading::AmbientInfrared)
    }),
    (Characteristic::LocationAndSpeed, |d| {
        parser::parse_location(d).map(Reading::Location)
    }),
    (Characteristic::BatteryLevel, |d| {
        parser::parse_battery_percentage(d).map(Reading::BatteryPercentage)
    }),
    (Characteristic::Acceleration, |d| {
        parser::parse_acceleration(d).map(Reading::Acceleration)
    }),
    (Characteristic::PowerSource, |d| {
        parser::parse_power_source(d).map(Reading::OnBattery)
    }),
    (Characteristic::DebugLog, |d| {
        parser::parse_debug_log(d).map(Reading::DebugLog)
    }),
    (Characteristic::CellularSignal, |d| {
        parser::parse_cellular_signal(d).map(Reading::CellularSignal)
    }),
    (Characteristic::CellularImei, |d| {
        parser::parse_cellular_imei(d).map(Reading::CellularImei)
    }),
    (Characteristic::WifiName, |d| {
        parser::parse_wifi_name(d).map(Reading::WifiName)
    }),
    (Characteristic::WifiSignal, |d| {
        parser::parse_wifi_signal(d).map(Reading::WifiSignal)
    }),
    (Characteristic::DigitalToBoard, |d| {
        parser::parse_led(d).map(Reading::Led)
    }),
    (Characteristic::DigitalFromBoard, |d| {
        parser::parse_button(d).map(Reading::ButtonPressed)
    }),
];

/// Look up the decoder registered for a characteristic identifier
pub fn decoder_for(uuid: &Uuid) -> Option<Decoder> {
    DECODERS
        .iter()
        .find(|(characteristic, _)| characteristic.uuid() == *uuid)
        .map(|(_, decoder)| *decoder)
}

/// Decode a value read from (or notified by) the characteristic `uuid`
///
/// Values from characteristics without a decoder are logged and dropped.
pub fn decode(uuid: &Uuid, data: Option<&[u8]>) -> Option<Reading> {
    match decoder_for(uuid) {
        Some(decoder) => decoder(data),
        None => {
            let name = Characteristic::from_uuid(uuid).map_or("unhandled", Characteristic::name);
            debug!(
                "Did read a value from {} characteristic {}: {}",
                name,
                uuid,
                value_debug_string(data)
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LedState;

    #[test]
    fn sig_uuids_use_bluetooth_base() {
        assert_eq!(
            sig_uuid(0x2A6E).to_string(),
            "00002a6e-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            BATTERY_SERVICE.to_string(),
            "0000180f-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn known_services_are_named() {
        assert_eq!(service_name(&sig_uuid(0x181A)), Some("Environmental Sensing"));
        assert_eq!(service_name(&INERTIAL_MEASUREMENT_SERVICE), Some("Inertial Measurement"));
        assert_eq!(service_name(&Characteristic::Temperature.uuid()), None);
    }

    #[test]
    fn vendor_uuids_match_board_firmware() {
        assert_eq!(
            Characteristic::WifiName.uuid().to_string(),
            "2618484d-7465-bc3f-b8f9-35f1af1c6f16"
        );
        assert_eq!(
            Characteristic::PowerSource.uuid().to_string(),
            "ec61a454-ed01-a5e8-88f9-de9ec026ec51"
        );
    }

    #[test]
    fn identifiers_are_unique_and_round_trip() {
        for characteristic in Characteristic::ALL {
            assert_eq!(
                Characteristic::from_uuid(&characteristic.uuid()),
                Some(characteristic)
            );
        }
        assert_eq!(Characteristic::from_uuid(&CELLULAR_SERVICE), None);
    }

    #[test]
    fn every_decodable_characteristic_has_one_decoder() {
        for characteristic in Characteristic::ALL {
            let registered = DECODERS
                .iter()
                .filter(|(c, _)| *c == characteristic)
                .count();
            let expected = usize::from(characteristic != Characteristic::LocationAndNavigationFeature);
            assert_eq!(registered, expected, "{}", characteristic.name());
        }
    }

    #[test]
    fn decode_dispatches_by_identifier() {
        assert_eq!(
            decode(&Characteristic::Temperature.uuid(), Some(&[26, 9])),
            Some(Reading::Temperature(23.30))
        );
        assert_eq!(
            decode(&Characteristic::DigitalToBoard.uuid(), Some(&[9])),
            Some(Reading::Led(LedState::from_byte(9)))
        );
        assert_eq!(
            decode(&Characteristic::DigitalFromBoard.uuid(), Some(&[1])),
            Some(Reading::ButtonPressed(true))
        );
    }

    #[test]
    fn decode_drops_unknown_and_short_values() {
        assert_eq!(decode(&Characteristic::Temperature.uuid(), Some(&[26])), None);
        assert_eq!(
            decode(&Characteristic::LocationAndNavigationFeature.uuid(), Some(&[1, 2])),
            None
        );
        assert_eq!(decode(&DEBUG_SERVICE, Some(&[1])), None);
        assert_eq!(decode(&Uuid::nil(), None), None);
    }
}
