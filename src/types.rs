use crate::codec::{self, get_field, set_field};
use crate::hw_def::*;

use core::fmt;

#[cfg(feature="defmt")]
use defmt::Format;

/// All possible errors in this crate
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// I²C communication error
    I2c(E),
    /// Address outside of the range accepted by [`Config::address_range`]
    AddressInvalid(u8),
    /// The device did not acknowledge the connection probe
    ConnectionFailed,
    /// A measurement was requested before the minimum read interval elapsed
    TooSoon,
    /// Alert threshold outside of the physical range of the sensor
    OutOfRange(OutOfRange),
    /// The device returned fewer bytes than requested
    ShortRead,
    /// Invalid input data provided
    InvalidInputData,
}
impl<E> From<OutOfRange> for Error<E> {
    fn from(which: OutOfRange) -> Self {
        Error::OutOfRange(which)
    }
}

/// Which alert threshold failed validation
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutOfRange {
    /// temperature outside -40..=125 °C
    Temperature,
    /// humidity outside 0..=100 %RH
    Humidity,
}

/// Monotonic millisecond counter
///
/// Only differences between two readings are used, so the counter may start anywhere and is
/// allowed to wrap.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed starting point
    fn now_ms(&mut self) -> u32;
}
impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_ms(&mut self) -> u32 {
        (**self).now_ms()
    }
}

/// Inclusive window of I²C addresses accepted by [`crate::Cht8305::connect`]
///
/// Two windows are in circulation for this part, so neither is hard-coded.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AddressRange {
    /// lowest accepted address
    pub first: u8,
    /// highest accepted address
    pub last: u8,
}
impl AddressRange {
    /// 0x40..=0x43, selected with the AD0 pin
    pub const AD0_PIN: Self = Self { first: 0x40, last: 0x43 };
    /// 0x50..=0x57
    pub const EXTENDED: Self = Self { first: 0x50, last: 0x57 };

    /// Check whether `address` lies in the window
    pub fn contains(&self, address: u8) -> bool {
        (self.first..=self.last).contains(&address)
    }
}
impl Default for AddressRange {
    fn default() -> Self {
        Self::AD0_PIN
    }
}

/// Driver settings
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// addresses accepted by `connect`
    pub address_range: AddressRange,
    /// wait between selecting a register and reading it back
    pub read_delay_ms: u32,
    /// minimum time between two calls to `read`
    pub min_read_interval_ms: u32,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            address_range: AddressRange::default(),
            read_delay_ms: LEGACY_READ_DELAY_MS,
            min_read_interval_ms: MIN_READ_INTERVAL_MS,
        }
    }
}

/// Connection state of the driver
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// `connect` has not succeeded yet
    Uninitialized,
    /// the last `connect` succeeded and no transaction has failed since
    Connected,
    /// a bus transaction failed; call `connect` again to recover
    Disconnected,
}

/// Raw (still in u16 format) temperature and relative humidity from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RawTempAndRelHumid {
    /// unprocessed temperature
    pub temperature: u16,
    /// unprocessed relative humidity
    pub humidity: u16,
}
impl RawTempAndRelHumid {
    /// Split the combined 4-byte measurement read
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self {
            temperature: u16::from_be_bytes([bytes[0], bytes[1]]),
            humidity: u16::from_be_bytes([bytes[2], bytes[3]]),
        }
    }
    /// Get temperature in Centigrade
    pub fn centigrade(&self) -> f32 {
        codec::decode_temperature(self.temperature)
    }
    /// Get relative humidity in percent
    pub fn humidity_percent(&self) -> f32 {
        codec::decode_humidity(self.humidity)
    }
}

/// Temperature and relative humidity after conversion and offset correction
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempAndRelHumid {
    /// degrees centigrade
    pub centigrade: f32,
    /// degrees fahrenheit
    pub fahrenheit: f32,
    /// relative humidity in percent
    pub humidity_percent: f32,
}
impl TempAndRelHumid {
    pub(crate) fn new(centigrade: f32, humidity_percent: f32) -> Self {
        Self {
            centigrade,
            fahrenheit: centigrade * 1.8 + 32.0,
            humidity_percent,
        }
    }
}

/// Alert thresholds read back from the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlertLevels {
    /// temperature threshold in degrees centigrade
    pub centigrade: f32,
    /// humidity threshold in percent
    pub humidity_percent: f32,
}
impl From<u16> for AlertLevels {
    fn from(raw: u16) -> Self {
        Self {
            centigrade: codec::decode_alert_temperature(raw),
            humidity_percent: codec::decode_alert_humidity(raw),
        }
    }
}

/// Which channels are converted per measurement
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MeasurementMode {
    /// temperature or humidity, one at a time
    Single = 0,
    /// temperature and humidity in sequence
    Both = 1,
}

/// Temperature conversion resolution
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TemperatureResolution {
    /// 14 bit
    Bits14 = 0,
    /// 11 bit
    Bits11 = 1,
}

/// Humidity conversion resolution
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HumidityResolution {
    /// 14 bit
    Bits14 = 0b00,
    /// 11 bit
    Bits11 = 0b01,
    /// 8 bit
    Bits8 = 0b10,
    /// undocumented encoding 0b11
    Undefined = 0b11,
}

/// Condition that drives the ALERT pin
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlertTriggerMode {
    /// either threshold exceeded
    TempOrHumidity = 0b00,
    /// temperature threshold exceeded
    Temp = 0b01,
    /// humidity threshold exceeded
    Humidity = 0b10,
    /// both thresholds exceeded
    TempAndHumidity = 0b11,
}

/// Configuration register, decoded into its fields
///
/// Decoding keeps the raw word so that [`ConfigRegister::raw`] only differs from it in the fields
/// that were changed. The reserved bits 1-0 are carried through untouched.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConfigRegister {
    raw: u16,
    /// soft reset requested
    pub soft_reset: bool,
    /// I²C clock stretching enabled
    pub clock_stretch: bool,
    /// heater enabled
    pub heater: bool,
    /// measurement mode
    pub measurement_mode: MeasurementMode,
    /// supply voltage status (read-only)
    pub vcc_sense: bool,
    /// temperature resolution
    pub temperature_resolution: TemperatureResolution,
    /// humidity resolution
    pub humidity_resolution: HumidityResolution,
    /// alert trigger mode
    pub alert_trigger_mode: AlertTriggerMode,
    /// an alert is pending (read-only)
    pub alert_pending: bool,
    /// humidity alert raised (read-only)
    pub humidity_alert: bool,
    /// temperature alert raised (read-only)
    pub temperature_alert: bool,
    /// supply voltage measurement enabled
    pub vcc_measurement: bool,
}
impl From<u16> for ConfigRegister {
    fn from(raw: u16) -> Self {
        let flag = |lsbit, width| get_field(raw, lsbit, width) != 0;
        Self {
            raw,
            soft_reset: flag(CONFIG_FIELD_LSBIT_SOFT_RESET, CONFIG_FIELD_WIDTH_SOFT_RESET),
            clock_stretch: flag(CONFIG_FIELD_LSBIT_CLOCK_STRETCH, CONFIG_FIELD_WIDTH_CLOCK_STRETCH),
            heater: flag(CONFIG_FIELD_LSBIT_HEATER, CONFIG_FIELD_WIDTH_HEATER),
            measurement_mode: if flag(CONFIG_FIELD_LSBIT_MODE, CONFIG_FIELD_WIDTH_MODE) {
                MeasurementMode::Both
            } else {
                MeasurementMode::Single
            },
            vcc_sense: flag(CONFIG_FIELD_LSBIT_VCC_SENSE, CONFIG_FIELD_WIDTH_VCC_SENSE),
            temperature_resolution: if flag(CONFIG_FIELD_LSBIT_TEMP_RESOLUTION, CONFIG_FIELD_WIDTH_TEMP_RESOLUTION) {
                TemperatureResolution::Bits11
            } else {
                TemperatureResolution::Bits14
            },
            humidity_resolution: match get_field(raw, CONFIG_FIELD_LSBIT_HUMID_RESOLUTION, CONFIG_FIELD_WIDTH_HUMID_RESOLUTION) {
                0b00 => HumidityResolution::Bits14,
                0b01 => HumidityResolution::Bits11,
                0b10 => HumidityResolution::Bits8,
                _ => HumidityResolution::Undefined,
            },
            alert_trigger_mode: match get_field(raw, CONFIG_FIELD_LSBIT_ALERT_MODE, CONFIG_FIELD_WIDTH_ALERT_MODE) {
                0b00 => AlertTriggerMode::TempOrHumidity,
                0b01 => AlertTriggerMode::Temp,
                0b10 => AlertTriggerMode::Humidity,
                _ => AlertTriggerMode::TempAndHumidity,
            },
            alert_pending: flag(CONFIG_FIELD_LSBIT_ALERT_PENDING, CONFIG_FIELD_WIDTH_ALERT_PENDING),
            humidity_alert: flag(CONFIG_FIELD_LSBIT_HUMID_ALERT, CONFIG_FIELD_WIDTH_HUMID_ALERT),
            temperature_alert: flag(CONFIG_FIELD_LSBIT_TEMP_ALERT, CONFIG_FIELD_WIDTH_TEMP_ALERT),
            vcc_measurement: flag(CONFIG_FIELD_LSBIT_VCC_ENABLE, CONFIG_FIELD_WIDTH_VCC_ENABLE),
        }
    }
}
impl From<ConfigRegister> for u16 {
    fn from(config: ConfigRegister) -> Self {
        config.raw()
    }
}
impl ConfigRegister {
    /// Encode the fields back into a register word
    pub fn raw(&self) -> u16 {
        let mut raw = self.raw;
        raw = set_field(raw, CONFIG_FIELD_LSBIT_SOFT_RESET, CONFIG_FIELD_WIDTH_SOFT_RESET, self.soft_reset as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_CLOCK_STRETCH, CONFIG_FIELD_WIDTH_CLOCK_STRETCH, self.clock_stretch as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_HEATER, CONFIG_FIELD_WIDTH_HEATER, self.heater as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_MODE, CONFIG_FIELD_WIDTH_MODE, self.measurement_mode as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_VCC_SENSE, CONFIG_FIELD_WIDTH_VCC_SENSE, self.vcc_sense as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_TEMP_RESOLUTION, CONFIG_FIELD_WIDTH_TEMP_RESOLUTION, self.temperature_resolution as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_HUMID_RESOLUTION, CONFIG_FIELD_WIDTH_HUMID_RESOLUTION, self.humidity_resolution as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_ALERT_MODE, CONFIG_FIELD_WIDTH_ALERT_MODE, self.alert_trigger_mode as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_ALERT_PENDING, CONFIG_FIELD_WIDTH_ALERT_PENDING, self.alert_pending as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_HUMID_ALERT, CONFIG_FIELD_WIDTH_HUMID_ALERT, self.humidity_alert as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_TEMP_ALERT, CONFIG_FIELD_WIDTH_TEMP_ALERT, self.temperature_alert as u16);
        raw = set_field(raw, CONFIG_FIELD_LSBIT_VCC_ENABLE, CONFIG_FIELD_WIDTH_VCC_ENABLE, self.vcc_measurement as u16);
        raw
    }
}
impl fmt::Display for ConfigRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigRegister {{ 0x{:04x}; ", self.raw())?;
        if self.soft_reset {
            write!(f, "soft_reset ")?;
        }
        if self.clock_stretch {
            write!(f, "clock_stretch ")?;
        }
        if self.heater {
            write!(f, "heater ")?;
        }
        if self.vcc_sense {
            write!(f, "vcc_sense ")?;
        }
        if self.alert_pending {
            write!(f, "alert_pending ")?;
        }
        if self.humidity_alert {
            write!(f, "humidity_alert ")?;
        }
        if self.temperature_alert {
            write!(f, "temperature_alert ")?;
        }
        if self.vcc_measurement {
            write!(f, "vcc_measurement ")?;
        }
        write!(
            f,
            "{:?} {:?} {:?} {:?} }}",
            self.measurement_mode, self.temperature_resolution, self.humidity_resolution, self.alert_trigger_mode
        )
    }
}

/// Manufacturer ID of the device
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ManufacturerId {
    /// Sensylink
    Sensylink,
    /// Other
    Other(u16),
}
impl From<u16> for ManufacturerId {
    fn from(raw: u16) -> Self {
        match raw {
            MANUFACTURER_ID_SENSYLINK => ManufacturerId::Sensylink,
            _ => ManufacturerId::Other(raw),
        }
    }
}
impl From<ManufacturerId> for u16 {
    fn from(id: ManufacturerId) -> Self {
        match id {
            ManufacturerId::Sensylink => MANUFACTURER_ID_SENSYLINK,
            ManufacturerId::Other(id) => id,
        }
    }
}
impl fmt::Display for ManufacturerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManufacturerId::Sensylink => {
                let mid_u16: u16 = (*self).into();
                write!(f, "Sensylink (0x{mid_u16:04X})")
            }
            ManufacturerId::Other(mid_u16) => write!(f, "Unknown (0x{mid_u16:04X})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_decodes_fields() {
        // soft reset, heater, both mode, 11 bit humidity, humidity-only alerts, vcc enable
        let config = ConfigRegister::from(0b1011_0001_1000_0100);
        assert!(config.soft_reset);
        assert!(!config.clock_stretch);
        assert!(config.heater);
        assert_eq!(config.measurement_mode, MeasurementMode::Both);
        assert!(!config.vcc_sense);
        assert_eq!(config.temperature_resolution, TemperatureResolution::Bits14);
        assert_eq!(config.humidity_resolution, HumidityResolution::Bits11);
        assert_eq!(config.alert_trigger_mode, AlertTriggerMode::Humidity);
        assert!(!config.alert_pending);
        assert!(!config.humidity_alert);
        assert!(!config.temperature_alert);
        assert!(config.vcc_measurement);
    }

    #[test]
    fn config_decodes_status_bits() {
        let config = ConfigRegister::from(0b0000_1100_0011_1000);
        assert!(config.vcc_sense);
        assert_eq!(config.temperature_resolution, TemperatureResolution::Bits11);
        assert!(config.alert_pending);
        assert!(config.humidity_alert);
        assert!(config.temperature_alert);
    }

    #[test]
    fn config_encode_is_identity_without_changes() {
        for raw in [0x0000u16, 0xFFFF, 0x1004, 0xA5A7, 0x0003] {
            assert_eq!(ConfigRegister::from(raw).raw(), raw);
        }
    }

    #[test]
    fn config_encode_keeps_reserved_bits() {
        let mut config = ConfigRegister::from(0x0003);
        config.heater = true;
        config.humidity_resolution = HumidityResolution::Bits8;
        assert_eq!(config.raw(), 0x2000 | 0x0200 | 0x0003);
    }

    #[test]
    fn config_display() {
        let text = ConfigRegister::from(0x2004).to_string();
        assert!(text.starts_with("ConfigRegister { 0x2004; heater vcc_measurement "));
    }

    #[test]
    fn address_ranges() {
        assert!(AddressRange::AD0_PIN.contains(0x40));
        assert!(AddressRange::AD0_PIN.contains(0x43));
        assert!(!AddressRange::AD0_PIN.contains(0x44));
        assert!(!AddressRange::AD0_PIN.contains(0x50));
        assert!(AddressRange::EXTENDED.contains(0x50));
        assert!(AddressRange::EXTENDED.contains(0x57));
        assert!(!AddressRange::EXTENDED.contains(0x58));
        assert_eq!(Config::default().address_range, AddressRange::AD0_PIN);
    }

    #[test]
    fn raw_measurement_split() {
        let raw = RawTempAndRelHumid::from_be_bytes([0x00, 0x00, 0xFF, 0xFF]);
        assert_eq!(raw.temperature, 0);
        assert_eq!(raw.humidity, 0xFFFF);
        assert_eq!(raw.centigrade(), -40.0);
        assert!((raw.humidity_percent() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn manufacturer_id() {
        assert_eq!(ManufacturerId::from(0x5959), ManufacturerId::Sensylink);
        assert_eq!(ManufacturerId::from(0x1234), ManufacturerId::Other(0x1234));
        assert_eq!(u16::from(ManufacturerId::Sensylink), 0x5959);
    }
}
