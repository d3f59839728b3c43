//! Register map, bit positions and timing constants of the CHT8305.

/// Default I²C address (AD0 tied to GND)
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Manufacturer ID reported by Sensylink parts
pub const MANUFACTURER_ID_SENSYLINK: u16 = 0x5959;

/// Settling delay used between register select and read by the legacy driver
pub const LEGACY_READ_DELAY_MS: u32 = 20;
/// Settling delay matching the conversion time of the measurement register
pub const CONVERSION_READ_DELAY_MS: u32 = 14;
/// Minimum time between two measurement reads
pub const MIN_READ_INTERVAL_MS: u32 = 1000;

/// Device registers
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Register {
    /// Raw temperature, first half of the combined 4-byte read
    Temperature = 0x00,
    /// Raw relative humidity
    Humidity = 0x01,
    /// Configuration bitmask
    Config = 0x02,
    /// Packed temperature/humidity alert thresholds
    Alert = 0x03,
    /// Raw supply voltage
    Voltage = 0x04,
    /// Version ID
    VersionId = 0xFE,
    /// Manufacturer ID
    ManufacturerId = 0xFF,
}
impl Register {
    /// Register address byte
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

// Config register fields (MSB first)
pub(crate) const CONFIG_FIELD_LSBIT_SOFT_RESET: u16 = 15;
pub(crate) const CONFIG_FIELD_WIDTH_SOFT_RESET: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_CLOCK_STRETCH: u16 = 14;
pub(crate) const CONFIG_FIELD_WIDTH_CLOCK_STRETCH: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_HEATER: u16 = 13;
pub(crate) const CONFIG_FIELD_WIDTH_HEATER: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_MODE: u16 = 12;
pub(crate) const CONFIG_FIELD_WIDTH_MODE: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_VCC_SENSE: u16 = 11;
pub(crate) const CONFIG_FIELD_WIDTH_VCC_SENSE: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_TEMP_RESOLUTION: u16 = 10;
pub(crate) const CONFIG_FIELD_WIDTH_TEMP_RESOLUTION: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_HUMID_RESOLUTION: u16 = 8;
pub(crate) const CONFIG_FIELD_WIDTH_HUMID_RESOLUTION: u16 = 2;
pub(crate) const CONFIG_FIELD_LSBIT_ALERT_MODE: u16 = 6;
pub(crate) const CONFIG_FIELD_WIDTH_ALERT_MODE: u16 = 2;
pub(crate) const CONFIG_FIELD_LSBIT_ALERT_PENDING: u16 = 5;
pub(crate) const CONFIG_FIELD_WIDTH_ALERT_PENDING: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_HUMID_ALERT: u16 = 4;
pub(crate) const CONFIG_FIELD_WIDTH_HUMID_ALERT: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_TEMP_ALERT: u16 = 3;
pub(crate) const CONFIG_FIELD_WIDTH_TEMP_ALERT: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_VCC_ENABLE: u16 = 2;
pub(crate) const CONFIG_FIELD_WIDTH_VCC_ENABLE: u16 = 1;
pub(crate) const CONFIG_FIELD_LSBIT_RESERVED: u16 = 0;
pub(crate) const CONFIG_FIELD_WIDTH_RESERVED: u16 = 2;

/// Mask covering `width` bits starting at `lsbit`
pub(crate) const fn field_mask(lsbit: u16, width: u16) -> u16 {
    ((1 << width) - 1) << lsbit
}

/// Bits 1-0 of the config register, never modified by the driver
pub const CONFIG_RESERVED_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_RESERVED, CONFIG_FIELD_WIDTH_RESERVED);
/// Read-only status bits (VCC sense and the three alert flags), never written by the driver
pub const CONFIG_STATUS_MASK: u16 =
    CONFIG_VCC_SENSE_MASK | CONFIG_ALERT_PENDING_MASK | CONFIG_HUMID_ALERT_MASK | CONFIG_TEMP_ALERT_MASK;
/// Soft-reset bit
pub const CONFIG_SOFT_RESET_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_SOFT_RESET, CONFIG_FIELD_WIDTH_SOFT_RESET);
/// Clock-stretch enable bit
pub const CONFIG_CLOCK_STRETCH_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_CLOCK_STRETCH, CONFIG_FIELD_WIDTH_CLOCK_STRETCH);
/// Heater enable bit
pub const CONFIG_HEATER_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_HEATER, CONFIG_FIELD_WIDTH_HEATER);
/// Measurement mode bit
pub const CONFIG_MODE_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_MODE, CONFIG_FIELD_WIDTH_MODE);
/// Supply voltage status bit (read-only)
pub const CONFIG_VCC_SENSE_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_VCC_SENSE, CONFIG_FIELD_WIDTH_VCC_SENSE);
/// Temperature resolution bit
pub const CONFIG_TEMP_RESOLUTION_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_TEMP_RESOLUTION, CONFIG_FIELD_WIDTH_TEMP_RESOLUTION);
/// Humidity resolution field
pub const CONFIG_HUMID_RESOLUTION_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_HUMID_RESOLUTION, CONFIG_FIELD_WIDTH_HUMID_RESOLUTION);
/// Alert trigger mode field
pub const CONFIG_ALERT_MODE_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_ALERT_MODE, CONFIG_FIELD_WIDTH_ALERT_MODE);
/// Alert pending status bit
pub const CONFIG_ALERT_PENDING_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_ALERT_PENDING, CONFIG_FIELD_WIDTH_ALERT_PENDING);
/// Humidity alert status bit
pub const CONFIG_HUMID_ALERT_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_HUMID_ALERT, CONFIG_FIELD_WIDTH_HUMID_ALERT);
/// Temperature alert status bit
pub const CONFIG_TEMP_ALERT_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_TEMP_ALERT, CONFIG_FIELD_WIDTH_TEMP_ALERT);
/// Supply voltage measurement enable bit
pub const CONFIG_VCC_ENABLE_MASK: u16 = field_mask(CONFIG_FIELD_LSBIT_VCC_ENABLE, CONFIG_FIELD_WIDTH_VCC_ENABLE);

// Alert register: 9 MSBs of the raw temperature in bits 8-0, 7 MSBs of the raw
// humidity in bits 15-9.
pub(crate) const ALERT_TEMP_MASK: u16 = 0x01FF;
pub(crate) const ALERT_TEMP_SHIFT: u16 = 7;
pub(crate) const ALERT_HUMID_MASK: u16 = 0xFE00;
pub(crate) const ALERT_HUMID_SHIFT: u16 = 9;

pub(crate) const TEMP_MIN_CENTIGRADE: f32 = -40.0;
pub(crate) const TEMP_MAX_CENTIGRADE: f32 = 125.0;
pub(crate) const HUMID_MIN_PERCENT: f32 = 0.0;
pub(crate) const HUMID_MAX_PERCENT: f32 = 100.0;
