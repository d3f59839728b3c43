//! Conversions between raw register contents and physical values.
//!
//! Nothing in here touches the bus. The device layer reads or writes a register and hands the
//! 16-bit word to these functions.

use crate::hw_def::*;
use crate::types::OutOfRange;

const TEMP_SPAN: f32 = TEMP_MAX_CENTIGRADE - TEMP_MIN_CENTIGRADE;
const RAW_FULL_SCALE: f32 = 65535.0;

/// Convert a raw temperature word to degrees centigrade
pub fn decode_temperature(raw: u16) -> f32 {
    raw as f32 * (TEMP_SPAN / RAW_FULL_SCALE) + TEMP_MIN_CENTIGRADE
}

/// Convert a raw humidity word to percent relative humidity.
///
/// Not clamped: the sensor can report values slightly outside 0-100 %RH.
pub fn decode_humidity(raw: u16) -> f32 {
    raw as f32 / 655.35
}

/// Convert a raw supply voltage word to volts.
///
/// The 5 V full scale is a best guess and has not been checked against the datasheet.
pub fn decode_voltage(raw: u16) -> f32 {
    raw as f32 * (5.0 / RAW_FULL_SCALE)
}

/// Pack a temperature and humidity threshold into the alert register layout.
///
/// The temperature keeps the 9 most significant bits of its raw encoding (bits 8-0), the
/// humidity keeps 7 (bits 15-9). Both values are range checked before anything is encoded.
pub fn encode_alert(temperature: f32, humidity: f32) -> Result<u16, OutOfRange> {
    if !(TEMP_MIN_CENTIGRADE..=TEMP_MAX_CENTIGRADE).contains(&temperature) {
        return Err(OutOfRange::Temperature);
    }
    if !(HUMID_MIN_PERCENT..=HUMID_MAX_PERCENT).contains(&humidity) {
        return Err(OutOfRange::Humidity);
    }

    let raw_temp = round_to_u16((temperature - TEMP_MIN_CENTIGRADE) * (RAW_FULL_SCALE / TEMP_SPAN));
    let raw_humid = round_to_u16(humidity * (RAW_FULL_SCALE / HUMID_MAX_PERCENT));

    let temp_part = truncate_rounded(raw_temp, ALERT_TEMP_SHIFT, ALERT_TEMP_MASK);
    let humid_part = truncate_rounded(raw_humid, ALERT_HUMID_SHIFT, ALERT_HUMID_MASK >> ALERT_HUMID_SHIFT);

    Ok((humid_part << ALERT_HUMID_SHIFT) | temp_part)
}

/// Temperature threshold held in an alert register word, in degrees centigrade
pub fn decode_alert_temperature(raw: u16) -> f32 {
    decode_temperature((raw & ALERT_TEMP_MASK) << ALERT_TEMP_SHIFT)
}

/// Humidity threshold held in an alert register word, in percent
pub fn decode_alert_humidity(raw: u16) -> f32 {
    decode_humidity(raw & ALERT_HUMID_MASK)
}

/// Set every bit of `mask` in `register`
pub const fn set_bits(register: u16, mask: u16) -> u16 {
    register | mask
}

/// Clear every bit of `mask` in `register`
pub const fn clear_bits(register: u16, mask: u16) -> u16 {
    register & !mask
}

/// Extract the `width`-bit field starting at `lsbit`
pub const fn get_field(register: u16, lsbit: u16, width: u16) -> u16 {
    (register >> lsbit) & ((1 << width) - 1)
}

/// Replace the `width`-bit field starting at `lsbit`, leaving all other bits alone
pub const fn set_field(register: u16, lsbit: u16, width: u16, value: u16) -> u16 {
    let mask = field_mask(lsbit, width);
    set_bits(clear_bits(register, mask), (value << lsbit) & mask)
}

// Inputs are range checked, so the value is never negative; `as` saturates at the top.
fn round_to_u16(value: f32) -> u16 {
    (value + 0.5) as u16
}

// Drop `shift` low bits with rounding, saturating at `max`.
fn truncate_rounded(raw: u16, shift: u16, max: u16) -> u16 {
    let half = 1u32 << (shift - 1);
    (((raw as u32 + half) >> shift) as u16).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    // One LSB of each alert threshold
    const ALERT_TEMP_STEP: f32 = 128.0 * 165.0 / 65535.0;
    const ALERT_HUMID_STEP: f32 = 512.0 * 100.0 / 65535.0;

    fn close(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn temperature_endpoints() {
        assert_eq!(decode_temperature(0), -40.0);
        assert!(close(decode_temperature(0xFFFF), 125.0, 1e-3));
    }

    #[test]
    fn humidity_endpoints() {
        assert_eq!(decode_humidity(0), 0.0);
        assert!(close(decode_humidity(0xFFFF), 100.0, 1e-3));
    }

    #[test]
    fn temperature_midscale() {
        // 0x8000 is just over half of the 165 degree span
        assert!(close(decode_temperature(0x8000), 42.5, 0.01));
    }

    /// Voltage scaling is an unconfirmed approximation; this only pins the current formula.
    #[test]
    fn voltage_full_scale() {
        assert_eq!(decode_voltage(0), 0.0);
        assert!(close(decode_voltage(0xFFFF), 5.0, 1e-3));
    }

    #[test]
    fn alert_rejects_out_of_range() {
        assert_eq!(encode_alert(126.0, 50.0), Err(OutOfRange::Temperature));
        assert_eq!(encode_alert(-40.5, 50.0), Err(OutOfRange::Temperature));
        assert_eq!(encode_alert(25.0, -1.0), Err(OutOfRange::Humidity));
        assert_eq!(encode_alert(25.0, 100.5), Err(OutOfRange::Humidity));
        assert_eq!(encode_alert(f32::NAN, 50.0), Err(OutOfRange::Temperature));
    }

    #[test]
    fn alert_accepts_bounds() {
        assert!(encode_alert(-40.0, 0.0).is_ok());
        assert!(encode_alert(125.0, 100.0).is_ok());
        assert_eq!(encode_alert(-40.0, 0.0), Ok(0));
    }

    #[test]
    fn alert_temperature_round_trip() {
        let mut t = -40.0f32;
        while t <= 125.0 {
            let raw = encode_alert(t, 50.0).unwrap();
            let back = decode_alert_temperature(raw & 0x01FF);
            assert!(close(back, t, ALERT_TEMP_STEP), "t={} back={}", t, back);
            t += 2.5;
        }
    }

    #[test]
    fn alert_humidity_round_trip() {
        let mut h = 0.0f32;
        while h <= 100.0 {
            let raw = encode_alert(20.0, h).unwrap();
            let back = decode_alert_humidity(raw & 0xFE00);
            assert!(close(back, h, ALERT_HUMID_STEP), "h={} back={}", h, back);
            h += 2.5;
        }
    }

    #[test]
    fn alert_fields_do_not_overlap() {
        let temp_only = encode_alert(125.0, 0.0).unwrap();
        let humid_only = encode_alert(-40.0, 100.0).unwrap();
        assert_eq!(temp_only & !0x01FF, 0);
        assert_eq!(humid_only & 0x01FF, 0);
    }

    #[test]
    fn set_then_clear_restores_register() {
        let registers = [0x0000, 0xFFFF, 0x1004, 0xA5A5, 0x5A5A, 0x8001];
        for &reg in registers.iter() {
            for &mask in registers.iter() {
                // Only bits that were originally clear are brought back
                let restored = clear_bits(set_bits(reg, mask), mask & !reg);
                assert_eq!(restored, reg);
                assert_eq!(clear_bits(set_bits(reg, mask), mask), reg & !mask);
            }
        }
    }

    #[test]
    fn set_field_touches_only_its_bits() {
        let reg = 0b1010_0101_1010_0111;
        let out = set_field(reg, 8, 2, 0b10);
        assert_eq!(out & !0x0300, reg & !0x0300);
        assert_eq!(get_field(out, 8, 2), 0b10);
        // oversized values are masked to the field width
        assert_eq!(set_field(reg, 6, 2, 0xFF) & !0x00C0, reg & !0x00C0);
    }
}
