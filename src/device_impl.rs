use crate::codec;
use crate::hw_def::*;
use crate::types::*;
use crate::Cht8305;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, I2c, NoAcknowledgeSource};

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        use defmt::{debug, trace, warn};
    } else if #[cfg(feature = "log")] {
        use log::{debug, trace, warn};
    } else {
        macro_rules! trace {
            ($($arg:tt)*) => {};
        }
        macro_rules! debug {
            ($($arg:tt)*) => {};
        }
        macro_rules! warn {
            ($($arg:tt)*) => {};
        }
    }
}

impl<I2C, Delay, Clk, E> Cht8305<I2C, Delay, Clk>
where
    I2C: I2c<Error = E>,
    E: embedded_hal::i2c::Error,
    Delay: DelayNs,
    Clk: Clock,
{
    /// Create a new CHT8305 driver instance.
    ///
    /// Nothing is sent on the bus until [`Cht8305::connect`] is called. Until then the driver
    /// talks to [`DEFAULT_ADDRESS`].
    pub fn new(i2c: I2C, delay: Delay, clock: Clk, config: Config) -> Self {
        Self {
            i2c,
            delay,
            clock,
            config,
            address: DEFAULT_ADDRESS,
            state: SessionState::Uninitialized,
            last_read: None,
            temperature: 0.0,
            humidity: 0.0,
            temp_offset: 0.0,
            hum_offset: 0.0,
        }
    }

    /// Destroy the driver and release the bus, delay and clock
    pub fn destroy(self) -> (I2C, Delay, Clk) {
        (self.i2c, self.delay, self.clock)
    }

    /// Current device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Settings the driver was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connection state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validate `address` against [`Config::address_range`] and probe the device there.
    ///
    /// The address check happens before any bus traffic.
    pub fn connect(&mut self, address: u8) -> Result<(), Error<E>> {
        let range = self.config.address_range;
        if !range.contains(address) {
            warn!("cht8305::connect(): address {} outside {}..={}", address, range.first, range.last);
            return Err(Error::AddressInvalid(address));
        }

        self.address = address;
        if !self.is_connected() {
            warn!("cht8305::connect(): no acknowledge from address {}", address);
            self.mark_failed();
            return Err(Error::ConnectionFailed);
        }
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Probe the device with an empty write. Cached values are left alone.
    pub fn is_connected(&mut self) -> bool {
        self.i2c.write(self.address, &[]).is_ok()
    }

    /// Read temperature and humidity in one transaction and cache the offset-corrected result.
    ///
    /// Returns [`Error::TooSoon`] if the previous attempt was less than
    /// [`Config::min_read_interval_ms`] ago. The attempt time is recorded before the bus is
    /// touched, so a failed read still counts towards the limit. Cached values are only
    /// replaced when the whole read succeeds.
    pub fn read(&mut self) -> Result<TempAndRelHumid, Error<E>> {
        let now = self.clock.now_ms();
        if let Some(last) = self.last_read {
            let elapsed = now.wrapping_sub(last);
            if elapsed < self.config.min_read_interval_ms {
                debug!("cht8305::read(): {} ms since last read", elapsed);
                return Err(Error::TooSoon);
            }
        }
        self.last_read = Some(now);

        let mut read_buf = [0u8; 4];
        self.read_register(Register::Temperature, &mut read_buf)?;
        let raw = RawTempAndRelHumid::from_be_bytes(read_buf);
        trace!("cht8305::read(): raw temperature={} humidity={}", raw.temperature, raw.humidity);

        let reading = TempAndRelHumid::new(
            raw.centigrade() + self.temp_offset,
            raw.humidity_percent() + self.hum_offset,
        );
        self.temperature = reading.centigrade;
        self.humidity = reading.humidity_percent;
        Ok(reading)
    }

    /// Timestamp of the last read attempt, `None` before the first one
    pub fn last_read(&self) -> Option<u32> {
        self.last_read
    }

    /// Temperature in degrees centigrade from the last successful [`Cht8305::read`]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Relative humidity in percent from the last successful [`Cht8305::read`]
    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    /// Offset added to every temperature reading.
    ///
    /// Not range checked; near the ends of the sensor range the result can leave -40..=125 °C.
    pub fn set_temp_offset(&mut self, offset: f32) {
        self.temp_offset = offset;
    }

    /// Offset added to every temperature reading
    pub fn temp_offset(&self) -> f32 {
        self.temp_offset
    }

    /// Offset added to every humidity reading.
    ///
    /// Not range checked; the result can leave 0..=100 %RH.
    pub fn set_hum_offset(&mut self, offset: f32) {
        self.hum_offset = offset;
    }

    /// Offset added to every humidity reading
    pub fn hum_offset(&self) -> f32 {
        self.hum_offset
    }

    /// Read and decode the configuration register
    pub fn config_register(&mut self) -> Result<ConfigRegister, Error<E>> {
        Ok(ConfigRegister::from(self.read_u16(Register::Config)?))
    }

    /// Write the configuration register.
    ///
    /// The reserved and read-only status bits are taken from the device, not from `config`.
    /// Returns [`Error::InvalidInputData`] for [`HumidityResolution::Undefined`] without touching
    /// the bus.
    pub fn set_config_register(&mut self, config: ConfigRegister) -> Result<(), Error<E>> {
        if config.humidity_resolution == HumidityResolution::Undefined {
            return Err(Error::InvalidInputData);
        }
        let keep = CONFIG_RESERVED_MASK | CONFIG_STATUS_MASK;
        let current = self.read_u16(Register::Config)?;
        let value = codec::set_bits(codec::clear_bits(config.raw(), keep), current & keep);
        self.write_register(Register::Config, value)
    }

    /// Ask the device to reset itself
    pub fn soft_reset(&mut self) -> Result<(), Error<E>> {
        self.modify_config(CONFIG_SOFT_RESET_MASK, CONFIG_SOFT_RESET_MASK)
    }

    /// Enable or disable I²C clock stretching
    pub fn set_clock_stretch(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.set_flag(CONFIG_CLOCK_STRETCH_MASK, enable)
    }

    /// Whether I²C clock stretching is enabled
    pub fn clock_stretch(&mut self) -> Result<bool, Error<E>> {
        Ok(self.config_register()?.clock_stretch)
    }

    /// Switch the heater on or off
    pub fn set_heater(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.set_flag(CONFIG_HEATER_MASK, enable)
    }

    /// Whether the heater is on
    pub fn heater(&mut self) -> Result<bool, Error<E>> {
        Ok(self.config_register()?.heater)
    }

    /// Select single or combined measurements
    pub fn set_measurement_mode(&mut self, mode: MeasurementMode) -> Result<(), Error<E>> {
        self.modify_config(CONFIG_MODE_MASK, (mode as u16) << CONFIG_FIELD_LSBIT_MODE)
    }

    /// Current measurement mode
    pub fn measurement_mode(&mut self) -> Result<MeasurementMode, Error<E>> {
        Ok(self.config_register()?.measurement_mode)
    }

    /// Supply voltage status bit
    pub fn vcc_sense(&mut self) -> Result<bool, Error<E>> {
        Ok(self.config_register()?.vcc_sense)
    }

    /// Set the temperature resolution
    pub fn set_temperature_resolution(&mut self, resolution: TemperatureResolution) -> Result<(), Error<E>> {
        self.modify_config(
            CONFIG_TEMP_RESOLUTION_MASK,
            (resolution as u16) << CONFIG_FIELD_LSBIT_TEMP_RESOLUTION,
        )
    }

    /// Current temperature resolution
    pub fn temperature_resolution(&mut self) -> Result<TemperatureResolution, Error<E>> {
        Ok(self.config_register()?.temperature_resolution)
    }

    /// Set the humidity resolution.
    ///
    /// [`HumidityResolution::Undefined`] is rejected with [`Error::InvalidInputData`] before any
    /// bus traffic.
    pub fn set_humidity_resolution(&mut self, resolution: HumidityResolution) -> Result<(), Error<E>> {
        if resolution == HumidityResolution::Undefined {
            return Err(Error::InvalidInputData);
        }
        self.modify_config(
            CONFIG_HUMID_RESOLUTION_MASK,
            (resolution as u16) << CONFIG_FIELD_LSBIT_HUMID_RESOLUTION,
        )
    }

    /// Current humidity resolution
    pub fn humidity_resolution(&mut self) -> Result<HumidityResolution, Error<E>> {
        Ok(self.config_register()?.humidity_resolution)
    }

    /// Enable or disable supply voltage measurement
    pub fn set_vcc_measurement(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.set_flag(CONFIG_VCC_ENABLE_MASK, enable)
    }

    /// Whether supply voltage measurement is enabled
    pub fn vcc_measurement(&mut self) -> Result<bool, Error<E>> {
        Ok(self.config_register()?.vcc_measurement)
    }

    /// Select the condition that raises the ALERT pin
    pub fn set_alert_trigger_mode(&mut self, mode: AlertTriggerMode) -> Result<(), Error<E>> {
        self.modify_config(CONFIG_ALERT_MODE_MASK, (mode as u16) << CONFIG_FIELD_LSBIT_ALERT_MODE)
    }

    /// Current alert trigger mode
    pub fn alert_trigger_mode(&mut self) -> Result<AlertTriggerMode, Error<E>> {
        Ok(self.config_register()?.alert_trigger_mode)
    }

    /// Alert pending status bit
    pub fn alert_pending(&mut self) -> Result<bool, Error<E>> {
        Ok(self.config_register()?.alert_pending)
    }

    /// Humidity alert status bit
    pub fn humidity_alert(&mut self) -> Result<bool, Error<E>> {
        Ok(self.config_register()?.humidity_alert)
    }

    /// Temperature alert status bit
    pub fn temperature_alert(&mut self) -> Result<bool, Error<E>> {
        Ok(self.config_register()?.temperature_alert)
    }

    /// Write both alert thresholds in a single register write.
    ///
    /// Both values are validated first; nothing is written if either is out of range.
    pub fn set_alert_levels(&mut self, temperature: f32, humidity: f32) -> Result<(), Error<E>> {
        let raw = codec::encode_alert(temperature, humidity)?;
        self.write_register(Register::Alert, raw)
    }

    /// Read both alert thresholds
    pub fn alert_levels(&mut self) -> Result<AlertLevels, Error<E>> {
        Ok(AlertLevels::from(self.read_u16(Register::Alert)?))
    }

    /// Temperature alert threshold in degrees centigrade
    pub fn alert_level_temperature(&mut self) -> Result<f32, Error<E>> {
        Ok(codec::decode_alert_temperature(self.read_u16(Register::Alert)?))
    }

    /// Humidity alert threshold in percent
    pub fn alert_level_humidity(&mut self) -> Result<f32, Error<E>> {
        Ok(codec::decode_alert_humidity(self.read_u16(Register::Alert)?))
    }

    /// Supply voltage in volts (approximate, see [`codec::decode_voltage`])
    pub fn voltage(&mut self) -> Result<f32, Error<E>> {
        Ok(codec::decode_voltage(self.read_u16(Register::Voltage)?))
    }

    /// Read the manufacturer ID
    pub fn manufacturer_id(&mut self) -> Result<ManufacturerId, Error<E>> {
        let raw = self.read_u16(Register::ManufacturerId)?;
        if raw != MANUFACTURER_ID_SENSYLINK {
            warn!("cht8305::manufacturer_id(): unexpected id {}", raw);
        }
        Ok(ManufacturerId::from(raw))
    }

    /// Read the version ID
    pub fn version_id(&mut self) -> Result<u16, Error<E>> {
        self.read_u16(Register::VersionId)
    }

    fn set_flag(&mut self, mask: u16, enable: bool) -> Result<(), Error<E>> {
        self.modify_config(mask, if enable { mask } else { 0 })
    }

    // Read-modify-write of the bits in `mask` only.
    fn modify_config(&mut self, mask: u16, bits: u16) -> Result<(), Error<E>> {
        let current = self.read_u16(Register::Config)?;
        let value = codec::set_bits(codec::clear_bits(current, mask), bits & mask);
        trace!("cht8305::modify_config(): {} -> {}", current, value);
        self.write_register(Register::Config, value)
    }

    fn read_u16(&mut self, reg: Register) -> Result<u16, Error<E>> {
        let mut read_buf = [0u8; 2];
        self.read_register(reg, &mut read_buf)?;
        Ok(u16::from_be_bytes(read_buf))
    }

    fn read_register(&mut self, reg: Register, read_buf: &mut [u8]) -> Result<(), Error<E>> {
        trace!("cht8305::read_register(): reg={} len={}", reg.addr(), read_buf.len());
        if let Err(i2c_err) = self.i2c.write(self.address, &[reg.addr()]) {
            self.mark_failed();
            return Err(Error::I2c(i2c_err));
        }

        self.delay.delay_ms(self.config.read_delay_ms);

        if let Err(i2c_err) = self.i2c.read(self.address, read_buf) {
            self.mark_failed();
            return Err(match i2c_err.kind() {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) | ErrorKind::Overrun => {
                    warn!("cht8305::read_register(): short read of reg {}", reg.addr());
                    Error::ShortRead
                }
                _ => Error::I2c(i2c_err),
            });
        }
        Ok(())
    }

    fn write_register(&mut self, reg: Register, value: u16) -> Result<(), Error<E>> {
        let [msb, lsb] = value.to_be_bytes();
        trace!("cht8305::write_register(): reg={} value={}", reg.addr(), value);
        if let Err(i2c_err) = self.i2c.write(self.address, &[reg.addr(), msb, lsb]) {
            self.mark_failed();
            return Err(Error::I2c(i2c_err));
        }
        Ok(())
    }

    fn mark_failed(&mut self) {
        if self.state == SessionState::Connected {
            self.state = SessionState::Disconnected;
        }
    }
}
