//! ICM-42670 inertial sensor adapter for the glove.
//!
//! The gesture threshold is calibrated in the raw counts of a ±2 g / ±250 °/s
//! sensor. The ICM-42670 driver reports normalized units, so readings are
//! rescaled to that convention before classification.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use icm42670::{
    accelerometer::{Accelerometer, Error as AccelerometerError},
    Address as ImuAddress, Error as ImuError, Icm42670,
};

use super::Imu;
use crate::utils::gesture::GestureSample;

/// Raw counts per g at ±2 g full scale.
pub const ACCEL_LSB_PER_G: f32 = 16384.0;

/// Raw counts per °/s at ±250 °/s full scale.
pub const GYRO_LSB_PER_DPS: f32 = 131.0;

/// Errors raised by the IMU adapter.
#[derive(Debug)]
pub enum ImuReadError<E: core::fmt::Debug> {
    Imu(ImuError<E>),
    Accel(AccelerometerError<ImuError<E>>),
    NotInitialized,
}

/// ICM-42670 on a shared I2C bus.
pub struct Icm42670Imu<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    imu: Option<Icm42670<RefCellDevice<'a, I2C>>>,
}

impl<'a, I2C, E> Icm42670Imu<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    pub fn new(i2c_bus: &'a RefCell<I2C>) -> Self {
        Self {
            i2c: i2c_bus,
            imu: None,
        }
    }

    /// Check the chip id and configure the sensor. The driver rejects a wrong chip id.
    pub fn init(&mut self) -> Result<(), ImuReadError<E>> {
        let imu = Icm42670::new(RefCellDevice::new(self.i2c), ImuAddress::Primary)
            .map_err(ImuReadError::Imu)?;
        self.imu = Some(imu);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.imu.is_some()
    }

    /// Read accelerometer and gyroscope, rescaled to raw counts.
    pub fn read_raw(&mut self) -> Result<GestureSample, ImuReadError<E>> {
        let imu = self.imu.as_mut().ok_or(ImuReadError::NotInitialized)?;
        let accel = imu.accel_norm().map_err(ImuReadError::Accel)?;
        let gyro = imu.gyro_norm().map_err(ImuReadError::Imu)?;

        Ok(GestureSample {
            ax: to_counts(accel.x, ACCEL_LSB_PER_G),
            ay: to_counts(accel.y, ACCEL_LSB_PER_G),
            az: to_counts(accel.z, ACCEL_LSB_PER_G),
            gx: to_counts(gyro.x, GYRO_LSB_PER_DPS),
            gy: to_counts(gyro.y, GYRO_LSB_PER_DPS),
            gz: to_counts(gyro.z, GYRO_LSB_PER_DPS),
        })
    }
}

impl<I2C, E> Imu for Icm42670Imu<'_, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    fn self_test(&mut self) -> bool {
        match self.init() {
            Ok(()) => {
                tracing::info!("ICM-42670 connection successful");
                true
            }
            Err(e) => {
                tracing::error!("ICM-42670 connection failed: {:?}", e);
                false
            }
        }
    }

    /// A failed read yields a zero sample, which classifies as `Stop`.
    fn read_motion(&mut self) -> GestureSample {
        self.read_raw().unwrap_or_else(|e| {
            tracing::warn!("IMU read failed: {:?}", e);
            GestureSample::default()
        })
    }
}

/// Scale a normalized reading to raw counts.
///
/// Float-to-int casts saturate, so out-of-range readings clamp to the `i16`
/// bounds and NaN maps to zero.
pub fn to_counts(
    value: f32,
    lsb_per_unit: f32,
) -> i16 {
    libm::roundf(value * lsb_per_unit) as i16
}
