use core::cell::RefCell;

use embedded_hal_bus::i2c::RefCellDevice;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};
use gbot_core::utils::{
    config::PWM_ADDRESS,
    controllers::{
        imu::{to_counts, Icm42670Imu, ACCEL_LSB_PER_G, GYRO_LSB_PER_DPS},
        motor::DifferentialDrive,
        Imu, MotorActuator,
    },
    gesture::GestureSample,
};
use pwm_pca9685::{Address as PwmAddress, Pca9685};

/// Default I2C address for the IMU sensor.
pub const IMU_ADDRESS: u8 = 0x68;

/// Create a write transaction for the given I2C address and data payload.
pub fn write(
    addr: u8,
    data: Vec<u8>,
) -> I2cTrans {
    I2cTrans::write(addr, data)
}
/// Create a write_read transaction for the given I2C address/payloads.
pub fn write_read(
    addr: u8,
    write: Vec<u8>,
    read: Vec<u8>,
) -> I2cTrans {
    I2cTrans::write_read(addr, write, read)
}

fn drive_over(i2c_bus: &RefCell<I2cMock>) -> DifferentialDrive<RefCellDevice<'_, I2cMock>> {
    let pwm = Pca9685::new(RefCellDevice::new(i2c_bus), PwmAddress::from(PWM_ADDRESS)).unwrap();
    DifferentialDrive::from_pwm(pwm)
}

#[test]
fn imu_self_test_checks_chip_and_configures() {
    let expectations = [
        write_read(IMU_ADDRESS, vec![0x75], vec![0x67]),
        write_read(IMU_ADDRESS, vec![0x21], vec![0x00]),
        write(IMU_ADDRESS, vec![0x21, 0x00]),
        write_read(IMU_ADDRESS, vec![0x20], vec![0x00]),
        write(IMU_ADDRESS, vec![0x20, 0x00]),
        write_read(IMU_ADDRESS, vec![0x1F], vec![0x0F]),
        write(IMU_ADDRESS, vec![0x1F, 0x0F]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut imu = Icm42670Imu::new(&i2c_bus);
    assert!(!imu.is_initialized());
    assert!(imu.self_test());
    assert!(imu.is_initialized());
    i2c_bus.borrow_mut().done();
}

#[test]
fn imu_read_before_init_yields_zero_sample() {
    let mock = I2cMock::new(&[]);
    let i2c_bus = RefCell::new(mock);
    let mut imu = Icm42670Imu::new(&i2c_bus);
    assert_eq!(imu.read_motion(), GestureSample::default());
    i2c_bus.borrow_mut().done();
}

#[test]
fn normalized_readings_scale_to_raw_counts() {
    assert_eq!(to_counts(0.0, ACCEL_LSB_PER_G), 0);
    assert_eq!(to_counts(0.5, ACCEL_LSB_PER_G), 8192);
    assert_eq!(to_counts(-0.25, ACCEL_LSB_PER_G), -4096);
    assert_eq!(to_counts(1.0, GYRO_LSB_PER_DPS), 131);
    // past full scale
    assert_eq!(to_counts(4.0, ACCEL_LSB_PER_G), i16::MAX);
    assert_eq!(to_counts(-4.0, ACCEL_LSB_PER_G), i16::MIN);
    assert_eq!(to_counts(f32::NAN, ACCEL_LSB_PER_G), 0);
}

#[test]
fn drive_configure_enables_and_sets_prescale() {
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x01]),
        write(PWM_ADDRESS, vec![0x00, 0x11]),
        write(PWM_ADDRESS, vec![0xFE, 100]),
        write(PWM_ADDRESS, vec![0x00, 0x01]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus);
    drive.configure().unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn drive_stop_zeroes_both_sides() {
    // auto-increment, then (phase, enable) for left and right
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0x00, 0x00]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus);
    drive.stop();
    i2c_bus.borrow_mut().done();
}

#[test]
fn drive_turn_left_reverses_left_side() {
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0xFF, 0x0F]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus);
    drive.turn_left();
    i2c_bus.borrow_mut().done();
}

#[test]
fn drive_forward_at_zero_duty_writes_no_power() {
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0x00, 0x00]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus).with_duty(0.0);
    drive.forward();
    i2c_bus.borrow_mut().done();
}

#[test]
fn drive_forward_powers_both_sides_ahead() {
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0xFF, 0x0F]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus);
    drive.forward();
    i2c_bus.borrow_mut().done();
}

#[test]
fn drive_backward_reverses_both_sides() {
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0xFF, 0x0F]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus);
    drive.backward();
    i2c_bus.borrow_mut().done();
}

#[test]
fn drive_turn_right_reverses_right_side() {
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0xFF, 0x0F]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0xFF, 0x0F]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus);
    drive.turn_right();
    i2c_bus.borrow_mut().done();
}

#[test]
fn drive_half_duty_scales_enable_channels() {
    // 0.5 * 4095 truncates to 2047 (0x07FF); phases stay low for forward
    let expectations = [
        write(PWM_ADDRESS, vec![0x00, 0x31]),
        write(PWM_ADDRESS, vec![0x1E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x22, 0x00, 0x00, 0xFF, 0x07]),
        write(PWM_ADDRESS, vec![0x0E, 0x00, 0x00, 0x00, 0x00]),
        write(PWM_ADDRESS, vec![0x12, 0x00, 0x00, 0xFF, 0x07]),
    ];

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut drive = drive_over(&i2c_bus).with_duty(0.5);
    drive.forward();
    i2c_bus.borrow_mut().done();
}
