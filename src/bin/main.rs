#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use defmt::info;
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::AnyPin;
use esp_hal::i2c::master::{AnyI2c, Config, I2c};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use esp32s3_bmp180::bmp180::{Bmp180, Measurement, config::ResolutionMode};

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

esp_bootloader_esp_idf::esp_app_desc!();

/// I²C controller the BMP180 hangs off (0 => I2C0, 1 => I2C1).
const BARO_BUS: u8 = 0;
const BARO_MODE: ResolutionMode = ResolutionMode::Standard;
const SAMPLE_PERIOD_SECS: u64 = 3;

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    // Open the bus by index
    let bus: AnyI2c<'static> = match BARO_BUS {
        0 => peripherals.I2C0.into(),
        _ => peripherals.I2C1.into(),
    };

    spawner
        .spawn(read_temp_press(
            peripherals.GPIO21.into(),
            peripherals.GPIO20.into(),
            bus,
        ))
        .ok();

    loop {
        Timer::after_secs(1).await;
    }
}

#[embassy_executor::task]
async fn read_temp_press(sda_pin: AnyPin<'static>, scl_pin: AnyPin<'static>, i2c: AnyI2c<'static>) {
    info!("'read_temp_press' has been started");
    let cfg = Config::default().with_frequency(Rate::from_khz(100));
    let i2c_interface: I2c<'_, esp_hal::Blocking> = match I2c::new(i2c, cfg) {
        Ok(i2c) => i2c.with_sda(sda_pin).with_scl(scl_pin),
        Err(e) => {
            info!("I2C configuration rejected: {:?}", e);
            return;
        }
    };

    // Initialization (reads calibration)
    let mut device = match Bmp180::new(i2c_interface, Delay::new(), BARO_MODE) {
        Ok(device) => device,
        Err(e) => {
            info!("Initialization failed: {:?}", e);
            return;
        }
    };
    match device.read_chip_id() {
        Ok(id) => info!("BMP180 has been initialized, chip ID {=u8:#x}", id),
        Err(e) => info!("Chip ID read failed: {:?}", e),
    }

    loop {
        Timer::after_secs(SAMPLE_PERIOD_SECS).await;
        match device.read_measurement() {
            Err(e) => info!("Error occured: {:?}", e),
            Ok(Measurement {
                temperature_c,
                pressure_pa,
            }) => {
                let altitude =
                    esp32s3_bmp180::bmp180::compensation::altitude_from_pressure(pressure_pa);
                info!(
                    "T={=f32} C, P={=i32} Pa, h={=f32} m",
                    temperature_c, pressure_pa, altitude
                );
            }
        }
    }
}
