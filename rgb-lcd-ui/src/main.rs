#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those holding buffers for the duration of a data transfer."
)]

extern crate alloc;

mod board;
mod display;
mod platform;

use alloc::boxed::Box;
use alloc::vec;

use embassy_executor::Spawner;
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Duration, Ticker};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use esp_hal::clock::CpuClock;
use esp_hal::dma::{DmaDescriptor, DmaTxBuf};
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::lcd_cam::{lcd::dpi::Dpi, LcdCam};
use esp_hal::time::Rate;
use esp_hal::timer::systimer::SystemTimer;
use esp_println::println;
use gt911_touch_async::touch::TouchController;
use log::{debug, info};
use rgb_lcd_async::framebuffer::FrameBuffer;
use slint::platform::software_renderer::{MinimalSoftwareWindow, RepaintBufferType, Rgb565Pixel};
use slint::ComponentHandle;
use static_cell::StaticCell;

use crate::board::{
    BK_LIGHT_ON_LEVEL, FRAME_BYTES, FRAME_PIXELS, GUI_LOOP_PERIOD_MS, NUM_DMA_DESC, PANEL_TIMING,
    TOUCH_I2C_KHZ,
};
use crate::display::{PanelWriter, SharedFrameBuffer, HANDSHAKE};
use crate::platform::{BoardPlatform, TouchInput};

slint::include_modules!();

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

static TX_DESCRIPTORS: StaticCell<[DmaDescriptor; NUM_DMA_DESC]> = StaticCell::new();
static FRAME_BUFFER: StaticCell<SharedFrameBuffer> = StaticCell::new();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger(log::LevelFilter::Debug);
    info!("Logger initialized");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    info!("Peripherals initialized");

    esp_alloc::heap_allocator!(size: 72 * 1024);
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);
    info!("Heap and PSRAM allocators initialized");

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);
    info!("Embassy initialized");

    info!("Turn off LCD backlight");
    let mut backlight = Output::new(peripherals.GPIO2, !BK_LIGHT_ON_LEVEL, OutputConfig::default());

    info!("Install RGB LCD panel driver");
    let lcd_cam = LcdCam::new(peripherals.LCD_CAM);
    let dpi = Dpi::new(
        lcd_cam.lcd,
        peripherals.DMA_CH2,
        display::dpi_config(&PANEL_TIMING),
    )
    .expect("Invalid RGB panel configuration")
    .with_hsync(peripherals.GPIO39)
    .with_vsync(peripherals.GPIO41)
    .with_de(peripherals.GPIO40)
    .with_pclk(peripherals.GPIO42)
    .with_data0(peripherals.GPIO8)
    .with_data1(peripherals.GPIO3)
    .with_data2(peripherals.GPIO46)
    .with_data3(peripherals.GPIO9)
    .with_data4(peripherals.GPIO1)
    .with_data5(peripherals.GPIO5)
    .with_data6(peripherals.GPIO6)
    .with_data7(peripherals.GPIO7)
    .with_data8(peripherals.GPIO15)
    .with_data9(peripherals.GPIO16)
    .with_data10(peripherals.GPIO4)
    .with_data11(peripherals.GPIO45)
    .with_data12(peripherals.GPIO48)
    .with_data13(peripherals.GPIO47)
    .with_data14(peripherals.GPIO21)
    .with_data15(peripherals.GPIO14);

    info!("Allocate frame buffers from PSRAM");
    let pixels: &'static mut [u16] = Box::leak(vec![0u16; FRAME_PIXELS].into_boxed_slice());
    let mut frame = FrameBuffer::new(pixels, PANEL_TIMING.h_res as u32, PANEL_TIMING.v_res as u32)
        .expect("Frame buffer does not match the panel");
    frame.clear(Rgb565::BLACK).expect("Clearing the frame cannot fail");
    let frame = FRAME_BUFFER.init(Mutex::new(frame));

    let dma_bytes: &'static mut [u8] = Box::leak(vec![0u8; FRAME_BYTES].into_boxed_slice());
    let descriptors = TX_DESCRIPTORS.init([DmaDescriptor::EMPTY; NUM_DMA_DESC]);
    let dma_tx = DmaTxBuf::new(descriptors, dma_bytes).expect("DMA buffer rejected");

    info!("Register vsync producer");
    spawner
        .spawn(display::scan_out_task(dpi, dma_tx, frame))
        .expect("Failed to spawn the scan-out task");

    info!("Turn on LCD backlight");
    backlight.set_level(BK_LIGHT_ON_LEVEL);

    info!("Initialize Slint");
    let window = MinimalSoftwareWindow::new(RepaintBufferType::ReusedBuffer);
    window.set_size(slint::PhysicalSize::new(
        PANEL_TIMING.h_res as u32,
        PANEL_TIMING.v_res as u32,
    ));
    slint::platform::set_platform(Box::new(BoardPlatform::new(window.clone())))
        .expect("Slint platform already set");
    let stride = PANEL_TIMING.h_res as usize;
    let mut render_buf = vec![Rgb565Pixel(0); FRAME_PIXELS];
    let mut panel = PanelWriter::new(frame, stride);

    info!("Start GUI tick task");
    spawner
        .spawn(platform::gui_tick_task())
        .expect("Failed to spawn the GUI tick task");

    info!("Initialize touch controller");
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_khz(TOUCH_I2C_KHZ)),
    )
    .expect("Invalid touch I2C configuration")
    .with_sda(peripherals.GPIO19)
    .with_scl(peripherals.GPIO20)
    .into_async();
    let touch_rst = Output::new(peripherals.GPIO38, Level::High, OutputConfig::default());
    let mut controller = TouchController::new(i2c, Some(touch_rst), Delay);
    let product = controller.init().await.expect("GT911 not responding");
    info!(
        "GT911 firmware {:#06x}, {}x{}",
        product.firmware_version, product.x_resolution, product.y_resolution
    );
    let mut touch = TouchInput::new(controller);

    info!("Build UI");
    let ui = AppWindow::new().expect("Failed to build the UI");
    let ui_weak = ui.as_weak();
    ui.on_tapped(move || {
        if let Some(ui) = ui_weak.upgrade() {
            ui.set_taps(ui.get_taps() + 1);
        }
    });
    ui.show().expect("Failed to show the UI");

    info!("Enter render loop");
    let loops_per_second = (1000 / GUI_LOOP_PERIOD_MS) as u32;
    let mut ticker = Ticker::every(Duration::from_millis(GUI_LOOP_PERIOD_MS));
    let mut loops: u32 = 0;
    loop {
        touch.poll(&window).await;

        if loops % loops_per_second == 0 {
            let stats = HANDSHAKE.stats();
            debug!(
                "Frames presented {}, vsync events {}",
                stats.frames_presented(),
                stats.vsync_events()
            );
            ui.set_frames_presented(stats.frames_presented() as i32);
            ui.set_vsync_events(stats.vsync_events() as i32);
        }
        loops = loops.wrapping_add(1);

        slint::platform::update_timers_and_animations();

        let mut dirty = None;
        window.draw_if_needed(|renderer| {
            let region = renderer.render(render_buf.as_mut_slice(), stride);
            dirty = Some(display::dirty_area(&region));
        });
        if let Some(area) = dirty {
            panel.flush(area, &render_buf).await;
        }

        ticker.next().await;
    }
}
