//! RGB panel output: the scan-out task that produces vsync events and the
//! GUI side that writes rendered areas into the panel frame buffer.

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use esp_hal::dma::DmaTxBuf;
use esp_hal::gpio::Level;
use esp_hal::lcd_cam::lcd::dpi::{Config as DpiConfig, Dpi, Format, FrameTiming};
use esp_hal::lcd_cam::lcd::{ClockMode, Phase, Polarity};
use esp_hal::time::Rate;
use esp_hal::Blocking;
use log::{error, info, warn};
use rgb_lcd_async::framebuffer::FrameBuffer;
use rgb_lcd_async::timing::PanelTiming;
use rgb_lcd_async::vsync::VsyncHandshake;
#[cfg(feature = "avoid-tear-effect")]
use rgb_lcd_async::vsync::Flusher;
use slint::platform::software_renderer::{PhysicalRegion, Rgb565Pixel};

use crate::board::SCAN_OUT_POLL_US;

/// Frame buffer shared by the scan-out task and the GUI flush.
pub type SharedFrameBuffer = Mutex<CriticalSectionRawMutex, FrameBuffer<'static>>;

/// Handshake between the end of a scanned-out frame and the GUI flush.
pub static HANDSHAKE: VsyncHandshake<CriticalSectionRawMutex> = VsyncHandshake::new();

/// LCD_CAM configuration for `timing`, 16-bit RGB565 data.
pub fn dpi_config(timing: &PanelTiming) -> DpiConfig {
    // Same edge mapping as the ESP-IDF RGB panel driver.
    let clock_mode = if timing.pclk_active_neg {
        ClockMode {
            polarity: Polarity::IdleLow,
            phase: Phase::ShiftHigh,
        }
    } else {
        ClockMode {
            polarity: Polarity::IdleHigh,
            phase: Phase::ShiftLow,
        }
    };

    DpiConfig::default()
        .with_clock_mode(clock_mode)
        .with_frequency(Rate::from_hz(timing.pclk_hz))
        .with_format(Format {
            enable_2byte_mode: true,
            ..Default::default()
        })
        .with_timing(FrameTiming {
            horizontal_active_width: timing.h_res as usize,
            horizontal_total_width: timing.horizontal_total() as usize,
            horizontal_blank_front_porch: timing.horizontal_sync_to_active() as usize,
            vertical_active_height: timing.v_res as usize,
            vertical_total_height: timing.vertical_total() as usize,
            vertical_blank_front_porch: timing.vertical_sync_to_active() as usize,
            hsync_width: timing.hsync_pulse_width as usize,
            vsync_width: timing.vsync_pulse_width as usize,
            hsync_position: 0,
        })
        .with_vsync_idle_level(Level::High)
        .with_hsync_idle_level(Level::High)
        .with_de_idle_level(Level::Low)
        .with_disable_black_region(false)
}

/// Streams the frame buffer to the panel, one DMA frame at a time.
///
/// The completion of a frame transfer is the frame boundary: it is reported
/// to [`HANDSHAKE`], then the task yields once so a released flush can
/// write before the next frame is packed.
///
/// The blocking DPI driver has no completion interrupt, so the transfer is
/// polled every [`SCAN_OUT_POLL_US`] and the executor sleeps in between.
#[embassy_executor::task]
pub async fn scan_out_task(
    mut dpi: Dpi<'static, Blocking>,
    mut dma_tx: DmaTxBuf,
    frame: &'static SharedFrameBuffer,
) {
    info!("Scan-out task started");
    loop {
        {
            let frame = frame.lock().await;
            if let Err(err) = frame.write_le_bytes(dma_tx.as_mut_slice()) {
                error!("Frame does not fit the DMA buffer: {err:?}");
            }
        }

        match dpi.send(false, dma_tx) {
            Ok(transfer) => {
                while !transfer.is_done() {
                    Timer::after_micros(SCAN_OUT_POLL_US).await;
                }
                let (result, dpi_back, tx_back) = transfer.wait();
                dpi = dpi_back;
                dma_tx = tx_back;
                if let Err(err) = result {
                    error!("DMA error: {err:?}");
                }
                HANDSHAKE.on_vsync();
            }
            Err((err, dpi_back, tx_back)) => {
                error!("DMA send error: {err:?}");
                dpi = dpi_back;
                dma_tx = tx_back;
            }
        }

        yield_now().await;
    }
}

/// Bounding box of the area the renderer just redrew.
pub fn dirty_area(region: &PhysicalRegion) -> Rectangle {
    let origin = region.bounding_box_origin();
    let size = region.bounding_box_size();
    Rectangle::new(
        Point::new(origin.x, origin.y),
        Size::new(size.width, size.height),
    )
}

/// The GUI's display driver: copies rendered areas to the panel.
pub struct PanelWriter {
    #[cfg(feature = "avoid-tear-effect")]
    flusher: Flusher<'static, CriticalSectionRawMutex>,
    frame: &'static SharedFrameBuffer,
    stride: usize,
}

impl PanelWriter {
    /// Takes the flush side of [`HANDSHAKE`].
    ///
    /// # Panics
    ///
    /// If another `PanelWriter` is alive.
    pub fn new(frame: &'static SharedFrameBuffer, stride: usize) -> Self {
        Self {
            #[cfg(feature = "avoid-tear-effect")]
            flusher: HANDSHAKE
                .flusher()
                .expect("Only one panel writer may exist"),
            frame,
            stride,
        }
    }

    /// Writes `area` of the full-frame render buffer `pixels` to the panel.
    ///
    /// With `avoid-tear-effect` the write waits for the next frame boundary.
    pub async fn flush(&mut self, area: Rectangle, pixels: &[Rgb565Pixel]) {
        if area.is_zero_sized() {
            return;
        }

        #[cfg(feature = "avoid-tear-effect")]
        let slot = self.flusher.wait_for_vsync().await;

        let written = self
            .frame
            .lock()
            .await
            .draw_from_render_buffer(&area, pixels, self.stride, |px| px.0);

        match written {
            Ok(()) => {
                #[cfg(feature = "avoid-tear-effect")]
                slot.present();
            }
            // The slot is released uncounted when dropped.
            Err(err) => warn!("Dropped flush of {area:?}: {err:?}"),
        }
    }
}
