//! Board constants for the 480x272 RGB panel.
//!
//! | Signal    | GPIO | Signal | GPIO | Signal | GPIO |
//! |-----------|------|--------|------|--------|------|
//! | BK_LIGHT  | 2    | B0     | 8    | G0     | 5    |
//! | HSYNC     | 39   | B1     | 3    | G1     | 6    |
//! | VSYNC     | 41   | B2     | 46   | G2     | 7    |
//! | DE        | 40   | B3     | 9    | G3     | 15   |
//! | PCLK      | 42   | B4     | 1    | G4     | 16   |
//! | R0        | 45   | R3     | 21   | G5     | 4    |
//! | R1        | 48   | R4     | 14   |        |      |
//! | R2        | 47   |        |      |        |      |
//! | TOUCH_SDA | 19   | TOUCH_SCL | 20 | TOUCH_RST | 38 |
//!
//! The panel has no DISP_EN line. The pins themselves are taken from
//! `Peripherals` in `main`, in the order of this table.

use esp_hal::dma::CHUNK_SIZE;
use esp_hal::gpio::Level;
use rgb_lcd_async::timing::PanelTiming;

/// Timing of the 480x272 panel.
pub const PANEL_TIMING: PanelTiming = PanelTiming {
    pclk_hz: 12_000_000,
    h_res: 480,
    v_res: 272,
    hsync_back_porch: 43,
    hsync_front_porch: 8,
    hsync_pulse_width: 4,
    vsync_back_porch: 12,
    vsync_front_porch: 8,
    vsync_pulse_width: 4,
    pclk_active_neg: true,
};

// Rejects a broken table at compile time.
const _: () = assert!(PANEL_TIMING.validate().is_ok());

/// Pixels in one frame.
pub const FRAME_PIXELS: usize = PANEL_TIMING.pixel_count();
/// Bytes of one RGB565 frame.
pub const FRAME_BYTES: usize = FRAME_PIXELS * 2;
/// DMA descriptors needed to cover one frame.
pub const NUM_DMA_DESC: usize = FRAME_BYTES.div_ceil(CHUNK_SIZE);

/// Backlight level that turns the light on.
pub const BK_LIGHT_ON_LEVEL: Level = Level::High;

/// Period of the GUI tick task.
pub const GUI_TICK_PERIOD_MS: u32 = 1;
/// Period of the render loop.
pub const GUI_LOOP_PERIOD_MS: u64 = 10;

/// Polling interval for the end of a DMA frame (one frame is about 13 ms).
pub const SCAN_OUT_POLL_US: u64 = 250;

/// I2C clock of the touch bus.
pub const TOUCH_I2C_KHZ: u32 = 400;
