//! Panel timing table.
//!
//! Values follow the usual RGB panel datasheet layout: each line is
//! `pulse + back porch + active + front porch` pixel clocks, each frame is
//! the same in lines.

/// Reasons a timing table is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingError {
    /// The pixel clock is zero.
    ZeroPixelClock,
    /// The horizontal or vertical resolution is zero.
    ZeroResolution,
    /// The hsync or vsync pulse width is zero.
    ZeroPulseWidth,
}

/// Timing parameters of a parallel RGB panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTiming {
    /// Pixel clock in Hz.
    pub pclk_hz: u32,
    /// Active pixels per line.
    pub h_res: u16,
    /// Active lines per frame.
    pub v_res: u16,
    /// Clocks between the end of the hsync pulse and the first active pixel.
    pub hsync_back_porch: u16,
    /// Clocks between the last active pixel and the next hsync pulse.
    pub hsync_front_porch: u16,
    /// Width of the hsync pulse in clocks.
    pub hsync_pulse_width: u16,
    /// Lines between the end of the vsync pulse and the first active line.
    pub vsync_back_porch: u16,
    /// Lines between the last active line and the next vsync pulse.
    pub vsync_front_porch: u16,
    /// Width of the vsync pulse in lines.
    pub vsync_pulse_width: u16,
    /// Data is latched on the falling pixel clock edge.
    pub pclk_active_neg: bool,
}

impl PanelTiming {
    /// Checks that the table describes a drivable panel.
    pub const fn validate(&self) -> Result<(), TimingError> {
        if self.pclk_hz == 0 {
            return Err(TimingError::ZeroPixelClock);
        }
        if self.h_res == 0 || self.v_res == 0 {
            return Err(TimingError::ZeroResolution);
        }
        if self.hsync_pulse_width == 0 || self.vsync_pulse_width == 0 {
            return Err(TimingError::ZeroPulseWidth);
        }
        Ok(())
    }

    /// Pixel clocks per line, blanking included.
    pub const fn horizontal_total(&self) -> u32 {
        self.hsync_pulse_width as u32
            + self.hsync_back_porch as u32
            + self.h_res as u32
            + self.hsync_front_porch as u32
    }

    /// Lines per frame, blanking included.
    pub const fn vertical_total(&self) -> u32 {
        self.vsync_pulse_width as u32
            + self.vsync_back_porch as u32
            + self.v_res as u32
            + self.vsync_front_porch as u32
    }

    /// Clocks from the start of the hsync pulse to the first active pixel.
    pub const fn horizontal_sync_to_active(&self) -> u32 {
        self.hsync_pulse_width as u32 + self.hsync_back_porch as u32
    }

    /// Lines from the start of the vsync pulse to the first active line.
    pub const fn vertical_sync_to_active(&self) -> u32 {
        self.vsync_pulse_width as u32 + self.vsync_back_porch as u32
    }

    /// Active pixels per frame.
    pub const fn pixel_count(&self) -> usize {
        self.h_res as usize * self.v_res as usize
    }

    /// Frame rate in millihertz, rounded down.
    pub const fn refresh_rate_millihertz(&self) -> u32 {
        let clocks_per_frame = self.horizontal_total() as u64 * self.vertical_total() as u64;
        if clocks_per_frame == 0 {
            return 0;
        }
        (self.pclk_hz as u64 * 1000 / clocks_per_frame) as u32
    }
}
