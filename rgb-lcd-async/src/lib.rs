//! Hardware independent building blocks for driving a parallel RGB panel
//! from an async GUI render loop.
//!
//! The crate provides:
//!
//! * [`vsync::VsyncHandshake`], the tear-avoidance handshake between the
//!   panel's frame-boundary event and the GUI flush.
//! * [`framebuffer::FrameBuffer`], the panel frame buffer with the bitmap
//!   blit used by the flush and the byte packing used by the DMA scan-out.
//! * [`timing::PanelTiming`], the panel timing table and its derived values.
//! * [`tick::TickCounter`], the millisecond tick consumed by the GUI clock.
//! * [`pointer::PointerTracker`], which turns touch samples into pointer
//!   transitions.
//!
//! # Usage
//!
//! The vsync producer (an interrupt or the scan-out task) and the render
//! task share one static handshake:
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use rgb_lcd_async::vsync::VsyncHandshake;
//!
//! static VSYNC: VsyncHandshake<CriticalSectionRawMutex> = VsyncHandshake::new();
//!
//! #[embassy_executor::task]
//! async fn scan_out() {
//!     loop {
//!         // ... transfer one frame to the panel ...
//!         VSYNC.on_vsync();
//!     }
//! }
//!
//! async fn render_loop() {
//!     let mut flusher = VSYNC.flusher().unwrap();
//!     loop {
//!         // ... render a dirty area ...
//!         flusher.flush(|| { /* copy the area into the frame buffer */ }).await;
//!     }
//! }
//! ```

#![no_std]
#![deny(missing_docs)]

pub mod framebuffer;
pub mod pointer;
pub mod tick;
pub mod timing;
pub mod vsync;
