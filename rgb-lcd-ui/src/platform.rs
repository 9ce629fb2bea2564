//! Slint platform glue: the tick-backed clock and the touch input adapter.

use alloc::rc::Rc;

use embassy_time::{Delay, Duration, Ticker};
use esp_hal::gpio::Output;
use esp_hal::i2c::master::I2c;
use esp_hal::Async;
use gt911_touch_async::touch::TouchController;
use log::{debug, warn};
use rgb_lcd_async::pointer::{PointerEvent, PointerTracker};
use rgb_lcd_async::tick::TickCounter;
use slint::platform::software_renderer::MinimalSoftwareWindow;
use slint::platform::{Platform, PointerEventButton, WindowAdapter, WindowEvent};
use slint::{PhysicalPosition, PlatformError};

use crate::board::GUI_TICK_PERIOD_MS;

/// Milliseconds since the GUI tick task started.
pub static TICKS: TickCounter = TickCounter::new();

/// Advances [`TICKS`] every [`GUI_TICK_PERIOD_MS`].
#[embassy_executor::task]
pub async fn gui_tick_task() {
    let mut ticker = Ticker::every(Duration::from_millis(GUI_TICK_PERIOD_MS as u64));
    loop {
        ticker.next().await;
        TICKS.inc(GUI_TICK_PERIOD_MS);
    }
}

/// Single-window Slint platform whose clock is [`TICKS`].
pub struct BoardPlatform {
    window: Rc<MinimalSoftwareWindow>,
}

impl BoardPlatform {
    pub fn new(window: Rc<MinimalSoftwareWindow>) -> Self {
        Self { window }
    }
}

impl Platform for BoardPlatform {
    fn create_window_adapter(&self) -> Result<Rc<dyn WindowAdapter>, PlatformError> {
        Ok(self.window.clone())
    }

    fn duration_since_start(&self) -> core::time::Duration {
        TICKS.elapsed()
    }

    fn debug_log(&self, arguments: core::fmt::Arguments) {
        debug!("slint: {arguments}");
    }
}

type Gt911 = TouchController<I2c<'static, Async>, Output<'static>, Delay>;

/// Feeds GT911 samples to the window as pointer events.
pub struct TouchInput {
    controller: Gt911,
    tracker: PointerTracker,
}

impl TouchInput {
    pub fn new(controller: Gt911) -> Self {
        Self {
            controller,
            tracker: PointerTracker::new(),
        }
    }

    /// Polls the controller once and dispatches the resulting event.
    ///
    /// Returns whether more samples are pending, which the GT911 never
    /// reports.
    pub async fn poll(&mut self, window: &MinimalSoftwareWindow) -> bool {
        match self.controller.read_first().await {
            Ok(Some(sample)) => {
                if let Some(event) = self.tracker.update(sample) {
                    dispatch(window, event);
                }
            }
            Ok(None) => {}
            Err(err) => warn!("Touch read failed: {err:?}"),
        }
        false
    }
}

fn dispatch(window: &MinimalSoftwareWindow, event: PointerEvent) {
    let scale = window.scale_factor();
    let position = |x: u16, y: u16| PhysicalPosition::new(x as i32, y as i32).to_logical(scale);
    let button = PointerEventButton::Left;

    let result = match event {
        PointerEvent::Pressed { x, y } => window.try_dispatch_event(WindowEvent::PointerPressed {
            position: position(x, y),
            button,
        }),
        PointerEvent::Moved { x, y } => window.try_dispatch_event(WindowEvent::PointerMoved {
            position: position(x, y),
        }),
        PointerEvent::Released { x, y } => window
            .try_dispatch_event(WindowEvent::PointerReleased {
                position: position(x, y),
                button,
            })
            .and_then(|()| window.try_dispatch_event(WindowEvent::PointerExited)),
    };
    if let Err(err) = result {
        warn!("Pointer event {event:?} rejected: {err}");
    }
}
