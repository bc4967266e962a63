//! The three game buttons: D-pad left, D-pad right and A (lock / fire).
//!
//! Pins only ever get sampled here; debouncing happens in the main loop.

use embassy_futures::select::select3;
use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::{
    ButtonResources,
    debounce::{
        BUTTON_COUNT,
        Level,
        LevelLatch,
    },
};

pub struct Buttons {
    pub left: Input<'static>,
    pub right: Input<'static>,
    pub confirm: Input<'static>,
}

impl From<ButtonResources<'static>> for Buttons {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            left: Input::new(res.left, pull_up),
            right: Input::new(res.right, pull_up),
            confirm: Input::new(res.confirm, pull_up),
        }
    }
}

impl Buttons {
    /// Raw levels in [`Button::ALL`](crate::Button::ALL) order.
    pub fn levels(&self) -> [Level; BUTTON_COUNT] {
        [
            Level::from_high(self.left.is_high()),
            Level::from_high(self.right.is_high()),
            Level::from_high(self.confirm.is_high()),
        ]
    }

    /// Record the current levels into `latch`.
    pub fn record(&self, latch: &LevelLatch) {
        for (button, level) in crate::Button::ALL.into_iter().zip(self.levels()) {
            latch.record(button, level);
        }
    }

    /// Keep `latch` in step with the pins, waking on every edge.
    pub async fn watch(&mut self, latch: &LevelLatch) -> ! {
        loop {
            self.record(latch);
            select3(
                self.left.wait_for_any_edge(),
                self.right.wait_for_any_edge(),
                self.confirm.wait_for_any_edge(),
            )
            .await;
        }
    }
}
