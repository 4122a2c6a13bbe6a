//! LED点滅スレッドの本体
//!
//! 1色のLEDをトグルし、一定tick数スリープする動作を永久に繰り返します。
//! 1回分の動作（`drive` → スリープ → `wake`）を `cycle` として切り出し、
//! `run` はそれを終了条件なしで繰り返すだけにしています。

use embedded_hal::digital::StatefulOutputPin;

use crate::config::BLINK_PERIOD_TICKS;
use crate::kernel::{TickSleep, Ticks};
use crate::led::LedColor;

/// スレッドの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkerState {
    /// トグル実行中
    Driving,
    /// タイマー満了待ち
    Sleeping,
}

/// LED点滅スレッド
pub struct Blinker<P> {
    color: LedColor,
    pin: P,
    period: Ticks,
    state: BlinkerState,
    toggles: u32,
}

impl<P: StatefulOutputPin> Blinker<P> {
    pub fn new(color: LedColor, pin: P) -> Self {
        Self {
            color,
            pin,
            period: BLINK_PERIOD_TICKS,
            state: BlinkerState::Driving,
            toggles: 0,
        }
    }

    /// トグル周期を変更（最小1tick）
    pub fn with_period(mut self, period: Ticks) -> Self {
        self.period = period.max(1);
        self
    }

    pub fn color(&self) -> LedColor {
        self.color
    }

    pub fn period(&self) -> Ticks {
        self.period
    }

    pub fn state(&self) -> BlinkerState {
        self.state
    }

    /// これまでのトグル回数（失敗したトグルも含む）
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// ピンを1回トグルしてスリープ状態に入る
    ///
    /// # Returns
    /// スリープすべきtick数
    pub fn drive(&mut self) -> Ticks {
        if self.pin.toggle().is_err() {
            warn!("{} LED toggle failed", self.color.as_str());
        }
        self.toggles = self.toggles.wrapping_add(1);
        self.state = BlinkerState::Sleeping;
        trace!("{} LED toggled ({})", self.color.as_str(), self.toggles);
        self.period
    }

    /// スリープから復帰
    pub fn wake(&mut self) {
        self.state = BlinkerState::Driving;
    }

    /// トグル1回 + スリープ1回
    pub async fn cycle<S: TickSleep>(&mut self, sleeper: &mut S) {
        let ticks = self.drive();
        sleeper.sleep_ticks(ticks).await;
        self.wake();
    }

    /// スレッドエントリ（戻らない）
    pub async fn run<S: TickSleep>(mut self, mut sleeper: S) -> ! {
        info!("{} LED thread started", self.color.as_str());

        loop {
            self.cycle(&mut sleeper).await;
        }
    }
}
