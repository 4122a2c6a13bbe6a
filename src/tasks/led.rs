//! LED制御タスク
//!
//! `Blinker` を embassy のタスクとして実行します。

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};

use crate::config::ticks_to_millis;
use crate::kernel::{Thread, TickSleep, Ticks};
use crate::tasks::Blinker;

/// embassy-time のタイマーによる tick スリープ
pub struct KernelSleep;

impl TickSleep for KernelSleep {
    async fn sleep_ticks(&mut self, ticks: Ticks) {
        Timer::after(Duration::from_millis(ticks_to_millis(ticks))).await;
    }
}

/// LED制御タスク
///
/// 1色につき1インスタンス、合計3つまで起動できます。
#[embassy_executor::task(pool_size = 3)]
pub async fn led_task(thread: Thread<Blinker<Output<'static>>>) -> ! {
    let Thread { options, entry, .. } = thread;
    debug!(
        "{} running (input {:#x})",
        options.name, options.initial_input
    );

    entry.run(KernelSleep).await
}
