//! ホスト用シミュレーションカーネル
//!
//! 実機なしでスレッド生成と tick 駆動のスケジューリングを再現します。
//! 各 tick で、スリープが満了したスレッドを実行可能キューに戻し、
//! 優先度の高い順（同一優先度は到着順 = ラウンドロビン）に1ステップずつ実行します。

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use heapless::Vec;

use crate::kernel::{
    Kernel, KernelError, StackRegion, Thread, ThreadId, ThreadOptions, ThreadStack, Ticks,
};
use crate::led::LedColor;
use crate::tasks::{Blinker, BlinkerState};

/// シミュレーション用GPIO出力
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
    toggles: u32,
}

impl SimPin {
    pub const fn new() -> Self {
        Self {
            high: false,
            toggles: 0,
        }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    pub fn toggles(&self) -> u32 {
        self.toggles
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.high = !self.high;
        self.toggles = self.toggles.wrapping_add(1);
        Ok(())
    }
}

/// スレッドの実行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    /// 実行可能
    Ready,
    /// 指定 tick までスリープ
    Sleeping { until: u64 },
    /// 再開待ち
    Suspended,
}

/// 生成済みスレッド
pub struct SimThread<P> {
    options: ThreadOptions,
    stack: &'static mut ThreadStack,
    blinker: Blinker<P>,
    status: SimStatus,
    runs: u32,
    last_run: Option<u64>,
}

impl<P: StatefulOutputPin> SimThread<P> {
    pub fn options(&self) -> &ThreadOptions {
        &self.options
    }

    pub fn color(&self) -> LedColor {
        self.blinker.color()
    }

    pub fn stack(&self) -> StackRegion {
        self.stack.region()
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn blinker(&self) -> &Blinker<P> {
        &self.blinker
    }

    /// 実行回数
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// 最後に実行された順番（全スレッド通し番号）
    pub fn last_run(&self) -> Option<u64> {
        self.last_run
    }

    pub fn is_schedulable(&self) -> bool {
        !matches!(self.status, SimStatus::Suspended)
    }
}

/// tick 駆動のシミュレーションカーネル（最大 `N` スレッド）
pub struct SimKernel<P, const N: usize> {
    threads: Vec<SimThread<P>, N>,
    ready: Vec<usize, N>,
    now: u64,
    sequence: u64,
}

impl<P: StatefulOutputPin, const N: usize> SimKernel<P, N> {
    pub const fn new() -> Self {
        Self {
            threads: Vec::new(),
            ready: Vec::new(),
            now: 0,
            sequence: 0,
        }
    }

    /// 現在の tick
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn threads(&self) -> &[SimThread<P>] {
        &self.threads
    }

    pub fn thread(&self, id: ThreadId) -> Option<&SimThread<P>> {
        self.threads.get(id.index())
    }

    /// サスペンド中のスレッドを実行可能にする
    pub fn resume(&mut self, id: ThreadId) -> Result<(), KernelError> {
        let thread = self
            .threads
            .get_mut(id.index())
            .ok_or(KernelError::Thread)?;
        if thread.status != SimStatus::Suspended {
            return Err(KernelError::Resume);
        }
        thread.status = SimStatus::Ready;
        self.ready
            .push(id.index())
            .map_err(|_| KernelError::Thread)
    }

    /// 1 tick 進める
    pub fn tick(&mut self) {
        for (index, thread) in self.threads.iter_mut().enumerate() {
            if let SimStatus::Sleeping { until } = thread.status {
                if until <= self.now {
                    thread.blinker.wake();
                    thread.status = SimStatus::Ready;
                    // キュー容量はスレッド数と同じなので溢れない
                    let _ = self.ready.push(index);
                }
            }
        }

        while let Some(index) = self.next_ready() {
            let thread = &mut self.threads[index];
            debug_assert_eq!(thread.blinker.state(), BlinkerState::Driving);

            let ticks = thread.blinker.drive();
            thread.status = SimStatus::Sleeping {
                until: self.now + u64::from(ticks),
            };
            thread.runs = thread.runs.wrapping_add(1);
            thread.last_run = Some(self.sequence);
            self.sequence += 1;
        }

        self.now += 1;
    }

    pub fn run_for(&mut self, ticks: Ticks) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// 最高優先度（数値が最小）の先頭スレッドをキューから取り出す
    fn next_ready(&mut self) -> Option<usize> {
        let threads = &self.threads;
        let position = self
            .ready
            .iter()
            .enumerate()
            .min_by_key(|&(position, &index)| (threads[index].options.priority, position))
            .map(|(position, _)| position)?;
        Some(self.ready.remove(position))
    }
}

impl<P: StatefulOutputPin, const N: usize> Default for SimKernel<P, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StatefulOutputPin, const N: usize> Kernel for SimKernel<P, N> {
    type Entry = Blinker<P>;

    fn create_thread(&mut self, thread: Thread<Self::Entry>) -> Result<ThreadId, KernelError> {
        let Thread {
            options,
            stack,
            entry,
        } = thread;

        options.validate(stack.len())?;

        let region = stack.region();
        if self.threads.iter().any(|t| t.stack().overlaps(&region)) {
            return Err(KernelError::Pointer);
        }
        if self.threads.is_full() {
            return Err(KernelError::PoolExhausted);
        }

        let index = self.threads.len();
        // ハンドルは u8 なので 256 スレッド目以降は生成できない
        let id = u8::try_from(index)
            .map(ThreadId)
            .map_err(|_| KernelError::PoolExhausted)?;
        let status = if options.auto_start {
            SimStatus::Ready
        } else {
            SimStatus::Suspended
        };

        self.threads
            .push(SimThread {
                options,
                stack,
                blinker: entry,
                status,
                runs: 0,
                last_run: None,
            })
            .map_err(|_| KernelError::PoolExhausted)?;
        if options.auto_start {
            self.ready
                .push(index)
                .map_err(|_| KernelError::PoolExhausted)?;
        }

        debug!(
            "{} created: priority {}, time slice {}",
            options.name,
            options.priority,
            options.effective_time_slice()
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{app_init, AppContext};
    use crate::led::LedPins;
    use std::boxed::Box;

    fn leak_stack() -> &'static mut ThreadStack {
        Box::leak(Box::new(ThreadStack::new()))
    }

    fn started_kernel() -> SimKernel<SimPin, 3> {
        let mut kernel = SimKernel::new();
        let ctx = Box::leak(Box::new(AppContext::new()));
        let pins = LedPins::new(SimPin::new(), SimPin::new(), SimPin::new());
        app_init(&mut kernel, ctx, pins).unwrap();
        kernel
    }

    fn spawn(
        kernel: &mut SimKernel<SimPin, 3>,
        color: LedColor,
        options: ThreadOptions,
    ) -> Result<ThreadId, KernelError> {
        kernel.create_thread(Thread {
            options,
            stack: leak_stack(),
            entry: Blinker::new(color, SimPin::new()),
        })
    }

    #[test]
    fn test_500_ticks_toggle_each_pin_10_times() {
        let mut kernel = started_kernel();
        kernel.run_for(500);

        assert_eq!(kernel.now(), 500);
        for thread in kernel.threads() {
            assert_eq!(thread.blinker().pin().toggles(), 10);
            assert_eq!(thread.blinker().toggles(), 10);
            assert_eq!(thread.runs(), 10);
            // 偶数回トグルしたので初期レベル（low）に戻る
            assert!(!thread.blinker().pin().is_high());
        }
    }

    #[test]
    fn test_toggles_on_period_boundaries() {
        let mut kernel = started_kernel();

        kernel.tick();
        assert!(kernel.threads().iter().all(|t| t.runs() == 1));

        kernel.run_for(49);
        assert!(kernel.threads().iter().all(|t| t.runs() == 1));
        assert_eq!(
            kernel.threads()[0].status(),
            SimStatus::Sleeping { until: 50 }
        );

        kernel.tick();
        assert!(kernel.threads().iter().all(|t| t.runs() == 2));
    }

    #[test]
    fn test_equal_priority_runs_in_creation_order() {
        let mut kernel = started_kernel();
        kernel.tick();

        let order: std::vec::Vec<_> = kernel
            .threads()
            .iter()
            .map(|t| t.last_run().unwrap())
            .collect();
        assert_eq!(order, [0, 1, 2]);
    }

    #[test]
    fn test_higher_priority_runs_first() {
        let mut kernel = SimKernel::<SimPin, 3>::new();
        let low = spawn(&mut kernel, LedColor::Red, ThreadOptions::blinker(LedColor::Red)).unwrap();

        let mut options = ThreadOptions::blinker(LedColor::Green);
        options.priority = 5;
        options.preempt_threshold = 5;
        let high = spawn(&mut kernel, LedColor::Green, options).unwrap();

        kernel.tick();
        let low_seq = kernel.thread(low).unwrap().last_run().unwrap();
        let high_seq = kernel.thread(high).unwrap().last_run().unwrap();
        assert!(high_seq < low_seq);
    }

    #[test]
    fn test_suspended_thread_waits_for_resume() {
        let mut kernel = SimKernel::<SimPin, 3>::new();
        let mut options = ThreadOptions::blinker(LedColor::Blue);
        options.auto_start = false;
        let id = spawn(&mut kernel, LedColor::Blue, options).unwrap();

        assert!(!kernel.thread(id).unwrap().is_schedulable());
        kernel.run_for(100);
        assert_eq!(kernel.thread(id).unwrap().runs(), 0);

        kernel.resume(id).unwrap();
        assert_eq!(kernel.resume(id), Err(KernelError::Resume));
        kernel.run_for(100);
        assert_eq!(kernel.thread(id).unwrap().runs(), 2);
    }

    #[test]
    fn test_resume_unknown_thread() {
        let mut kernel = SimKernel::<SimPin, 3>::new();
        assert_eq!(kernel.resume(ThreadId(7)), Err(KernelError::Thread));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut kernel = SimKernel::<SimPin, 3>::new();
        let mut options = ThreadOptions::blinker(LedColor::Red);
        options.preempt_threshold = 20;

        assert_eq!(
            spawn(&mut kernel, LedColor::Red, options),
            Err(KernelError::Threshold)
        );
        assert!(kernel.threads().is_empty());
    }

    #[test]
    fn test_pool_exhausted() {
        let mut kernel = started_kernel();
        assert_eq!(
            spawn(&mut kernel, LedColor::Red, ThreadOptions::blinker(LedColor::Red)),
            Err(KernelError::PoolExhausted)
        );
    }

    #[test]
    fn test_custom_period() {
        let mut kernel = SimKernel::<SimPin, 3>::new();
        let id = kernel
            .create_thread(Thread {
                options: ThreadOptions::blinker(LedColor::Red),
                stack: leak_stack(),
                entry: Blinker::new(LedColor::Red, SimPin::new()).with_period(10),
            })
            .unwrap();

        kernel.run_for(100);
        assert_eq!(kernel.thread(id).unwrap().runs(), 10);
    }

    #[test]
    fn test_pin_toggle_count_wraps() {
        let mut pin = SimPin {
            high: false,
            toggles: u32::MAX,
        };
        pin.toggle().unwrap();
        assert_eq!(pin.toggles(), 0);
        assert!(pin.is_high());
    }

    #[test]
    fn test_run_count_wraps() {
        let mut kernel = started_kernel();
        for thread in kernel.threads.iter_mut() {
            thread.runs = u32::MAX;
        }

        kernel.tick();
        for thread in kernel.threads() {
            assert_eq!(thread.runs(), 0);
        }
    }

    #[test]
    fn test_thread_ids_limited_to_u8() {
        let mut kernel = SimKernel::<SimPin, 300>::new();
        let create = |kernel: &mut SimKernel<SimPin, 300>| {
            kernel.create_thread(Thread {
                options: ThreadOptions::blinker(LedColor::Green),
                stack: leak_stack(),
                entry: Blinker::new(LedColor::Green, SimPin::new()),
            })
        };

        for index in 0..=u8::MAX {
            assert_eq!(create(&mut kernel), Ok(ThreadId(index)));
        }
        assert_eq!(create(&mut kernel), Err(KernelError::PoolExhausted));
        assert_eq!(kernel.threads().len(), 256);
    }
}
