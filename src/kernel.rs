//! カーネルとのインターフェース
//!
//! スレッド生成パラメータ、スタック領域、生成エラー、
//! およびカーネル実装（組込み/シミュレータ）が満たすトレイトを定義します。

use core::ops::Range;

use crate::config::{
    MAX_PRIORITIES, MINIMUM_STACK, THREAD_INITIAL_INPUT, THREAD_PREEMPT_THRESHOLD,
    THREAD_PRIORITY, THREAD_STACK_SIZE, THREAD_TIME_SLICE,
};
use crate::led::LedColor;

/// カーネルtick数
pub type Ticks = u32;

/// スレッド生成パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadOptions {
    /// スレッド名
    pub name: &'static str,
    /// 優先度（0が最高）
    pub priority: u32,
    /// プリエンプションしきい値
    pub preempt_threshold: u32,
    /// タイムスライス [tick]（0でタイムスライスなし）
    pub time_slice: Ticks,
    /// 生成直後に実行可能にするか
    pub auto_start: bool,
    /// エントリに渡す引数
    pub initial_input: u32,
}

impl ThreadOptions {
    /// LEDスレッド用のパラメータ
    pub const fn blinker(color: LedColor) -> Self {
        Self {
            name: color.thread_name(),
            priority: THREAD_PRIORITY,
            preempt_threshold: THREAD_PREEMPT_THRESHOLD,
            time_slice: THREAD_TIME_SLICE,
            auto_start: true,
            initial_input: THREAD_INITIAL_INPUT,
        }
    }

    /// 生成前のパラメータ検証
    pub fn validate(&self, stack_size: usize) -> Result<(), KernelError> {
        if stack_size < MINIMUM_STACK {
            return Err(KernelError::Size);
        }
        if self.priority >= MAX_PRIORITIES {
            return Err(KernelError::Priority);
        }
        if self.preempt_threshold > self.priority {
            return Err(KernelError::Threshold);
        }
        Ok(())
    }

    /// 実際に適用されるタイムスライス
    ///
    /// しきい値が優先度より高い場合、同一優先度間のタイムスライスは無効になります。
    pub const fn effective_time_slice(&self) -> Ticks {
        if self.preempt_threshold < self.priority {
            0
        } else {
            self.time_slice
        }
    }
}

/// スレッドスタック
///
/// Cortex-Mのスタックは8バイト境界が必要。
#[repr(C, align(8))]
pub struct ThreadStack([u8; THREAD_STACK_SIZE]);

impl ThreadStack {
    pub const fn new() -> Self {
        Self([0; THREAD_STACK_SIZE])
    }

    pub const fn len(&self) -> usize {
        THREAD_STACK_SIZE
    }

    pub fn region(&self) -> StackRegion {
        let Range { start, end } = self.0.as_ptr_range();
        StackRegion {
            start: start as usize,
            end: end as usize,
        }
    }
}

impl Default for ThreadStack {
    fn default() -> Self {
        Self::new()
    }
}

/// スタックのアドレス範囲 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackRegion {
    pub start: usize,
    pub end: usize,
}

impl StackRegion {
    pub fn overlaps(&self, other: &StackRegion) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// 生成済みスレッドのハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadId(pub u8);

impl ThreadId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// カーネルに渡すスレッド一式
pub struct Thread<E> {
    pub options: ThreadOptions,
    pub stack: &'static mut ThreadStack,
    pub entry: E,
}

/// スレッド生成エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// 不正または生成済みのスレッド
    Thread,
    /// 不正なスタック領域（他スレッドと重複など）
    Pointer,
    /// スタックサイズ不足
    Size,
    /// 優先度が範囲外
    Priority,
    /// しきい値が優先度より低い
    Threshold,
    /// 開始モードが非対応
    Start,
    /// サスペンド中でないスレッドの再開
    Resume,
    /// スレッド領域の枯渇
    PoolExhausted,
}

impl KernelError {
    /// ThreadX互換のステータスコード
    pub const fn status_code(self) -> u32 {
        match self {
            KernelError::Pointer => 0x03,
            KernelError::Size => 0x05,
            KernelError::Thread => 0x0E,
            KernelError::Priority => 0x0F,
            KernelError::PoolExhausted => 0x10,
            KernelError::Start => 0x10,
            KernelError::Resume => 0x12,
            KernelError::Threshold => 0x18,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            KernelError::Thread => "invalid thread",
            KernelError::Pointer => "invalid stack region",
            KernelError::Size => "stack too small",
            KernelError::Priority => "priority out of range",
            KernelError::Threshold => "preemption threshold above priority",
            KernelError::Start => "unsupported start mode",
            KernelError::Resume => "thread not suspended",
            KernelError::PoolExhausted => "no thread slot available",
        }
    }
}

/// スレッドを生成するカーネル
pub trait Kernel {
    /// スレッドのエントリ状態
    type Entry;

    fn create_thread(&mut self, thread: Thread<Self::Entry>) -> Result<ThreadId, KernelError>;
}

/// tick単位のスリープ
///
/// スレッドが他のスレッドにCPUを譲る唯一のポイント。
#[allow(async_fn_in_trait)]
pub trait TickSleep {
    async fn sleep_ticks(&mut self, ticks: Ticks);
}
