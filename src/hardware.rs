//! ハードウェア初期化モジュール
//!
//! クロック設定、LEDピン、embassy上のカーネル実装を集約します。

use embassy_executor::Spawner;
use embassy_stm32::{
    gpio::{Level, Output, Speed},
    Config, Peripherals,
};

use crate::config::THREAD_PRIORITY;
use crate::kernel::{Kernel, KernelError, Thread, ThreadId};
use crate::led::LedPins;
use crate::tasks::{led_task, Blinker};

/// RCCクロック設定を初期化
///
/// HSI → PLL（÷4 × 85 ÷ 2）で170MHz生成
pub fn create_clock_config() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};

        config.rcc.hsi = true;
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R; // システムクロックをPLLに設定
    }
    config
}

/// LEDピン初期化
///
/// PC13=赤、PC14=緑、PC15=青（初期レベルHigh）
pub fn init_led_pins(p: Peripherals) -> LedPins<Output<'static>> {
    LedPins::new(
        Output::new(p.PC13, Level::High, Speed::Low),
        Output::new(p.PC14, Level::High, Speed::Low),
        Output::new(p.PC15, Level::High, Speed::Low),
    )
}

/// embassy Executor上のカーネル
///
/// スレッドモードExecutorは1つの優先度レベルしか持たないため、
/// それ以外の優先度や生成後の再開待ち（auto_start無効）は受け付けません。
/// 同一優先度のタスクはスリープ時に協調的に切り替わります。
pub struct EmbassyKernel {
    spawner: Spawner,
    priority: u32,
    spawned: u8,
}

impl EmbassyKernel {
    pub fn new(spawner: Spawner) -> Self {
        Self {
            spawner,
            priority: THREAD_PRIORITY,
            spawned: 0,
        }
    }
}

impl Kernel for EmbassyKernel {
    type Entry = Blinker<Output<'static>>;

    fn create_thread(&mut self, thread: Thread<Self::Entry>) -> Result<ThreadId, KernelError> {
        let options = thread.options;
        options.validate(thread.stack.len())?;
        if options.priority != self.priority {
            return Err(KernelError::Priority);
        }
        if !options.auto_start {
            return Err(KernelError::Start);
        }

        self.spawner
            .spawn(led_task(thread))
            .map_err(|_| KernelError::PoolExhausted)?;

        let id = ThreadId(self.spawned);
        self.spawned += 1;
        info!("{} spawned (priority {})", options.name, options.priority);
        Ok(id)
    }
}
