//! アプリケーション初期化
//!
//! 赤・緑・青の各LEDスレッドを生成します。スタックは起動時に一度だけ
//! 確保される `AppContext` が所有し、生成後は各スレッドに貸し出されたままになります。

use embedded_hal::digital::StatefulOutputPin;

use crate::config::BLINKER_COUNT;
use crate::kernel::{Kernel, KernelError, Thread, ThreadId, ThreadOptions, ThreadStack};
use crate::led::{LedColor, LedPins};
use crate::tasks::Blinker;

/// 起動時に確保されるアプリケーション資源
pub struct AppContext {
    stacks: [ThreadStack; BLINKER_COUNT],
}

impl AppContext {
    pub const fn new() -> Self {
        Self {
            stacks: [ThreadStack::new(), ThreadStack::new(), ThreadStack::new()],
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 初期化エラー（最初に失敗したスレッド）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitError {
    pub color: LedColor,
    pub error: KernelError,
}

impl InitError {
    pub const fn status_code(&self) -> u32 {
        self.error.status_code()
    }
}

/// LEDスレッドを3つ生成
///
/// 途中で失敗しても残りのスレッドの生成は続行し、最初のエラーを返します。
/// メモリプール引数は取りません（スタックは `AppContext` が所有）。
///
/// # Returns
/// 赤・緑・青の順のスレッドハンドル
pub fn app_init<K, P>(
    kernel: &mut K,
    ctx: &'static mut AppContext,
    pins: LedPins<P>,
) -> Result<[ThreadId; BLINKER_COUNT], InitError>
where
    K: Kernel<Entry = Blinker<P>>,
    P: StatefulOutputPin,
{
    let mut threads = [ThreadId(0); BLINKER_COUNT];
    let mut first_error = None;

    for ((color, stack), pin) in LedColor::ALL
        .into_iter()
        .zip(ctx.stacks.iter_mut())
        .zip(pins.into_array())
    {
        let thread = Thread {
            options: ThreadOptions::blinker(color),
            stack,
            entry: Blinker::new(color, pin),
        };

        match kernel.create_thread(thread) {
            Ok(id) => {
                debug!("{} created (id {})", color.thread_name(), id.0);
                threads[color.index()] = id;
            }
            Err(error) => {
                error!(
                    "Failed to create {}: {} ({:#x})",
                    color.thread_name(),
                    error.as_str(),
                    error.status_code()
                );
                first_error.get_or_insert(InitError { color, error });
            }
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => {
            info!("{} LED threads created", BLINKER_COUNT);
            Ok(threads)
        }
    }
}
