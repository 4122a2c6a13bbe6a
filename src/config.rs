//! LEDスレッドとカーネルタイミングの設定パラメータ

/// スレッドスタックサイズ [byte]
pub const THREAD_STACK_SIZE: usize = 1024;

/// スレッド優先度（3スレッドとも同一）
pub const THREAD_PRIORITY: u32 = 15;

/// プリエンプションしきい値（優先度と同じ = しきい値による保護なし）
pub const THREAD_PREEMPT_THRESHOLD: u32 = 15;

/// タイムスライス [tick]
pub const THREAD_TIME_SLICE: u32 = 1;

/// スレッド生成時に渡す引数（LEDスレッドでは未使用）
pub const THREAD_INITIAL_INPUT: u32 = 0x1234;

/// LEDトグル周期 [tick]
pub const BLINK_PERIOD_TICKS: u32 = 50;

/// LEDスレッド数（赤・緑・青）
pub const BLINKER_COUNT: usize = 3;

/// カーネルtick周波数 [Hz]（100Hz = 10ms/tick、50tickで500ms）
pub const KERNEL_TICK_HZ: u32 = 100;

/// 優先度の上限（0が最高、MAX_PRIORITIES - 1が最低）
pub const MAX_PRIORITIES: u32 = 32;

/// 最小スタックサイズ [byte]（Cortex-Mのコンテキスト保存領域）
pub const MINIMUM_STACK: usize = 200;

/// tick数をミリ秒に変換
pub const fn ticks_to_millis(ticks: u32) -> u64 {
    ticks as u64 * 1000 / KERNEL_TICK_HZ as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_period_is_500ms() {
        assert_eq!(ticks_to_millis(BLINK_PERIOD_TICKS), 500);
    }

    #[test]
    fn test_ticks_to_millis_rounds_down() {
        assert_eq!(ticks_to_millis(0), 0);
        assert_eq!(ticks_to_millis(1), 10);
        assert_eq!(ticks_to_millis(u32::MAX), u32::MAX as u64 * 10);
    }
}
