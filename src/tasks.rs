//! タスクモジュール
//!
//! 各タスクの実装を分離して管理します。

pub mod blinker;
#[cfg(target_os = "none")]
pub mod led;

// タスク関数を再エクスポート
pub use blinker::{Blinker, BlinkerState};
#[cfg(target_os = "none")]
pub use led::{led_task, KernelSleep};
