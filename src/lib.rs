//! RGB LED点滅ファームウェア
//!
//! 赤・緑・青のLEDをそれぞれ専用スレッドで50tickごとにトグルします。
//! スレッド本体とカーネルとのインターフェースはハードウェア非依存で、
//! 実機では embassy の Executor、ホストでは `sim::SimKernel` の上で動作します。
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod app;
pub mod config;
#[cfg(target_os = "none")]
pub mod hardware;
pub mod kernel;
pub mod led;
pub mod sim;
pub mod tasks;

pub use app::{app_init, AppContext, InitError};
pub use kernel::{Kernel, KernelError, ThreadId};
pub use led::{LedColor, LedPins};
