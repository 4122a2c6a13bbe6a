//! RGB LEDの識別子とピンセット

use crate::config::BLINKER_COUNT;

/// LEDの色（1色につき1スレッド）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Red,
    Green,
    Blue,
}

impl LedColor {
    /// スレッド生成順
    pub const ALL: [LedColor; BLINKER_COUNT] = [LedColor::Red, LedColor::Green, LedColor::Blue];

    pub const fn index(self) -> usize {
        match self {
            LedColor::Red => 0,
            LedColor::Green => 1,
            LedColor::Blue => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LedColor::Red => "red",
            LedColor::Green => "green",
            LedColor::Blue => "blue",
        }
    }

    /// カーネルに登録するスレッド名
    pub const fn thread_name(self) -> &'static str {
        match self {
            LedColor::Red => "Red LED",
            LedColor::Green => "Green LED",
            LedColor::Blue => "Blue LED",
        }
    }
}

/// 3色分の出力ピン
pub struct LedPins<P> {
    pub red: P,
    pub green: P,
    pub blue: P,
}

impl<P> LedPins<P> {
    pub fn new(red: P, green: P, blue: P) -> Self {
        Self { red, green, blue }
    }

    /// `LedColor::ALL` と同じ順序で取り出す
    pub fn into_array(self) -> [P; BLINKER_COUNT] {
        [self.red, self.green, self.blue]
    }
}
