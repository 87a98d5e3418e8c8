//! Indicator LED types

/// Addressable indicator LEDs on the base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Battery,
    Info,
}

/// Indicator colors supported by the base controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Red,
    Yellow,
    Green,
    Blue,
}

/// Indicator modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Solid,
    Pulse,
    Off,
}

impl Led {
    /// Protocol name of the LED
    pub fn as_str(&self) -> &'static str {
        match self {
            Led::Battery => "battery",
            Led::Info => "info",
        }
    }
}

impl LedColor {
    /// Protocol name of the color
    pub fn as_str(&self) -> &'static str {
        match self {
            LedColor::Red => "red",
            LedColor::Yellow => "yellow",
            LedColor::Green => "green",
            LedColor::Blue => "blue",
        }
    }
}

impl LedMode {
    /// Protocol name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            LedMode::Solid => "solid",
            LedMode::Pulse => "pulse",
            LedMode::Off => "off",
        }
    }
}
