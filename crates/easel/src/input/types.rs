use std::fmt;

/// Keyboard key identifier.
///
/// Covers the keys a teaching program can reasonably ask about; anything
/// else arrives as `Key::Unknown`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,
    CapsLock,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits (top row)
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Punctuation
    Comma,
    Minus,
    Period,
    Slash,
    Semicolon,
    Equal,
    BracketLeft,
    BracketRight,
    Backslash,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,
    PrintScreen,
    ScrollLock,
    Pause,

    // Keypad
    NumLock,
    Keypad0, Keypad1, Keypad2, Keypad3, Keypad4,
    Keypad5, Keypad6, Keypad7, Keypad8, Keypad9,
    KeypadDivide,
    KeypadMultiply,
    KeypadSubtract,
    KeypadAdd,
    KeypadEnter,
    KeypadDecimal,

    /// Platform-dependent key not represented above.
    Unknown,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// One discrete input occurrence, as reported by the wait calls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Input {
    Key(Key),
    Mouse(MouseButton),
    WheelUp,
    WheelDown,
}

/// Result of a blocking wait call.
///
/// `TimedOut` and `Closed` are the two sentinels: the requested time
/// passed with no input, or the window was closed while waiting.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WaitResult {
    Input(Input),
    TimedOut,
    Closed,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
