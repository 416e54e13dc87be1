use std::collections::{HashSet, VecDeque};

use easel_core::Vec2;

use super::types::{Input, Key, MouseButton};

/// Bound on unconsumed queued events; programs that never call a wait
/// function must not accumulate memory.
const QUEUE_CAP: usize = 256;

/// Polled input state for the window.
///
/// Holds "is down" information, the pointer position (device pixels) and
/// the accumulated wheel position. Edge transitions go to [`InputQueue`].
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    /// Pointer position in device pixels, if inside the window.
    pub pointer: Option<Vec2>,
    /// Accumulated mouse wheel position (positive = away from the user).
    pub wheel_pos: f64,
    keys_down: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
}

impl InputState {
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    pub fn press_key(&mut self, queue: &mut InputQueue, key: Key) {
        if self.keys_down.insert(key) {
            queue.push(Input::Key(key));
        }
    }

    pub fn release_key(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    pub fn press_button(&mut self, queue: &mut InputQueue, btn: MouseButton) {
        if self.buttons_down.insert(btn) {
            queue.push(Input::Mouse(btn));
        }
    }

    pub fn release_button(&mut self, btn: MouseButton) {
        self.buttons_down.remove(&btn);
    }

    pub fn scroll(&mut self, queue: &mut InputQueue, delta: f64) {
        if delta == 0.0 {
            return;
        }
        self.wheel_pos += delta;
        queue.push(if delta > 0.0 { Input::WheelUp } else { Input::WheelDown });
    }

    /// Focus change. On focus loss the "down" sets are cleared so keys do
    /// not stick when released outside the window.
    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.keys_down.clear();
            self.buttons_down.clear();
        }
    }
}

/// Edge-triggered press events and committed text, consumed by the
/// blocking wait calls and `read_line`.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<Input>,
    text: VecDeque<String>,
}

impl InputQueue {
    fn push(&mut self, ev: Input) {
        if self.events.len() == QUEUE_CAP {
            self.events.pop_front();
        }
        self.events.push_back(ev);
    }

    pub fn push_text(&mut self, text: String) {
        if self.text.len() == QUEUE_CAP {
            self.text.pop_front();
        }
        self.text.push_back(text);
    }

    /// Pops the oldest queued event matching `filter`, discarding
    /// non-matching events that precede it.
    pub fn take_next(&mut self, filter: impl Fn(Input) -> bool) -> Option<Input> {
        while let Some(ev) = self.events.pop_front() {
            if filter(ev) {
                return Some(ev);
            }
        }
        None
    }

    pub fn take_text(&mut self) -> Option<String> {
        self.text.pop_front()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_repeat_queues_only_one_event() {
        let mut state = InputState::default();
        let mut queue = InputQueue::default();
        state.press_key(&mut queue, Key::A);
        state.press_key(&mut queue, Key::A); // OS auto-repeat
        assert_eq!(queue.take_next(|_| true), Some(Input::Key(Key::A)));
        assert_eq!(queue.take_next(|_| true), None);
    }

    #[test]
    fn release_and_repress_queues_again() {
        let mut state = InputState::default();
        let mut queue = InputQueue::default();
        state.press_key(&mut queue, Key::A);
        state.release_key(Key::A);
        state.press_key(&mut queue, Key::A);
        assert_eq!(queue.take_next(|_| true), Some(Input::Key(Key::A)));
        assert_eq!(queue.take_next(|_| true), Some(Input::Key(Key::A)));
    }

    #[test]
    fn take_next_skips_non_matching_events() {
        let mut state = InputState::default();
        let mut queue = InputQueue::default();
        state.press_button(&mut queue, MouseButton::Left);
        state.press_key(&mut queue, Key::Space);
        let got = queue.take_next(|ev| matches!(ev, Input::Key(_)));
        assert_eq!(got, Some(Input::Key(Key::Space)));
        // the mouse press before it was discarded
        assert_eq!(queue.take_next(|_| true), None);
    }

    #[test]
    fn focus_loss_clears_down_sets() {
        let mut state = InputState::default();
        let mut queue = InputQueue::default();
        state.press_key(&mut queue, Key::W);
        state.press_button(&mut queue, MouseButton::Right);
        state.set_focus(false);
        assert!(!state.key_down(Key::W));
        assert!(!state.button_down(MouseButton::Right));
    }

    #[test]
    fn wheel_accumulates_and_queues_direction_events() {
        let mut state = InputState::default();
        let mut queue = InputQueue::default();
        state.scroll(&mut queue, 2.0);
        state.scroll(&mut queue, -3.0);
        assert_eq!(state.wheel_pos, -1.0);
        assert_eq!(queue.take_next(|_| true), Some(Input::WheelUp));
        assert_eq!(queue.take_next(|_| true), Some(Input::WheelDown));
    }

    #[test]
    fn queue_is_bounded() {
        let mut state = InputState::default();
        let mut queue = InputQueue::default();
        for _ in 0..(QUEUE_CAP + 50) {
            state.press_key(&mut queue, Key::X);
            state.release_key(Key::X);
        }
        let mut n = 0;
        while queue.take_next(|_| true).is_some() {
            n += 1;
        }
        assert_eq!(n, QUEUE_CAP);
    }
}
