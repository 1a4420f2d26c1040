//! Raw pointer events as the host delivers them
//!
//! Mirrors a platform motion event: every event carries the position of every pointer
//! currently down, in the order the pointers went down. For [`TouchAction::PointerUp`] the
//! lifting pointer is still in the list.

use kurbo::Point;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TouchAction {
    /// The first pointer went down
    Down,
    /// Another pointer went down; it is at this index
    PointerDown(usize),
    Move,
    /// A pointer other than the last one went up; it was at this index
    PointerUp(usize),
    /// The last pointer went up
    Up,
    /// The sequence was taken away, for example by an ancestor
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointers: Vec<Point>,
    /// Seconds, same clock as frame ticks
    pub time: f64,
}

impl TouchEvent {
    pub fn new(action: TouchAction, pointers: Vec<Point>, time: f64) -> Self {
        Self {
            action,
            pointers,
            time,
        }
    }

    pub fn down(time: f64, at: impl Into<Point>) -> Self {
        Self::new(TouchAction::Down, vec![at.into()], time)
    }

    pub fn moved(time: f64, pointers: Vec<Point>) -> Self {
        Self::new(TouchAction::Move, pointers, time)
    }

    pub fn up(time: f64, at: impl Into<Point>) -> Self {
        Self::new(TouchAction::Up, vec![at.into()], time)
    }

    pub fn cancel(time: f64) -> Self {
        Self::new(TouchAction::Cancel, Vec::new(), time)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn primary(&self) -> Option<Point> {
        self.pointers.first().copied()
    }

    /// Pointers still down once this event has been handled
    pub fn remaining(&self) -> Vec<Point> {
        match self.action {
            TouchAction::Up | TouchAction::Cancel => Vec::new(),
            TouchAction::PointerUp(index) => self
                .pointers
                .iter()
                .enumerate()
                .filter_map(|(i, p)| (i != index).then_some(*p))
                .collect(),
            _ => self.pointers.clone(),
        }
    }
}
