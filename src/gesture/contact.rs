use std::ops::Index;

use tokio::time::Instant;

use super::GestureError;

/// Maximum number of simultaneous contacts tracked by the engine
pub const MAX_CONTACTS: usize = 10;

/// Raw contact sample as delivered by the digitizer transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawTouchSample {
    pub contact_id: u32,
    pub x: u16,
    pub y: u16,
    pub down: bool,
}

impl RawTouchSample {
    pub fn new(contact_id: u32, x: u16, y: u16, down: bool) -> Self {
        Self {
            contact_id,
            x,
            y,
            down,
        }
    }
}

/// Validated finger slot in the range `0..MAX_CONTACTS`. Slot 0 is the focus
/// finger that drives cursor, scroll and tap detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactSlot(u8);

impl ContactSlot {
    /// The focus finger
    pub const FOCUS: ContactSlot = ContactSlot(0);

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub fn is_focus(&self) -> bool {
        *self == ContactSlot::FOCUS
    }
}

impl TryFrom<u32> for ContactSlot {
    type Error = GestureError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        if id as usize >= MAX_CONTACTS {
            return Err(GestureError::InvalidInput(format!(
                "contact id {id} is out of range (max {})",
                MAX_CONTACTS - 1
            )));
        }
        Ok(ContactSlot(id as u8))
    }
}

/// Last known sample of a single finger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub slot: ContactSlot,
    pub x: i32,
    pub y: i32,
    pub down: bool,
    pub timestamp: Instant,
}

impl TouchPoint {
    /// A lifted finger at the origin
    fn idle(slot: ContactSlot, timestamp: Instant) -> Self {
        Self {
            slot,
            x: 0,
            y: 0,
            down: false,
            timestamp,
        }
    }

    /// Stamp the given raw sample with the current time
    pub fn from_sample(slot: ContactSlot, sample: &RawTouchSample) -> Self {
        Self {
            slot,
            x: sample.x as i32,
            y: sample.y as i32,
            down: sample.down,
            timestamp: Instant::now(),
        }
    }

    /// Manhattan distance between two points
    pub fn distance(&self, other: &TouchPoint) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Fixed-size table of the last sample of every finger slot
#[derive(Debug, Clone, Copy)]
pub struct ContactArray {
    points: [TouchPoint; MAX_CONTACTS],
}

impl ContactArray {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            points: std::array::from_fn(|i| TouchPoint::idle(ContactSlot(i as u8), now)),
        }
    }

    /// Store the given point in its slot
    pub fn set(&mut self, point: TouchPoint) {
        self.points[point.slot.index()] = point;
    }

    /// Reset every slot to a lifted finger
    pub fn clear(&mut self) {
        *self = ContactArray::new();
    }

    /// Number of slots currently down
    pub fn down_count(&self) -> usize {
        self.points.iter().filter(|point| point.down).count()
    }
}

impl Default for ContactArray {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<ContactSlot> for ContactArray {
    type Output = TouchPoint;

    fn index(&self, slot: ContactSlot) -> &Self::Output {
        &self.points[slot.index()]
    }
}
