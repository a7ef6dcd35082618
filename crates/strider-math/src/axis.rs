use crate::vector::MotionVector;

/// A world axis that can be locked on a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyAxis {
    X,
    Y,
    Z,
}

impl BodyAxis {
    pub const ALL: [BodyAxis; 3] = [BodyAxis::X, BodyAxis::Y, BodyAxis::Z];

    pub fn index(self) -> usize {
        match self {
            BodyAxis::X => 0,
            BodyAxis::Y => 1,
            BodyAxis::Z => 2,
        }
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// Set of locked axes. Locked components are zeroed from applied motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxisMask(u8);

impl AxisMask {
    pub const NONE: AxisMask = AxisMask(0);

    pub fn set(&mut self, axis: BodyAxis, locked: bool) {
        if locked {
            self.0 |= axis.bit();
        } else {
            self.0 &= !axis.bit();
        }
    }

    pub fn is_locked(self, axis: BodyAxis) -> bool {
        self.0 & axis.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Zeroes every locked component of `v`. Axes beyond the vector's
    /// dimension are ignored.
    pub fn apply<V: MotionVector>(self, v: V) -> V {
        if self.is_empty() {
            return v;
        }
        let mut out = v;
        for axis in BodyAxis::ALL {
            if axis.index() < V::DIM && self.is_locked(axis) {
                out = out.with_component(axis.index(), 0.0);
            }
        }
        out
    }
}
