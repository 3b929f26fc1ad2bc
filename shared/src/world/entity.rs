use std::fmt;

/// An opaque, process-local entity handle. Carries no data itself; it is a
/// key into the component table. Handles are never transmitted across peers
/// directly; see [`NetworkEntity`](super::NetworkEntity).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
