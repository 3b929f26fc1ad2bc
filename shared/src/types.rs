/// Logical clock value, monotonically increasing per (entity, component)
/// on the writing peer. Comparison of timestamps is the only mechanism that
/// orders writes across peers.
pub type Timestamp = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostRole {
    Server,
    Client,
}

impl HostRole {
    pub fn is_server(&self) -> bool {
        matches!(self, HostRole::Server)
    }
}
