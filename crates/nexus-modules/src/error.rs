/// Errors raised while a demo module processes a dispatched command.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("malformed command frame for group {group_id}")]
    MalformedFrame { group_id: u32 },

    #[error("interface {0} does not exist")]
    NoSuchInterface(String),

    #[error(transparent)]
    Bus(#[from] nexus_bus::BusError),
}
