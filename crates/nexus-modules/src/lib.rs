/// Demo/reference modules (CFG, DEV, IF, BGP, DB) implementing the
/// per-module TLV contract over the bus.
pub mod bgp;
pub mod cfg;
pub mod common;
pub mod db;
pub mod dev;
pub mod error;
pub mod ids;
pub mod interface;
pub mod tree_builder;

pub use error::ModuleError;
pub use ids::{MODULE_BGP, MODULE_CFG, MODULE_DB, MODULE_DEV, MODULE_IF};
pub use tree_builder::build_views;

/// Register every demo module's mailbox with the bus and spawn its worker
/// task, returning the join handles so a server can await clean shutdown.
pub fn spawn_all(bus: std::sync::Arc<nexus_bus::Bus>) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();

    let cfg_mailbox = nexus_bus::Mailbox::create();
    bus.register(MODULE_CFG, cfg_mailbox.clone());
    handles.push(tokio::spawn(cfg::run(bus.clone(), cfg_mailbox)));

    let dev_mailbox = nexus_bus::Mailbox::create();
    bus.register(MODULE_DEV, dev_mailbox.clone());
    handles.push(tokio::spawn(dev::run(bus.clone(), dev_mailbox)));

    let if_mailbox = nexus_bus::Mailbox::create();
    bus.register(MODULE_IF, if_mailbox.clone());
    handles.push(tokio::spawn(interface::run(bus.clone(), if_mailbox)));

    let bgp_mailbox = nexus_bus::Mailbox::create();
    bus.register(MODULE_BGP, bgp_mailbox.clone());
    handles.push(tokio::spawn(bgp::run(bus.clone(), bgp_mailbox)));

    let db_mailbox = nexus_bus::Mailbox::create();
    bus.register(MODULE_DB, db_mailbox.clone());
    handles.push(tokio::spawn(db::run(bus, db_mailbox)));

    handles
}
