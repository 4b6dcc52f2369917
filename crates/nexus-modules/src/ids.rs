/// Module, view, and command-group identifiers shared between the demo
/// modules and their tree fragments. In the original source these lived as
/// scattered `#define`s per module (`nn_if_map.h`, `nn_bgp_cfg.h`, ...);
/// here they are centralized so `nexus-tree` construction and dispatch
/// handling can't drift apart.
pub const MODULE_CFG: u32 = 1;
pub const MODULE_DEV: u32 = 2;
pub const MODULE_IF: u32 = 3;
pub const MODULE_BGP: u32 = 4;
pub const MODULE_DB: u32 = 5;

pub const CONFIG_VIEW_ID: u32 = 2;
pub const CONFIG_IF_VIEW_ID: u32 = 3;

pub const GROUP_CONFIGURE: u32 = 10;
pub const GROUP_SHOW_VERSION: u32 = 11;

pub const GROUP_SHOW_DEVICE: u32 = 20;

pub const GROUP_INTERFACE_ENTER: u32 = 30;
pub const GROUP_IP_ADDRESS: u32 = 31;
pub const GROUP_SHOW_INTERFACE: u32 = 32;

pub const GROUP_BGP_ROUTER_ID: u32 = 900;
pub const GROUP_SHOW_BGP: u32 = 901;

pub const GROUP_SHOW_DATABASE: u32 = 50;
