/// IF module: `interface GE-n` (enters the per-interface config view),
/// `ip address <ip> <mask>` within it, and `show interface`.
///
/// The logical-to-physical name table stands in for `nn_if_map.c`'s
/// `logical_name = physical_name` config file, loaded here as a fixed
/// in-memory table rather than from disk or a netlink query.
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use nexus_bus::{Bus, Mailbox};
use nexus_tlv::ParamType;
use nexus_tree::{NodeKind, ViewTree};

use crate::common;
use crate::ids::{
    CONFIG_IF_VIEW_ID, CONFIG_VIEW_ID, GROUP_INTERFACE_ENTER, GROUP_IP_ADDRESS, GROUP_SHOW_INTERFACE,
    MODULE_IF,
};
use crate::tree_builder::ensure_keyword;

const INTERFACE_MAP: &[(&str, &str)] = &[
    ("GE-1", "eth0"),
    ("GE-2", "eth1"),
    ("GE-3", "eth2"),
    ("GE-4", "eth3"),
];

const IP_ELEMENT_ID: u32 = 20;
const MASK_ELEMENT_ID: u32 = 21;

/// `GE-n`'s per-node cfg_id, used to recover which interface a
/// `GROUP_INTERFACE_ENTER` command named — the group id alone is shared
/// across all four.
fn interface_cfg_id(logical: &str) -> Option<u32> {
    INTERFACE_MAP
        .iter()
        .position(|(name, _)| *name == logical)
        .map(|i| 101 + i as u32)
}

fn interface_by_cfg_id(cfg_id: u32) -> Option<&'static str> {
    let idx = cfg_id.checked_sub(101)?;
    INTERFACE_MAP.get(idx as usize).map(|(logical, _)| *logical)
}

/// `interface GE-n` and `show interface` are configuration-mode surfaces;
/// only `ip address` (below, within the per-interface view) lives deeper
/// still.
pub fn attach(views: &mut ViewTree) {
    {
        let config = views.view_find_by_id_mut(CONFIG_VIEW_ID).unwrap();
        let tree = &mut config.cmd_tree;
        let top = tree.root();

        let interface = ensure_keyword(tree, top, "interface", "Enter interface configuration mode");
        for (logical, _physical) in INTERFACE_MAP {
            let cfg_id = interface_cfg_id(logical).expect("listed interface has a cfg id");
            let node = tree.create_node(
                cfg_id,
                *logical,
                "Enter interface configuration mode",
                NodeKind::Keyword,
                MODULE_IF,
                GROUP_INTERFACE_ENTER,
                CONFIG_IF_VIEW_ID,
                true,
            );
            tree.add_child(interface, node).unwrap();
        }

        let show = ensure_keyword(tree, top, "show", "Show information");
        let show_if = tree.create_node(
            2,
            "interface",
            "Show interface configuration",
            NodeKind::Keyword,
            MODULE_IF,
            GROUP_SHOW_INTERFACE,
            0,
            true,
        );
        tree.add_child(show, show_if).unwrap();
    }

    {
        let config_if = views.view_find_by_id_mut(CONFIG_IF_VIEW_ID).unwrap();
        let tree = &mut config_if.cmd_tree;
        let top = tree.root();

        let ip = ensure_keyword(tree, top, "ip", "Interface IP configuration");
        let address = ensure_keyword(tree, ip, "address", "Set the interface's IPv4 address");

        let ip_arg = tree.create_node(IP_ELEMENT_ID, "", "IPv4 address", NodeKind::Argument, 0, 0, 0, false);
        tree.set_param_type(ip_arg, ParamType::parse("ipv4")).unwrap();
        tree.add_child(address, ip_arg).unwrap();

        let mask_arg = tree.create_node(
            MASK_ELEMENT_ID,
            "",
            "Subnet mask",
            NodeKind::Argument,
            MODULE_IF,
            GROUP_IP_ADDRESS,
            0,
            true,
        );
        tree.set_param_type(mask_arg, ParamType::parse("ipv4")).unwrap();
        tree.add_child(ip_arg, mask_arg).unwrap();
    }
}

fn render_interfaces(addresses: &HashMap<&'static str, (Ipv4Addr, Ipv4Addr)>) -> String {
    let mut out = String::from("INTERFACE  PHYSICAL  ADDRESS\n");
    for (logical, physical) in INTERFACE_MAP {
        match addresses.get(logical) {
            Some((ip, mask)) => out.push_str(&format!("{logical:<11}{physical:<10}{ip}/{mask}\n")),
            None => out.push_str(&format!("{logical:<11}{physical:<10}unassigned\n")),
        }
    }
    out
}

/// Drive the IF module's mailbox until shutdown is requested.
pub async fn run(bus: Arc<Bus>, mailbox: Mailbox) {
    let mut addresses: HashMap<&'static str, (Ipv4Addr, Ipv4Addr)> = HashMap::new();

    common::serve(bus, mailbox, move |group_id, elements| match group_id {
        GROUP_INTERFACE_ENTER => {
            let Some(name) = elements.iter().rev().find_map(|(id, _)| interface_by_cfg_id(*id)) else {
                return common::text_reply(MODULE_IF, "Error: unknown interface");
            };
            common::view_change_reply(
                MODULE_IF,
                &format!("{{hostname}}(config-if-{name})#"),
                Some(name),
            )
        }
        GROUP_IP_ADDRESS => {
            let Some(name) = common::view_context(elements).map(nexus_tlv::element::read_string) else {
                return common::text_reply(MODULE_IF, "Error: no interface in context");
            };
            let Some(logical) = INTERFACE_MAP
                .iter()
                .find(|(logical, _)| *logical == name)
                .map(|(logical, _)| *logical)
            else {
                return common::text_reply(MODULE_IF, format!("Error: interface {name} does not exist"));
            };
            let ip = elements
                .iter()
                .find(|(id, _)| *id == IP_ELEMENT_ID)
                .and_then(|(_, v)| nexus_tlv::element::read_ipv4(v));
            let mask = elements
                .iter()
                .find(|(id, _)| *id == MASK_ELEMENT_ID)
                .and_then(|(_, v)| nexus_tlv::element::read_ipv4(v));
            let (Some(ip), Some(mask)) = (ip, mask) else {
                return common::text_reply(MODULE_IF, "Error: malformed address");
            };
            addresses.insert(logical, (ip, mask));
            common::text_reply(MODULE_IF, format!("{logical}: address set to {ip}/{mask}"))
        }
        GROUP_SHOW_INTERFACE => common::text_reply(MODULE_IF, render_interfaces(&addresses)),
        other => common::text_reply(MODULE_IF, format!("IF: unknown group {other}")),
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_views() -> ViewTree {
        let mut views = ViewTree::new();
        views
            .view_create(CONFIG_VIEW_ID, "config", "{hostname}(config)#")
            .unwrap();
        views
            .view_create(CONFIG_IF_VIEW_ID, "config-if", "{hostname}(config-if)#")
            .unwrap();
        attach(&mut views);
        views
    }

    #[test]
    fn attaches_all_four_interfaces() {
        let views = built_views();
        let config = views.view_find_by_id(CONFIG_VIEW_ID).unwrap();
        let tree = &config.cmd_tree;
        let interface = tree.find_keyword_child(tree.root(), "interface").unwrap();
        for (logical, _) in INTERFACE_MAP {
            let node = tree.find_keyword_child(interface, logical).unwrap();
            assert_eq!(tree.get(node).unwrap().view_id, CONFIG_IF_VIEW_ID);
        }
    }

    #[test]
    fn attaches_ip_address_chain_in_config_if_view() {
        let views = built_views();
        let config_if = views.view_find_by_id(CONFIG_IF_VIEW_ID).unwrap();
        let tree = &config_if.cmd_tree;
        let ip = tree.find_keyword_child(tree.root(), "ip").unwrap();
        let address = tree.find_keyword_child(ip, "address").unwrap();
        let ip_arg = tree.argument_child(address).unwrap();
        let mask_arg = tree.argument_child(ip_arg).unwrap();
        assert_eq!(tree.get(mask_arg).unwrap().group_id, GROUP_IP_ADDRESS);
        assert!(tree.get(mask_arg).unwrap().is_end);
    }

    #[test]
    fn cfg_id_round_trips_interface_name() {
        for (logical, _) in INTERFACE_MAP {
            let id = interface_cfg_id(logical).unwrap();
            assert_eq!(interface_by_cfg_id(id), Some(*logical));
        }
    }

    #[test]
    fn shows_unassigned_until_address_is_set() {
        let addresses = HashMap::new();
        let text = render_interfaces(&addresses);
        assert!(text.contains("GE-1"));
        assert!(text.contains("unassigned"));
    }
}
