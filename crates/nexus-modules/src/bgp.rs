/// BGP module: `bgp router-id <ipv4>` and `show bgp`.
use std::net::Ipv4Addr;
use std::sync::Arc;

use nexus_bus::{Bus, Mailbox};
use nexus_tlv::ParamType;
use nexus_tree::{NodeKind, ViewTree};

use crate::common;
use crate::ids::{CONFIG_VIEW_ID, GROUP_BGP_ROUTER_ID, GROUP_SHOW_BGP, MODULE_BGP};
use crate::tree_builder::ensure_keyword;

const ROUTER_ID_ELEMENT_ID: u32 = 2;

/// `bgp router-id` and `show bgp` are both configuration-mode surfaces.
pub fn attach(views: &mut ViewTree) {
    let config = views.view_find_by_id_mut(CONFIG_VIEW_ID).unwrap();
    let tree = &mut config.cmd_tree;
    let top = tree.root();

    let bgp = ensure_keyword(tree, top, "bgp", "BGP configuration");
    let router_id = ensure_keyword(tree, bgp, "router-id", "Set the BGP router id");
    let arg = tree.create_node(
        ROUTER_ID_ELEMENT_ID,
        "",
        "IPv4 router id",
        NodeKind::Argument,
        MODULE_BGP,
        GROUP_BGP_ROUTER_ID,
        0,
        true,
    );
    tree.set_param_type(arg, ParamType::parse("ipv4")).unwrap();
    tree.add_child(router_id, arg).unwrap();

    let show = ensure_keyword(tree, top, "show", "Show information");
    let show_bgp = tree.create_node(
        3,
        "bgp",
        "Show BGP state",
        NodeKind::Keyword,
        MODULE_BGP,
        GROUP_SHOW_BGP,
        0,
        true,
    );
    tree.add_child(show, show_bgp).unwrap();
}

/// Drive the BGP module's mailbox until shutdown is requested.
pub async fn run(bus: Arc<Bus>, mailbox: Mailbox) {
    let mut router_id: Option<Ipv4Addr> = None;

    common::serve(bus, mailbox, move |group_id, elements| match group_id {
        GROUP_BGP_ROUTER_ID => {
            let Some(id) = elements
                .iter()
                .find(|(id, _)| *id == ROUTER_ID_ELEMENT_ID)
                .and_then(|(_, v)| nexus_tlv::element::read_ipv4(v))
            else {
                return common::text_reply(MODULE_BGP, "Error: malformed router id");
            };
            router_id = Some(id);
            common::text_reply(MODULE_BGP, format!("BGP router id set to {id}"))
        }
        GROUP_SHOW_BGP => match router_id {
            Some(id) => common::text_reply(MODULE_BGP, format!("BGP router id: {id}\nState: active")),
            None => common::text_reply(MODULE_BGP, "BGP router id: not set\nState: idle"),
        },
        other => common::text_reply(MODULE_BGP, format!("BGP: unknown group {other}")),
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_router_id_and_show_bgp() {
        let mut views = ViewTree::new();
        views
            .view_create(CONFIG_VIEW_ID, "config", "{hostname}(config)#")
            .unwrap();
        attach(&mut views);

        let config = views.view_find_by_id(CONFIG_VIEW_ID).unwrap();
        let tree = &config.cmd_tree;
        let bgp = tree.find_keyword_child(tree.root(), "bgp").unwrap();
        let router_id = tree.find_keyword_child(bgp, "router-id").unwrap();
        let arg = tree.argument_child(router_id).unwrap();
        let node = tree.get(arg).unwrap();
        assert_eq!(node.module_id, MODULE_BGP);
        assert_eq!(node.group_id, GROUP_BGP_ROUTER_ID);

        let show = tree.find_keyword_child(tree.root(), "show").unwrap();
        let show_bgp = tree.find_keyword_child(show, "bgp").unwrap();
        assert_eq!(tree.get(show_bgp).unwrap().group_id, GROUP_SHOW_BGP);
    }
}
