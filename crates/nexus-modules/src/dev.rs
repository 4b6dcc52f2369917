/// DEV module: the attached-device inventory and `show device`.
use std::sync::Arc;

use nexus_bus::{Bus, Mailbox};
use nexus_tree::{NodeKind, ViewTree};

use crate::common;
use crate::ids::{CONFIG_VIEW_ID, GROUP_SHOW_DEVICE, MODULE_DEV};
use crate::tree_builder::ensure_keyword;

/// A row in the fixed device table, standing in for `nn_dev_module.c`'s
/// runtime registry of attached line cards.
struct DeviceEntry {
    name: &'static str,
    model: &'static str,
    status: &'static str,
}

const DEVICES: &[DeviceEntry] = &[
    DeviceEntry {
        name: "chassis-0",
        model: "NX-5000",
        status: "up",
    },
    DeviceEntry {
        name: "psu-0",
        model: "PWR-750W",
        status: "up",
    },
    DeviceEntry {
        name: "fan-tray-0",
        model: "FAN-4U",
        status: "up",
    },
];

/// `show device` is a configuration-mode surface, like the other demo
/// modules' `show` commands.
pub fn attach(views: &mut ViewTree) {
    let config = views.view_find_by_id_mut(CONFIG_VIEW_ID).unwrap();
    let tree = &mut config.cmd_tree;
    let top = tree.root();

    let show = ensure_keyword(tree, top, "show", "Show information");
    let device = tree.create_node(
        1,
        "device",
        "Show attached devices",
        NodeKind::Keyword,
        MODULE_DEV,
        GROUP_SHOW_DEVICE,
        0,
        true,
    );
    tree.add_child(show, device).unwrap();
}

fn render_devices() -> String {
    let mut out = String::from("NAME            MODEL        STATUS\n");
    for d in DEVICES {
        out.push_str(&format!("{:<16}{:<13}{}\n", d.name, d.model, d.status));
    }
    out
}

/// Drive the DEV module's mailbox until shutdown is requested.
pub async fn run(bus: Arc<Bus>, mailbox: Mailbox) {
    common::serve(bus, mailbox, |group_id, _elements| match group_id {
        GROUP_SHOW_DEVICE => common::text_reply(MODULE_DEV, render_devices()),
        other => common::text_reply(MODULE_DEV, format!("DEV: unknown group {other}")),
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_show_device() {
        let mut views = ViewTree::new();
        views
            .view_create(CONFIG_VIEW_ID, "config", "{hostname}(config)#")
            .unwrap();
        attach(&mut views);

        let config = views.view_find_by_id(CONFIG_VIEW_ID).unwrap();
        let tree = &config.cmd_tree;
        let show = tree.find_keyword_child(tree.root(), "show").unwrap();
        let device = tree.find_keyword_child(show, "device").unwrap();
        assert_eq!(tree.get(device).unwrap().module_id, MODULE_DEV);
    }

    #[test]
    fn renders_a_header_and_every_entry() {
        let text = render_devices();
        assert!(text.starts_with("NAME"));
        assert_eq!(text.lines().count(), DEVICES.len() + 1);
    }
}
