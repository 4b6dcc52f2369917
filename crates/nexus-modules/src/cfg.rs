/// CFG module: `configure` (enters the config view) and `show version`.
use std::sync::Arc;

use nexus_bus::{Bus, Mailbox};
use nexus_tree::{NodeKind, ViewTree, ROOT_VIEW_ID};

use crate::common;
use crate::ids::{CONFIG_VIEW_ID, GROUP_CONFIGURE, GROUP_SHOW_VERSION, MODULE_CFG};
use crate::tree_builder::ensure_keyword;

const VERSION_TEXT: &str = "NetNexus demo build 1.0.0";

pub fn attach(views: &mut ViewTree) {
    // `configure` is the only fragment that stays on the root view — it's
    // the entry point into configuration mode, so it must be reachable
    // before that view exists for the caller.
    {
        let root = views.view_find_by_id_mut(ROOT_VIEW_ID).unwrap();
        let tree = &mut root.cmd_tree;
        let top = tree.root();

        let configure = tree.create_node(
            1,
            "configure",
            "Enter configuration mode",
            NodeKind::Keyword,
            MODULE_CFG,
            GROUP_CONFIGURE,
            CONFIG_VIEW_ID,
            true,
        );
        tree.add_child(top, configure).unwrap();
    }

    // `show version`, like the other `show` surfaces, belongs to
    // configuration mode.
    {
        let config = views.view_find_by_id_mut(CONFIG_VIEW_ID).unwrap();
        let tree = &mut config.cmd_tree;
        let top = tree.root();

        let show = ensure_keyword(tree, top, "show", "Show information");
        let version = tree.create_node(
            2,
            "version",
            "Show software version",
            NodeKind::Keyword,
            MODULE_CFG,
            GROUP_SHOW_VERSION,
            0,
            true,
        );
        tree.add_child(show, version).unwrap();
    }
}

/// Drive the CFG module's mailbox until shutdown is requested.
pub async fn run(bus: Arc<Bus>, mailbox: Mailbox) {
    common::serve(bus, mailbox, |group_id, _elements| match group_id {
        GROUP_CONFIGURE => common::view_change_reply(MODULE_CFG, "", None),
        GROUP_SHOW_VERSION => common::text_reply(MODULE_CFG, VERSION_TEXT),
        other => common::text_reply(MODULE_CFG, format!("CFG: unknown group {other}")),
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_configure_and_show_version() {
        let mut views = ViewTree::new();
        views
            .view_create(ROOT_VIEW_ID, "user", "{hostname}>")
            .unwrap();
        views
            .view_create(CONFIG_VIEW_ID, "config", "{hostname}(config)#")
            .unwrap();
        attach(&mut views);

        let root = views.view_find_by_id(ROOT_VIEW_ID).unwrap();
        let root_tree = &root.cmd_tree;
        let configure = root_tree.find_keyword_child(root_tree.root(), "configure").unwrap();
        let node = root_tree.get(configure).unwrap();
        assert_eq!(node.module_id, MODULE_CFG);
        assert_eq!(node.group_id, GROUP_CONFIGURE);
        assert_eq!(node.view_id, CONFIG_VIEW_ID);

        let config = views.view_find_by_id(CONFIG_VIEW_ID).unwrap();
        let config_tree = &config.cmd_tree;
        let show = config_tree.find_keyword_child(config_tree.root(), "show").unwrap();
        let version = config_tree.find_keyword_child(show, "version").unwrap();
        assert_eq!(config_tree.get(version).unwrap().group_id, GROUP_SHOW_VERSION);
    }
}
