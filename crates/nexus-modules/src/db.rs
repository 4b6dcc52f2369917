/// DB module: `show database`, a stub status report standing in for
/// `nn_db_main.c`'s schema/connection bookkeeping.
use std::sync::Arc;

use nexus_bus::{Bus, Mailbox};
use nexus_tree::{NodeKind, ViewTree};

use crate::common;
use crate::ids::{CONFIG_VIEW_ID, GROUP_SHOW_DATABASE, MODULE_DB};
use crate::tree_builder::ensure_keyword;

/// `show database` is a configuration-mode surface.
pub fn attach(views: &mut ViewTree) {
    let config = views.view_find_by_id_mut(CONFIG_VIEW_ID).unwrap();
    let tree = &mut config.cmd_tree;
    let top = tree.root();

    let show = ensure_keyword(tree, top, "show", "Show information");
    let database = tree.create_node(
        1,
        "database",
        "Show the configuration database status",
        NodeKind::Keyword,
        MODULE_DB,
        GROUP_SHOW_DATABASE,
        0,
        true,
    );
    tree.add_child(show, database).unwrap();
}

/// Drive the DB module's mailbox until shutdown is requested.
pub async fn run(bus: Arc<Bus>, mailbox: Mailbox) {
    common::serve(bus, mailbox, |group_id, _elements| match group_id {
        GROUP_SHOW_DATABASE => {
            common::text_reply(MODULE_DB, "Database: in-memory\nSchema version: 1\nStatus: ready")
        }
        other => common::text_reply(MODULE_DB, format!("DB: unknown group {other}")),
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attaches_show_database() {
        let mut views = ViewTree::new();
        views
            .view_create(CONFIG_VIEW_ID, "config", "{hostname}(config)#")
            .unwrap();
        attach(&mut views);

        let config = views.view_find_by_id(CONFIG_VIEW_ID).unwrap();
        let tree = &config.cmd_tree;
        let show = tree.find_keyword_child(tree.root(), "show").unwrap();
        let database = tree.find_keyword_child(show, "database").unwrap();
        assert_eq!(tree.get(database).unwrap().module_id, MODULE_DB);
        assert_eq!(tree.get(database).unwrap().group_id, GROUP_SHOW_DATABASE);
    }
}
