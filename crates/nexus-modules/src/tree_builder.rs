/// Assembles the view tree and per-view command trees that, in the original
/// source, an external XML loader would build (`nn_cli_xml_parser.h`). Each
/// module contributes its own command fragments via an `attach` function,
/// called here in a fixed module-id order — replacing the source's
/// `__attribute__((constructor))` self-registration, which left load order
/// non-deterministic across translation units.
use nexus_tree::{CommandTree, NodeId, NodeKind, ViewTree, ROOT_VIEW_ID};

use crate::ids::CONFIG_IF_VIEW_ID;
use crate::ids::CONFIG_VIEW_ID;
use crate::{bgp, cfg, db, dev, interface};

/// Build the full view tree with every demo module's commands attached.
pub fn build_views() -> ViewTree {
    let mut views = ViewTree::new();
    views
        .view_create(ROOT_VIEW_ID, "user", "{hostname}>")
        .expect("root view id is unique");
    views
        .view_create(CONFIG_VIEW_ID, "config", "{hostname}(config)#")
        .expect("config view id is unique");
    views
        .view_create(CONFIG_IF_VIEW_ID, "config-if", "{hostname}(config-if)#")
        .expect("config-if view id is unique");
    views.view_add_child(ROOT_VIEW_ID, CONFIG_VIEW_ID).unwrap();
    views
        .view_add_child(CONFIG_VIEW_ID, CONFIG_IF_VIEW_ID)
        .unwrap();

    cfg::attach(&mut views);
    dev::attach(&mut views);
    interface::attach(&mut views);
    bgp::attach(&mut views);
    db::attach(&mut views);

    views
}

/// Find (or create) a non-executable keyword node named `name` under
/// `parent`, merging with an existing sibling of the same name per
/// [`CommandTree::add_child`]'s merge rule.
pub(crate) fn ensure_keyword(tree: &mut CommandTree, parent: NodeId, name: &str, desc: &str) -> NodeId {
    if let Some(existing) = tree.find_keyword_child(parent, name) {
        return existing;
    }
    let node = tree.create_node(0, name, desc, NodeKind::Keyword, 0, 0, 0, false);
    tree.add_child(parent, node).expect("keyword merge cannot fail for a non-argument child")
}
