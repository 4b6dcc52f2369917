/// View tree: the tree of CLI views, each owning its own command tree.
use std::collections::BTreeMap;

use crate::error::TreeError;
use crate::node::CommandTree;

/// The root view's id. `view_id == 0` is reserved to mean "no view
/// change"; the root view itself gets a real nonzero id.
pub const ROOT_VIEW_ID: u32 = 1;

#[derive(Debug)]
pub struct ViewNode {
    pub view_id: u32,
    pub name: String,
    pub prompt_template: String,
    pub cmd_tree: CommandTree,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
}

/// Views keyed directly by their caller-assigned `view_id` — unlike the
/// command-tree arena, view ids are meaningful identifiers (`ROOT_VIEW_ID`,
/// XML-declared ids), not arena slots.
#[derive(Debug, Default)]
pub struct ViewTree {
    views: BTreeMap<u32, ViewNode>,
}

impl ViewTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_create(
        &mut self,
        view_id: u32,
        name: impl Into<String>,
        prompt_template: impl Into<String>,
    ) -> Result<(), TreeError> {
        if self.views.contains_key(&view_id) {
            return Err(TreeError::DuplicateView(view_id));
        }
        self.views.insert(
            view_id,
            ViewNode {
                view_id,
                name: name.into(),
                prompt_template: prompt_template.into(),
                cmd_tree: CommandTree::new(),
                parent: None,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn view_add_child(&mut self, parent: u32, child: u32) -> Result<(), TreeError> {
        if !self.views.contains_key(&parent) {
            return Err(TreeError::UnknownView(parent));
        }
        if !self.views.contains_key(&child) {
            return Err(TreeError::UnknownView(child));
        }
        self.views.get_mut(&child).unwrap().parent = Some(parent);
        self.views.get_mut(&parent).unwrap().children.push(child);
        Ok(())
    }

    pub fn view_find_by_id(&self, id: u32) -> Option<&ViewNode> {
        self.views.get(&id)
    }

    pub fn view_find_by_id_mut(&mut self, id: u32) -> Option<&mut ViewNode> {
        self.views.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn duplicate_view_id_rejected() {
        let mut views = ViewTree::new();
        views.view_create(ROOT_VIEW_ID, "user", "{hostname}>").unwrap();
        let err = views
            .view_create(ROOT_VIEW_ID, "other", "x>")
            .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateView(id) if id == ROOT_VIEW_ID));
    }

    #[test]
    fn parent_child_linkage() {
        let mut views = ViewTree::new();
        views.view_create(ROOT_VIEW_ID, "user", "{hostname}>").unwrap();
        views.view_create(2, "config", "{hostname}(config)#").unwrap();
        views.view_add_child(ROOT_VIEW_ID, 2).unwrap();

        assert_eq!(views.view_find_by_id(2).unwrap().parent, Some(ROOT_VIEW_ID));
        assert_eq!(views.view_find_by_id(ROOT_VIEW_ID).unwrap().children, vec![2]);
    }

    #[test]
    fn each_view_owns_an_independent_command_tree() {
        let mut views = ViewTree::new();
        views.view_create(ROOT_VIEW_ID, "user", "{hostname}>").unwrap();
        views.view_create(2, "config", "{hostname}(config)#").unwrap();

        let root_view = views.view_find_by_id_mut(ROOT_VIEW_ID).unwrap();
        let r = root_view.cmd_tree.root();
        let n = root_view
            .cmd_tree
            .create_node(1, "show", "", NodeKind::Keyword, 1, 1, ROOT_VIEW_ID, true);
        root_view.cmd_tree.add_child(r, n).unwrap();

        let config_view = views.view_find_by_id(2).unwrap();
        assert!(config_view
            .cmd_tree
            .find_keyword_child(config_view.cmd_tree.root(), "show")
            .is_none());
    }
}
