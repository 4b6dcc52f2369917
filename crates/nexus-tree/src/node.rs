/// Command tree: an arena-indexed node graph. The doubly-linked C structs
/// this replaces are index-based parent/child links here instead, to
/// avoid an `Rc<RefCell<_>>` cycle between every node and its parent.
use nexus_tlv::ParamType;

use crate::error::TreeError;

/// Index into a [`CommandTree`]'s arena. Never reused across trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Keyword,
    Argument,
}

#[derive(Debug, Clone)]
pub struct CmdNode {
    pub cfg_id: u32,
    pub module_id: u32,
    pub group_id: u32,
    pub view_id: u32,
    pub name: String,
    pub description: String,
    pub kind: NodeKind,
    pub param_type: Option<ParamType>,
    pub is_end: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// One view's command tree, rooted at [`CommandTree::root`].
///
/// Built once during load and shared read-only across sessions after that.
#[derive(Debug)]
pub struct CommandTree {
    nodes: Vec<CmdNode>,
    root: NodeId,
}

impl CommandTree {
    /// A fresh tree with a single keyword root node (`cfg_id = 0`, not
    /// itself executable).
    pub fn new() -> Self {
        let root = CmdNode {
            cfg_id: 0,
            module_id: 0,
            group_id: 0,
            view_id: 0,
            name: String::new(),
            description: String::new(),
            kind: NodeKind::Keyword,
            param_type: None,
            is_end: false,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&CmdNode> {
        self.nodes.get(id.0 as usize)
    }

    /// Create a detached node. Call [`CommandTree::add_child`] to attach it.
    #[allow(clippy::too_many_arguments)]
    pub fn create_node(
        &mut self,
        cfg_id: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: NodeKind,
        module_id: u32,
        group_id: u32,
        view_id: u32,
        is_end: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(CmdNode {
            cfg_id,
            module_id,
            group_id,
            view_id,
            name: name.into(),
            description: description.into(),
            kind,
            param_type: None,
            is_end,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn set_param_type(&mut self, node: NodeId, param_type: ParamType) -> Result<(), TreeError> {
        let n = self
            .nodes
            .get_mut(node.0 as usize)
            .ok_or(TreeError::UnknownNode(node))?;
        n.param_type = Some(param_type);
        Ok(())
    }

    /// Attach `child` under `parent`.
    ///
    /// If `child` is a keyword and `parent` already has a keyword child of
    /// the same name, the two merge: `child`'s own children are re-parented
    /// onto the existing node, and if `child.is_end`, its module/group
    /// binding wins (later registration takes precedence). This gives
    /// additive tree assembly independent of load order.
    ///
    /// A parent may have at most one argument child; attaching a second
    /// one is a [`TreeError::DuplicateArgumentChild`].
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, TreeError> {
        let child_kind = self.nodes[child.0 as usize].kind;

        if child_kind == NodeKind::Keyword {
            if let Some(existing) = self.find_keyword_child(parent, &self.nodes[child.0 as usize].name.clone())
            {
                let grandchildren = self.nodes[child.0 as usize].children.clone();
                for gc in grandchildren {
                    self.reparent(gc, existing);
                }
                if self.nodes[child.0 as usize].is_end {
                    let (module_id, group_id, param_type) = {
                        let c = &self.nodes[child.0 as usize];
                        (c.module_id, c.group_id, c.param_type.clone())
                    };
                    let e = &mut self.nodes[existing.0 as usize];
                    e.is_end = true;
                    e.module_id = module_id;
                    e.group_id = group_id;
                    if param_type.is_some() {
                        e.param_type = param_type;
                    }
                }
                return Ok(existing);
            }
        } else if self.argument_child(parent).is_some() {
            return Err(TreeError::DuplicateArgumentChild(parent));
        }

        self.nodes[parent.0 as usize].children.push(child);
        self.nodes[child.0 as usize].parent = Some(parent);
        Ok(child)
    }

    fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        self.nodes[node.0 as usize].parent = Some(new_parent);
        self.nodes[new_parent.0 as usize].children.push(node);
    }

    /// Exact-name match on a keyword child.
    pub fn find_keyword_child(&self, parent: NodeId, token: &str) -> Option<NodeId> {
        self.nodes[parent.0 as usize]
            .children
            .iter()
            .copied()
            .find(|&id| {
                let n = &self.nodes[id.0 as usize];
                n.kind == NodeKind::Keyword && n.name == token
            })
    }

    /// Keyword children whose name starts with `prefix`, in insertion order.
    pub fn partial_matches(&self, parent: NodeId, prefix: &str) -> Vec<NodeId> {
        self.nodes[parent.0 as usize]
            .children
            .iter()
            .copied()
            .filter(|&id| {
                let n = &self.nodes[id.0 as usize];
                n.kind == NodeKind::Keyword && n.name.starts_with(prefix)
            })
            .collect()
    }

    /// The single argument child, if any.
    pub fn argument_child(&self, parent: NodeId) -> Option<NodeId> {
        self.nodes[parent.0 as usize]
            .children
            .iter()
            .copied()
            .find(|&id| self.nodes[id.0 as usize].kind == NodeKind::Argument)
    }
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(tree: &mut CommandTree, name: &str, is_end: bool) -> NodeId {
        tree.create_node(1, name, "", NodeKind::Keyword, 0, 0, 0, is_end)
    }

    #[test]
    fn merges_duplicate_keyword_children() {
        let mut tree = CommandTree::new();
        let root = tree.root();

        let cfg_a = kw(&mut tree, "config", false);
        tree.add_child(root, cfg_a).unwrap();

        let if_child = kw(&mut tree, "interface", true);
        let cfg_a_node = tree.find_keyword_child(root, "config").unwrap();
        tree.add_child(cfg_a_node, if_child).unwrap();

        // Second, independently-created "config" keyword merges with the first.
        let cfg_b = kw(&mut tree, "config", false);
        let merged = tree.add_child(root, cfg_b).unwrap();
        assert_eq!(merged, cfg_a_node);

        // "interface" is still reachable under the merged node.
        assert!(tree.find_keyword_child(merged, "interface").is_some());
        assert_eq!(tree.nodes[root.0 as usize].children.len(), 1);
    }

    #[test]
    fn later_binding_wins_on_duplicate_end_node() {
        let mut tree = CommandTree::new();
        let root = tree.root();

        let mut first = tree.create_node(1, "show", "", NodeKind::Keyword, 1, 100, 0, true);
        tree.add_child(root, first).unwrap();

        let second = tree.create_node(2, "show", "", NodeKind::Keyword, 2, 200, 0, true);
        first = tree.add_child(root, second).unwrap();

        let merged = tree.get(first).unwrap();
        assert_eq!(merged.module_id, 2);
        assert_eq!(merged.group_id, 200);
    }

    #[test]
    fn rejects_second_argument_child() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let a1 = tree.create_node(1, "a1", "", NodeKind::Argument, 0, 0, 0, true);
        tree.add_child(root, a1).unwrap();
        let a2 = tree.create_node(2, "a2", "", NodeKind::Argument, 0, 0, 0, true);
        let err = tree.add_child(root, a2).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateArgumentChild(_)));
    }

    #[test]
    fn partial_matches_preserve_insertion_order() {
        let mut tree = CommandTree::new();
        let root = tree.root();
        for name in ["interface", "interrupt", "ip"] {
            let n = kw(&mut tree, name, true);
            tree.add_child(root, n).unwrap();
        }
        let names: Vec<&str> = tree
            .partial_matches(root, "inte")
            .iter()
            .map(|id| tree.get(*id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["interface", "interrupt"]);
    }
}
