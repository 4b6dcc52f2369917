/// Walks a typed command line against a view's command tree.
use nexus_tlv::{ElementKind, MatchElement};
use nexus_tree::{CommandTree, NodeId, NodeKind};

use crate::error::MatchError;

/// A successfully matched command: the dispatch target plus the ordered
/// elements along the path.
#[derive(Debug, Clone)]
pub struct Matched {
    pub module_id: u32,
    pub group_id: u32,
    pub elements: Vec<MatchElement>,
    pub final_node: NodeId,
    /// The view a `CLI_VIEW_CHG` reply to this command should land on.
    pub view_id: u32,
}

/// Tokenize on ASCII whitespace and walk the tree one token at a time.
/// Keyword matches take precedence over argument matches at every step.
pub fn match_line(tree: &CommandTree, root: NodeId, line: &str) -> Result<Matched, MatchError> {
    let mut node = root;
    let mut elements = Vec::new();

    for token in line.split_ascii_whitespace() {
        if let Some(k) = tree.find_keyword_child(node, token) {
            let kn = tree.get(k).expect("child id always resolves");
            elements.push(MatchElement {
                element_id: kn.cfg_id,
                kind: ElementKind::Keyword,
                value: None,
                param_type: None,
            });
            node = k;
            continue;
        }

        if let Some(a) = tree.argument_child(node) {
            let an = tree.get(a).expect("child id always resolves");
            if let Some(pt) = &an.param_type {
                match pt.validate(token) {
                    Ok(()) => {
                        elements.push(MatchElement::argument(an.cfg_id, token, pt.clone()));
                        node = a;
                        continue;
                    }
                    Err(reason) => {
                        return Err(MatchError::InvalidArgument {
                            token: token.to_string(),
                            reason,
                            node,
                        });
                    }
                }
            }
        }

        return Err(MatchError::UnknownToken {
            token: token.to_string(),
            node,
        });
    }

    let final_node = tree.get(node).expect("node id always resolves");
    if !final_node.is_end {
        return Err(MatchError::IncompleteCommand { node });
    }

    Ok(Matched {
        module_id: final_node.module_id,
        group_id: final_node.group_id,
        elements,
        final_node: node,
        view_id: final_node.view_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_tlv::ParamType;

    fn build_bgp_tree() -> (CommandTree, NodeId) {
        let mut tree = CommandTree::new();
        let root = tree.root();
        let bgp = tree.create_node(1, "bgp", "BGP configuration", NodeKind::Keyword, 0, 0, 0, false);
        tree.add_child(root, bgp).unwrap();

        let router_id = tree.create_node(
            2,
            "router-id",
            "Set the router id",
            NodeKind::Keyword,
            0,
            0,
            0,
            false,
        );
        let bgp_node = tree.find_keyword_child(root, "bgp").unwrap();
        tree.add_child(bgp_node, router_id).unwrap();

        let arg = tree.create_node(3, "", "IPv4 address", NodeKind::Argument, 4, 900, 0, true);
        tree.set_param_type(arg, ParamType::parse("ipv4")).unwrap();
        let router_id_node = tree.find_keyword_child(bgp_node, "router-id").unwrap();
        tree.add_child(router_id_node, arg).unwrap();

        (tree, root)
    }

    #[test]
    fn matches_bgp_router_id() {
        let (tree, root) = build_bgp_tree();
        let matched = match_line(&tree, root, "bgp router-id 1.2.3.4").unwrap();
        assert_eq!(matched.module_id, 4);
        assert_eq!(matched.group_id, 900);
        assert_eq!(matched.elements.len(), 3);
        assert_eq!(matched.elements[2].value.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn rejects_invalid_argument_with_the_validator_reason() {
        let (tree, root) = build_bgp_tree();
        let err = match_line(&tree, root, "bgp router-id 10.0.0.300").unwrap_err();
        assert!(matches!(
            err,
            MatchError::InvalidArgument { ref token, ref reason, .. }
                if token == "10.0.0.300" && reason == "Invalid IPv4 address format"
        ));
        assert_eq!(err.to_string(), "Invalid IPv4 address format");
    }

    #[test]
    fn incomplete_command_reports_current_node() {
        let (tree, root) = build_bgp_tree();
        let err = match_line(&tree, root, "bgp router-id").unwrap_err();
        assert!(matches!(err, MatchError::IncompleteCommand { .. }));
    }

    #[test]
    fn unknown_keyword_is_unknown_token() {
        let (tree, root) = build_bgp_tree();
        let err = match_line(&tree, root, "ospf").unwrap_err();
        assert!(matches!(err, MatchError::UnknownToken { token, .. } if token == "ospf"));
    }
}
