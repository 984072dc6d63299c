use super::Tree;
use crate::libs::phylo::node::NodeId;

/// Serialize tree to Newick string.
///
/// The tree is written from the node it hangs from; for reconstructed trees
/// that node is internal, so the output reads as an unrooted tree with a
/// basal multifurcation, e.g. `(A:0.5,B:0.5,C:0.5);`.
pub fn to_newick(tree: &Tree) -> String {
    to_newick_with_format(tree, "")
}

/// Serialize tree to Newick string with custom formatting options.
/// Currently supports indentation (empty for single line).
pub fn to_newick_with_format(tree: &Tree, indent: &str) -> String {
    if let Some(root) = tree.get_root() {
        let mut s = to_newick_recursive(tree, root, indent, 0);
        s.push(';');
        s
    } else {
        ";".to_string()
    }
}

fn to_newick_recursive(tree: &Tree, node_id: NodeId, indent: &str, depth: usize) -> String {
    let node = match tree.get_node(node_id) {
        Some(n) => n,
        None => return String::new(),
    };
    let is_pretty = !indent.is_empty();

    // Calculate current indentation string
    let my_indent = if is_pretty {
        indent.repeat(depth)
    } else {
        String::new()
    };

    // Format node info: Label + Length
    let mut node_info = String::new();

    if let Some(name) = &node.name {
        node_info.push_str(&quote_label(name));
    }

    if let Some(len) = node.length {
        node_info.push_str(&format!(":{}", len));
    }

    if node.children.is_empty() {
        format!("{}{}", my_indent, node_info)
    } else {
        let children_strs: Vec<String> = node
            .children
            .iter()
            .map(|&child| to_newick_recursive(tree, child, indent, depth + 1))
            .collect();

        if is_pretty {
            // (\n children \n)NodeInfo
            format!(
                "{}(\n{}\n{}){}",
                my_indent,
                children_strs.join(",\n"),
                my_indent,
                node_info
            )
        } else {
            format!("({}){}", children_strs.join(","), node_info)
        }
    }
}

fn quote_label(label: &str) -> String {
    let needs_quote = label.chars().any(|c| "(),:;[]' \t\n".contains(c));
    if needs_quote {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}
