//! Indented text outline of a reporting tree

use std::fmt::Write;

use crate::hierarchy::TreeNode;

/// One line per node, two spaces of indent per level, children in tree order
pub fn render_outline(tree: &TreeNode) -> String {
    let mut out = String::new();
    write_node(tree, 0, &mut out);
    out
}

fn write_node(node: &TreeNode, depth: usize, out: &mut String) {
    let tag = if node.is_seat() {
        " [seat]"
    } else if node.is_hidden_manager {
        " [hidden manager]"
    } else if node.is_manager() {
        " [manager]"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "{}{} ({}){}",
        "  ".repeat(depth),
        node.display_name(),
        node.id,
        tag
    );
    for child in &node.children {
        write_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::EmployeeRecord;

    #[test]
    fn test_outline_tags_and_indent() {
        let tree = TreeNode::from_record(EmployeeRecord::new("R", "Root").manager()).with_children(vec![
            TreeNode::from_record(EmployeeRecord::new("H", "Hana").manager().hidden())
                .with_children(vec![TreeNode::from_record(EmployeeRecord::new("B", "Ben"))]),
            TreeNode::from_record(EmployeeRecord::new("SEAT_1_1", "Open seat")),
        ]);
        insta::assert_snapshot!(render_outline(&tree), @r"
        Root (R) [manager]
          Hana (H) [hidden manager]
            Ben (B)
          Open seat (SEAT_1_1) [seat]
        ");
    }
}
