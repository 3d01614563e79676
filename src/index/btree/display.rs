//! Boxed, level-by-level rendering of a tree for tests and debugging.

use std::fmt;

use super::tree::BTree;

/// Renders one line per level, each node boxed as `│k1 k2│`, lines centred
/// on the widest level.
///
/// ```text
///   │2│
/// │1│ │3 4│
/// ```
impl fmt::Display for BTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        let mut level = vec![self.root()];

        while !level.is_empty() {
            let mut next = Vec::new();
            let boxes: Vec<String> = level
                .iter()
                .map(|&id| {
                    let node = &self[id];
                    next.extend_from_slice(node.children());
                    let keys: Vec<String> = node.keys().iter().map(i32::to_string).collect();
                    format!("│{}│", keys.join(" "))
                })
                .collect();
            lines.push(boxes.join(" "));
            level = next;
        }

        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        for line in &lines {
            let pad = (width - line.chars().count()) / 2;
            writeln!(f, "{:pad$}{}", "", line, pad = pad)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_single_leaf() {
        let mut tree = BTree::new(3).unwrap();
        assert_eq!(tree.to_string(), "││\n");

        tree.insert(2).unwrap();
        tree.insert(1).unwrap();
        assert_eq!(tree.to_string(), "│1 2│\n");
    }

    #[test]
    fn test_display_two_levels() {
        let mut tree = BTree::new(3).unwrap();
        for key in 1..=4 {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.to_string(), "   │2│\n│1│ │3 4│\n");
    }

    #[test]
    fn test_display_three_levels() {
        let mut tree = BTree::new(3).unwrap();
        for key in 1..=10 {
            tree.insert(key).unwrap();
        }
        let rendered = tree.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].trim(), "│4│");
        assert_eq!(lines[1].trim(), "│2│ │6 8│");
        assert_eq!(lines[2], "│1│ │3│ │5│ │7│ │9 10│");
    }
}
