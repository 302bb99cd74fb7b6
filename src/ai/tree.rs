use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Write;

use super::minimax::{evaluate, search, SearchConfig, SearchStats, NEG_INFINITY, POS_INFINITY};
use crate::game::{generate_successors, Bag, Score};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Turn {
    Maximizing,
    Minimizing,
}

impl Turn {
    pub fn flip(self) -> Self {
        match self {
            Turn::Maximizing => Turn::Minimizing,
            Turn::Minimizing => Turn::Maximizing,
        }
    }

    pub fn is_maximizing(self) -> bool {
        matches!(self, Turn::Maximizing)
    }
}

/// 搜索树节点，独占其子节点。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub bag: Bag,
    pub turn: Turn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Score>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(bag: Bag, turn: Turn) -> Self {
        Self {
            bag,
            turn,
            value: None,
            children: Vec::new(),
        }
    }

    /// The computer always searches from a maximizing root.
    pub fn root(bag: Bag) -> Self {
        Self::new(bag, Turn::Maximizing)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn size(&self) -> u64 {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Child with the highest recorded value; ties go to the earliest in generation order.
    pub fn best_child(&self) -> Option<&Node> {
        let mut best: Option<&Node> = None;
        for child in &self.children {
            let Some(value) = child.value else {
                continue;
            };
            if best.map_or(true, |current| Some(value) > current.value) {
                best = Some(child);
            }
        }
        best
    }
}

/// Expands `bag` to `config.depth` plies and records a value on every node.
pub fn build_tree(bag: Bag, config: &SearchConfig) -> Node {
    let mut stats = SearchStats::default();
    build_tree_with_stats(bag, config, &mut stats)
}

pub fn build_tree_with_stats(bag: Bag, config: &SearchConfig, stats: &mut SearchStats) -> Node {
    let mut root = Node::root(bag);
    build(&mut root, 0, config, stats);
    root
}

fn build(node: &mut Node, current_ply: u32, config: &SearchConfig, stats: &mut SearchStats) {
    stats.nodes_built += 1;

    if current_ply >= config.depth {
        node.value = Some(evaluate(node, config.variant));
        return;
    }

    let turn = node.turn.flip();
    node.children = generate_successors(node.bag, config.variant)
        .into_iter()
        .map(|bag| Node::new(bag, turn))
        .collect();

    for child in &mut node.children {
        build(child, current_ply + 1, config, stats);
    }

    let value = search(
        node,
        NEG_INFINITY,
        POS_INFINITY,
        config.depth - current_ply,
        config.variant,
        stats,
    );
    node.value = Some(value);
}

/// 以 BFS 顺序输出 Mermaid 流程图，仅用于调试查看树结构。
pub fn to_mermaid(root: &Node) -> String {
    let mut out = String::from("graph TD\n");
    let mut queue = VecDeque::from([(0usize, root)]);
    let mut next_id = 1usize;

    while let Some((id, node)) = queue.pop_front() {
        let value = node
            .value
            .map_or_else(|| "?".to_string(), |value| value.to_string());
        let turn = if node.turn.is_maximizing() { "MAX" } else { "MIN" };
        let _ = writeln!(
            out,
            "    n{id}[\"R:{} B:{} {turn} {value}\"]",
            node.bag.red, node.bag.blue
        );

        for child in &node.children {
            let _ = writeln!(out, "    n{id} --> n{next_id}");
            queue.push_back((next_id, child));
            next_id += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Variant;

    fn config(variant: Variant, depth: i64) -> SearchConfig {
        SearchConfig::new(variant, depth).expect("depth should be valid")
    }

    fn max_depth(node: &Node) -> u32 {
        node.children
            .iter()
            .map(|child| max_depth(child) + 1)
            .max()
            .unwrap_or(0)
    }

    fn assert_fully_valued(node: &Node) {
        assert!(node.value.is_some(), "node {} was left unvalued", node.bag);
        for child in &node.children {
            assert_eq!(child.turn, node.turn.flip());
            assert_fully_valued(child);
        }
    }

    #[test]
    fn builder_expands_to_configured_depth() {
        let tree = build_tree(Bag::new(4, 4), &config(Variant::Standard, 3));
        assert_eq!(max_depth(&tree), 3);
        assert_eq!(tree.turn, Turn::Maximizing);
        assert_eq!(tree.children.len(), 4);
        assert_fully_valued(&tree);
    }

    #[test]
    fn builder_stops_at_empty_bag() {
        let tree = build_tree(Bag::new(1, 1), &config(Variant::Standard, 10));
        assert_eq!(max_depth(&tree), 2, "(1,1) can only last two plies");
        assert_fully_valued(&tree);
    }

    #[test]
    fn depth_one_scenario_values_children_by_exhaustion_rule() {
        let tree = build_tree(Bag::new(1, 1), &config(Variant::Standard, 1));
        let bags: Vec<Bag> = tree.children.iter().map(|child| child.bag).collect();
        assert_eq!(bags, vec![Bag::new(0, 1), Bag::new(1, 0)]);

        // Children are minimizing and exhausted, so standard returns the raw score.
        let values: Vec<Option<Score>> = tree.children.iter().map(|child| child.value).collect();
        assert_eq!(values, vec![Some(3), Some(2)]);
        assert_eq!(tree.value, Some(3));
        assert_eq!(tree.best_child().map(|child| child.bag), Some(Bag::new(0, 1)));
    }

    #[test]
    fn best_child_prefers_first_on_ties() {
        let mut root = Node::root(Bag::new(2, 2));
        for (bag, value) in [(Bag::new(0, 2), 5), (Bag::new(2, 0), 5), (Bag::new(1, 2), 4)] {
            let mut child = Node::new(bag, Turn::Minimizing);
            child.value = Some(value);
            root.children.push(child);
        }
        assert_eq!(root.best_child().map(|child| child.bag), Some(Bag::new(0, 2)));
    }

    #[test]
    fn size_counts_every_node() {
        let tree = build_tree(Bag::new(1, 1), &config(Variant::Misere, 2));
        // root, (0,1), (1,0), (0,0) under each
        assert_eq!(tree.size(), 5);
    }

    #[test]
    fn mermaid_lists_nodes_and_edges() {
        let tree = build_tree(Bag::new(1, 1), &config(Variant::Standard, 1));
        let diagram = to_mermaid(&tree);
        let lines: Vec<&str> = diagram.lines().collect();

        assert_eq!(lines[0], "graph TD");
        assert_eq!(lines[1], "    n0[\"R:1 B:1 MAX 3\"]");
        assert!(lines.contains(&"    n0 --> n1"));
        assert!(lines.contains(&"    n0 --> n2"));
        assert!(lines.contains(&"    n1[\"R:0 B:1 MIN 3\"]"));
        assert!(lines.contains(&"    n2[\"R:1 B:0 MIN 2\"]"));
    }
}
