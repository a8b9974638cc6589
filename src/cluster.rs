use ndarray::{Array2, ArrayView1};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A node of the merge tree: a single variable or a merge of two clusters.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterNode {
    Leaf(usize),
    Merge { distance: f64, size: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Branch {
    Left,
    Right,
}

/// Agglomerative average-linkage clustering of the rows of `matrix`
/// using Euclidean distance. Edges point from a merge to its two children.
pub fn build_merge_tree(matrix: &Array2<f64>) -> (Graph<ClusterNode, Branch>, Option<NodeIndex>) {
    let mut tree = Graph::<ClusterNode, Branch>::new();
    let rows = matrix.nrows();

    // active clusters: (tree node, member rows)
    let mut active: Vec<(NodeIndex, Vec<usize>)> = (0..rows)
        .map(|row| (tree.add_node(ClusterNode::Leaf(row)), vec![row]))
        .collect();

    while active.len() > 1 {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in 0..active.len() {
            for b in (a + 1)..active.len() {
                let distance = average_linkage(matrix, &active[a].1, &active[b].1);
                if best.map_or(true, |(_, _, d)| distance < d) {
                    best = Some((a, b, distance));
                }
            }
        }
        let Some((a, b, distance)) = best else { break };

        let (right_node, right_members) = active.remove(b);
        let (left_node, mut members) = active.remove(a);
        members.extend(right_members);
        let merged = tree.add_node(ClusterNode::Merge {
            distance,
            size: members.len(),
        });
        tree.add_edge(merged, left_node, Branch::Left);
        tree.add_edge(merged, right_node, Branch::Right);
        active.insert(a, (merged, members));
    }

    let root = active.first().map(|(node, _)| *node);
    (tree, root)
}

/// Rows of `matrix` in dendrogram leaf order.
pub fn leaf_order(matrix: &Array2<f64>) -> Vec<usize> {
    let (tree, root) = build_merge_tree(matrix);
    let Some(root) = root else {
        return Vec::new();
    };

    let mut order = Vec::with_capacity(matrix.nrows());
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match tree[node] {
            ClusterNode::Leaf(row) => order.push(row),
            ClusterNode::Merge { .. } => {
                let mut children: Vec<(Branch, NodeIndex)> = tree
                    .edges_directed(node, Direction::Outgoing)
                    .map(|edge| (*edge.weight(), edge.target()))
                    .collect();
                children.sort();
                // right pushed first so the left subtree is visited first
                for (_, child) in children.into_iter().rev() {
                    stack.push(child);
                }
            }
        }
    }
    order
}

fn average_linkage(matrix: &Array2<f64>, a: &[usize], b: &[usize]) -> f64 {
    let total: f64 = a
        .iter()
        .flat_map(|&i| b.iter().map(move |&j| (i, j)))
        .map(|(i, j)| euclidean(&matrix.row(i), &matrix.row(j)))
        .sum();
    total / (a.len() * b.len()) as f64
}

fn euclidean(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_leaf_order_groups_similar_rows() {
        let matrix = array![
            [0.0, 0.0],
            [10.0, 10.0],
            [0.1, 0.0],
            [10.0, 10.2]
        ];
        let order = leaf_order(&matrix);
        assert_eq!(order.len(), 4);
        let pos = |row: usize| order.iter().position(|&r| r == row).unwrap();
        assert_eq!((pos(0) as i32 - pos(2) as i32).abs(), 1);
        assert_eq!((pos(1) as i32 - pos(3) as i32).abs(), 1);
    }

    #[test]
    fn test_merge_tree_is_binary() {
        let matrix = array![[1.0], [2.0], [4.0], [8.0], [16.0]];
        let (tree, root) = build_merge_tree(&matrix);
        assert_eq!(tree.node_count(), 9);
        assert_eq!(tree.edge_count(), 8);
        let root = root.unwrap();
        assert!(matches!(tree[root], ClusterNode::Merge { size: 5, .. }));
        let children: Vec<_> = tree
            .edges_directed(root, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_leaf_order_single_and_empty() {
        assert_eq!(leaf_order(&array![[3.0, 1.0]]), vec![0]);
        assert!(leaf_order(&Array2::<f64>::zeros((0, 2))).is_empty());
    }
}
