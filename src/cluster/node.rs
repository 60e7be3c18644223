use rstar::RTree;
use rstar::primitives::GeomWithData;
use smallvec::SmallVec;

/// Tree entry: projected position plus the node's index within its level.
pub(crate) type TreeEntry = GeomWithData<[f64; 2], u32>;

/// What a level node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeRef {
    /// Index into the loaded point list.
    Leaf(u32),
    /// Slot in the cluster arena.
    Cluster(u32),
}

/// A point or cluster as seen at one zoom level, in projected unit space.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub x: f64,
    pub y: f64,
    pub num_points: u32,
    pub weight: u64,
    pub target: NodeRef,
}

/// Arena entry for a cluster formed at `zoom`.
///
/// `children` are the nodes merged into it, taken from the level at
/// `zoom + 1`.
#[derive(Debug, Clone)]
pub(crate) struct ClusterRecord {
    pub x: f64,
    pub y: f64,
    pub num_points: u32,
    pub weight: u64,
    pub zoom: u8,
    pub children: SmallVec<[NodeRef; 4]>,
}

/// All nodes visible at one zoom level plus a tree over their positions.
pub(crate) struct Level {
    pub nodes: Vec<Node>,
    pub tree: RTree<TreeEntry>,
}

impl Level {
    pub fn new(nodes: Vec<Node>) -> Self {
        let entries = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| TreeEntry::new([node.x, node.y], i as u32))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            nodes,
        }
    }
}
