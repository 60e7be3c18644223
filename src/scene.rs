//! Frame composition for the two map modes.

use crate::network::{EdgePolicy, Network, build_network};
use geocluster_types::edge::EdgeRecord;
use geocluster_types::entity::EntityId;
use geocluster_types::render::RenderPoint;
use serde::{Deserialize, Serialize};

/// What the map is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Mode {
    /// Clustered entity icons.
    #[default]
    Default,
    /// One entity's relationships drawn as arcs, icons hidden.
    NetworkFocus {
        source_id: EntityId,
        edges: Vec<EdgeRecord>,
    },
}

impl Mode {
    /// Focus mode for `source_id`, keeping only the records that touch it.
    pub fn focus(source_id: EntityId, records: &[EdgeRecord]) -> Self {
        let edges = Network::focused_on(records, &source_id);
        Mode::NetworkFocus { source_id, edges }
    }

    pub fn is_focused(&self) -> bool {
        matches!(self, Mode::NetworkFocus { .. })
    }
}

/// Everything the host draws for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub icons: Vec<RenderPoint>,
    pub network: Network,
}

/// Primitives to draw for `mode`, given the planner's current icons.
pub fn compose(mode: &Mode, icons: &[RenderPoint], policy: EdgePolicy) -> Frame {
    match mode {
        Mode::Default => Frame {
            icons: icons.to_vec(),
            network: Network::default(),
        },
        Mode::NetworkFocus { edges, .. } => Frame {
            icons: Vec::new(),
            network: build_network(edges, policy),
        },
    }
}
