use petgraph::{
    dot,
    graph::{DiGraph, NodeIndex},
};
use std::{
    cell::RefCell,
    fmt::{self, Debug},
    rc::Rc,
};

use super::{ErrorKind, Result};

/// What a construct stands for in the provisioned cluster
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructKind {
    Cluster,
    Capacity,
    Resource,
    Addon,
    Namespace,
    Team,
}

/// The node type in `ConstructGraph`
#[derive(Serialize, Deserialize, Clone)]
pub struct ConstructNode {
    pub id: String,
    pub kind: ConstructKind,
}
// Debug is used for the `dot` interface - nice to have a minimal output for that
impl Debug for ConstructNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Why one construct has to be created after another
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DepReason {
    /// Construct is created inside or on top of the other
    Structural,
    /// Declared addon dependency
    Dependency,
    /// Node capacity waiting for an addon
    Capacity,
}

/// The edge type in `ConstructGraph`, pointing from dependent to dependency
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DepEdge {
    pub reason: DepReason,
}

/// Graph of constructs with depends-on relations as edges
///
/// This is fully serializable because it is created with `petgraph` using the serde
/// featurset. We use that to serialize the graph as yaml.
pub type ConstructGraph = DiGraph<ConstructNode, DepEdge>;

/// Helper function that should be an impl on ConstructGraph
pub fn nodeidx_from_name(name: &str, graph: &ConstructGraph) -> Option<NodeIndex> {
    for id in graph.node_indices() {
        if let Some(n) = graph.node_weight(id) {
            if n.id == name {
                return Some(id);
            }
        }
    }
    None
}

/// Handle to a construct created in a `Stack`
#[derive(Clone, Debug, PartialEq)]
pub struct Construct {
    id: String,
    idx: NodeIndex,
}

impl Construct {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// The provisioning target of one blueprint build
///
/// Clones share the same underlying graph. Everything happens on one thread,
/// and no borrow of the graph outlives a method call.
#[derive(Clone)]
pub struct Stack {
    name: String,
    graph: Rc<RefCell<ConstructGraph>>,
}

impl Stack {
    pub fn new(name: &str) -> Self {
        Stack {
            name: name.to_string(),
            graph: Rc::new(RefCell::new(DiGraph::<_, _>::new())),
        }
    }

    /// The stack id
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a new construct with a unique id
    pub fn add_construct(&self, id: &str, kind: ConstructKind) -> Result<Construct> {
        let mut graph = self.graph.borrow_mut();
        if nodeidx_from_name(id, &graph).is_some() {
            return Err(ErrorKind::DuplicateConstruct(id.to_string(), self.name.clone()).into());
        }
        trace!("Adding {:?} construct {} to {}", kind, id, self.name);
        let idx = graph.add_node(ConstructNode {
            id: id.to_string(),
            kind,
        });
        Ok(Construct {
            id: id.to_string(),
            idx,
        })
    }

    /// Find a construct by id or create it
    pub fn ensure_construct(&self, id: &str, kind: ConstructKind) -> Result<Construct> {
        match self.find(id) {
            Some(c) => Ok(c),
            None => self.add_construct(id, kind),
        }
    }

    pub fn find(&self, id: &str) -> Option<Construct> {
        let graph = self.graph.borrow();
        nodeidx_from_name(id, &graph).map(|idx| Construct {
            id: id.to_string(),
            idx,
        })
    }

    /// Make `from` depend on `on`
    ///
    /// Adding the same relation twice keeps a single edge.
    pub fn add_dependency(&self, from: &Construct, on: &Construct, reason: DepReason) {
        if from.idx == on.idx {
            return;
        }
        debug!("{} depends on {} ({:?})", from.id, on.id, reason);
        self.graph.borrow_mut().update_edge(from.idx, on.idx, DepEdge { reason });
    }

    /// Whether `from` has a direct dependency on `on`
    pub fn depends_on(&self, from: &Construct, on: &Construct) -> bool {
        self.graph.borrow().find_edge(from.idx, on.idx).is_some()
    }

    /// Ids of the direct dependencies of a construct, sorted
    pub fn dependencies(&self, of: &Construct) -> Vec<String> {
        let graph = self.graph.borrow();
        let mut res = graph
            .neighbors(of.idx)
            .filter_map(|n| graph.node_weight(n).map(|w| w.id.clone()))
            .collect::<Vec<_>>();
        res.sort();
        res
    }

    pub fn kind(&self, of: &Construct) -> Option<ConstructKind> {
        self.graph.borrow().node_weight(of.idx).map(|n| n.kind)
    }

    /// Number of constructs
    pub fn len(&self) -> usize {
        self.graph.borrow().node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.borrow().edge_count()
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&*self.graph.borrow())?)
    }

    /// Graphviz output of the construct graph
    pub fn to_dot(&self) -> String {
        let graph = self.graph.borrow();
        format!("{:?}", dot::Dot::with_config(&*graph, &[dot::Config::EdgeNoLabel]))
    }
}
