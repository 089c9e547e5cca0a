//! [`MemoryBackend`]: an in-memory reference [`Backend`] implementation.
//!
//! Not meant for production use (nothing here survives a restart) — it
//! exists so the engine can run, and its tests can run, with no external
//! dependency, and so a real adapter has a known-correct implementation to
//! compare its own behavior against.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use epochweave_foundation::{Error, Value};

use crate::backend::Backend;
use crate::rows::{
    BranchRow, EdgeRow, EdgeValRow, GraphRow, GraphValRow, KeyframeRow, NodeRow, NodeValRow,
    PlanRow, PlanTickRow, TurnRow,
};

type Window<Row> = BTreeMap<(u64, u64), Vec<Row>>;

/// A `Backend` that keeps every row in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    branches: HashMap<String, BranchRow>,
    turns: HashMap<(String, u64), TurnRow>,
    graphs: HashMap<Value, GraphRow>,
    keyframes: HashMap<(Value, String), BTreeMap<(u64, u64), KeyframeRow>>,
    nodes: HashMap<(Value, String), Window<NodeRow>>,
    edges: HashMap<(Value, String), Window<EdgeRow>>,
    graph_val: HashMap<(Value, String), Window<GraphValRow>>,
    node_val: HashMap<(Value, String), Window<NodeValRow>>,
    edge_val: HashMap<(Value, String), Window<EdgeValRow>>,
    plans: Vec<PlanRow>,
    plan_ticks: HashMap<u64, Vec<PlanTickRow>>,
    closed: bool,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::internal("backend used after close()"));
        }
        Ok(())
    }

    fn window_range<Row: Clone>(
        window: &Window<Row>,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Vec<Row> {
        window
            .range((Bound::Excluded(from), Bound::Included(to)))
            .flat_map(|(_, rows)| rows.iter().cloned())
            .collect()
    }
}

impl Backend for MemoryBackend {
    fn all_branches(&self) -> Result<Vec<BranchRow>, Error> {
        self.check_open()?;
        Ok(self.branches.values().cloned().collect())
    }

    fn new_branch(&mut self, row: BranchRow) -> Result<(), Error> {
        self.check_open()?;
        if self.branches.contains_key(&row.branch) {
            return Err(Error::internal(format!(
                "branch {} already registered",
                row.branch
            )));
        }
        self.branches.insert(row.branch.clone(), row);
        Ok(())
    }

    fn set_branch_extent(
        &mut self,
        branch: &str,
        turn_end: u64,
        tick_end: u64,
    ) -> Result<(), Error> {
        self.check_open()?;
        let row = self
            .branches
            .get_mut(branch)
            .ok_or_else(|| Error::key_not_found(format!("branch {branch}")))?;
        row.turn_end = turn_end;
        row.tick_end = tick_end;
        Ok(())
    }

    fn turns_dump(&self, branch: &str) -> Result<Vec<TurnRow>, Error> {
        self.check_open()?;
        let mut rows: Vec<TurnRow> = self
            .turns
            .iter()
            .filter(|((b, _), _)| b == branch)
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by_key(|r| r.turn);
        Ok(rows)
    }

    fn new_turn(&mut self, row: TurnRow) -> Result<(), Error> {
        self.check_open()?;
        self.turns.insert((row.branch.clone(), row.turn), row);
        Ok(())
    }

    fn set_turn(
        &mut self,
        branch: &str,
        turn: u64,
        end_tick: u64,
        plan_end_tick: u64,
    ) -> Result<(), Error> {
        self.check_open()?;
        let row = self
            .turns
            .get_mut(&(branch.to_string(), turn))
            .ok_or_else(|| Error::key_not_found(format!("turn {branch}/{turn}")))?;
        row.end_tick = end_tick;
        row.plan_end_tick = plan_end_tick;
        Ok(())
    }

    fn all_graphs(&self) -> Result<Vec<GraphRow>, Error> {
        self.check_open()?;
        Ok(self.graphs.values().cloned().collect())
    }

    fn new_graph(&mut self, row: GraphRow) -> Result<(), Error> {
        self.check_open()?;
        if self.graphs.contains_key(&row.graph) {
            return Err(Error::graph_name(format!("{:?} already exists", row.graph)));
        }
        self.graphs.insert(row.graph.clone(), row);
        Ok(())
    }

    fn del_graph(&mut self, graph: &Value) -> Result<(), Error> {
        self.check_open()?;
        self.graphs.remove(graph);
        self.keyframes.retain(|(g, _), _| g != graph);
        self.nodes.retain(|(g, _), _| g != graph);
        self.edges.retain(|(g, _), _| g != graph);
        self.graph_val.retain(|(g, _), _| g != graph);
        self.node_val.retain(|(g, _), _| g != graph);
        self.edge_val.retain(|(g, _), _| g != graph);
        Ok(())
    }

    fn keyframes_list(&self, graph: &Value, branch: &str) -> Result<Vec<(u64, u64)>, Error> {
        self.check_open()?;
        Ok(self
            .keyframes
            .get(&(graph.clone(), branch.to_string()))
            .map(|w| w.keys().copied().collect())
            .unwrap_or_default())
    }

    fn get_keyframe(
        &self,
        graph: &Value,
        branch: &str,
        turn: u64,
        tick: u64,
    ) -> Result<Option<KeyframeRow>, Error> {
        self.check_open()?;
        Ok(self
            .keyframes
            .get(&(graph.clone(), branch.to_string()))
            .and_then(|w| w.get(&(turn, tick)))
            .cloned())
    }

    fn keyframes_insert(&mut self, row: KeyframeRow) -> Result<(), Error> {
        self.check_open()?;
        let key = (row.graph.clone(), row.branch.clone());
        self.keyframes
            .entry(key)
            .or_default()
            .insert((row.turn, row.tick), row);
        Ok(())
    }

    fn load_nodes(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<NodeRow>, Error> {
        self.check_open()?;
        Ok(self
            .nodes
            .get(&(graph.clone(), branch.to_string()))
            .map(|w| Self::window_range(w, from, to))
            .unwrap_or_default())
    }

    fn load_edges(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<EdgeRow>, Error> {
        self.check_open()?;
        Ok(self
            .edges
            .get(&(graph.clone(), branch.to_string()))
            .map(|w| Self::window_range(w, from, to))
            .unwrap_or_default())
    }

    fn load_graph_val(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<GraphValRow>, Error> {
        self.check_open()?;
        Ok(self
            .graph_val
            .get(&(graph.clone(), branch.to_string()))
            .map(|w| Self::window_range(w, from, to))
            .unwrap_or_default())
    }

    fn load_node_val(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<NodeValRow>, Error> {
        self.check_open()?;
        Ok(self
            .node_val
            .get(&(graph.clone(), branch.to_string()))
            .map(|w| Self::window_range(w, from, to))
            .unwrap_or_default())
    }

    fn load_edge_val(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<EdgeValRow>, Error> {
        self.check_open()?;
        Ok(self
            .edge_val
            .get(&(graph.clone(), branch.to_string()))
            .map(|w| Self::window_range(w, from, to))
            .unwrap_or_default())
    }

    fn set_node(&mut self, row: NodeRow) -> Result<(), Error> {
        self.check_open()?;
        let key = (row.graph.clone(), row.branch.clone());
        self.nodes
            .entry(key)
            .or_default()
            .entry((row.turn, row.tick))
            .or_default()
            .push(row);
        Ok(())
    }

    fn set_edge(&mut self, row: EdgeRow) -> Result<(), Error> {
        self.check_open()?;
        let key = (row.graph.clone(), row.branch.clone());
        self.edges
            .entry(key)
            .or_default()
            .entry((row.turn, row.tick))
            .or_default()
            .push(row);
        Ok(())
    }

    fn set_graph_val(&mut self, row: GraphValRow) -> Result<(), Error> {
        self.check_open()?;
        let key = (row.graph.clone(), row.branch.clone());
        self.graph_val
            .entry(key)
            .or_default()
            .entry((row.turn, row.tick))
            .or_default()
            .push(row);
        Ok(())
    }

    fn set_node_val(&mut self, row: NodeValRow) -> Result<(), Error> {
        self.check_open()?;
        let key = (row.graph.clone(), row.branch.clone());
        self.node_val
            .entry(key)
            .or_default()
            .entry((row.turn, row.tick))
            .or_default()
            .push(row);
        Ok(())
    }

    fn set_edge_val(&mut self, row: EdgeValRow) -> Result<(), Error> {
        self.check_open()?;
        let key = (row.graph.clone(), row.branch.clone());
        self.edge_val
            .entry(key)
            .or_default()
            .entry((row.turn, row.tick))
            .or_default()
            .push(row);
        Ok(())
    }

    fn plans_dump(&self) -> Result<Vec<PlanRow>, Error> {
        self.check_open()?;
        Ok(self.plans.clone())
    }

    fn plans_insert(&mut self, row: PlanRow) -> Result<(), Error> {
        self.check_open()?;
        self.plans.push(row);
        Ok(())
    }

    fn plan_ticks_dump(&self, plan_id: u64) -> Result<Vec<PlanTickRow>, Error> {
        self.check_open()?;
        Ok(self.plan_ticks.get(&plan_id).cloned().unwrap_or_default())
    }

    fn plan_ticks_insert(&mut self, row: PlanTickRow) -> Result<(), Error> {
        self.check_open()?;
        self.plan_ticks.entry(row.plan_id).or_default().push(row);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        self.check_open()
    }

    fn close(&mut self) -> Result<(), Error> {
        self.check_open()?;
        self.closed = true;
        Ok(())
    }
}
