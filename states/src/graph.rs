use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::{Debug, Formatter},
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError<T>
where
    T: Debug,
{
    #[error("Cycle detected in dependency graph, through {:?}", .0)]
    CycleDetected(DepRoute<T>),
    #[error("Duplicate edge detected in dependency graph, from {:?} to {:?}", .0.route[0], .0.route[1])]
    DuplicateEdge(DepRoute<T>),
}

/// Nodes along a dependency path, first is where the path starts.
pub struct DepRoute<T> {
    route: Vec<T>,
}

impl<T> DepRoute<T> {
    pub fn nodes(&self) -> &[T] {
        &self.route
    }
}

impl<T> Debug for DepRoute<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut nodes = self.route.iter();
        let Some(first) = nodes.next() else {
            return write!(f, "[]");
        };
        write!(f, "{first:?}")?;
        for node in nodes {
            write!(f, " -> {node:?}")?;
        }
        Ok(())
    }
}

/// Directed dependency graph, an edge `from -> to` means `to` reads `from`.
#[derive(Debug)]
pub struct Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    edges: Vec<(Node, Node)>,
}

impl<Node> Default for Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Node> Graph<Node>
where
    Node: Debug + Copy + Ord,
{
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            edges: Vec::with_capacity(capacity),
        }
    }

    pub fn route_to(&mut self, from: Node, to: Node) {
        self.edges.push((from, to));
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn direct_dependents(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        self.edges
            .iter()
            .filter(move |(from, _)| *from == node)
            .map(|(_, to)| *to)
    }

    /// Everything that transitively reads `node`, not including `node` itself
    /// unless it sits on a cycle.
    pub fn dependents(&self, node: Node) -> BTreeSet<Node> {
        let mut collected = BTreeSet::new();
        let mut queue = VecDeque::from([node]);

        while let Some(current) = queue.pop_front() {
            for next in self.direct_dependents(current) {
                if collected.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        collected
    }

    /// Kahn's algorithm. Returns every node that appears in an edge, ordered
    /// so each node comes after everything it reads.
    pub fn topology_sort(&self) -> Result<Vec<Node>, TopologyError<Node>> {
        let mut seen_edges = BTreeSet::new();
        let mut in_degree = BTreeMap::<Node, usize>::new();

        for &(from, to) in &self.edges {
            if !seen_edges.insert((from, to)) {
                return Err(TopologyError::DuplicateEdge(DepRoute {
                    route: vec![from, to],
                }));
            }
            in_degree.entry(from).or_insert(0);
            *in_degree.entry(to).or_insert(0) += 1;
        }

        let mut ready: VecDeque<Node> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(node) = ready.pop_front() {
            order.push(node);
            for next in self.direct_dependents(node) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(next);
                    }
                }
            }
        }

        if order.len() == in_degree.len() {
            return Ok(order);
        }

        let remaining: BTreeSet<Node> = in_degree
            .into_iter()
            .filter(|(node, _)| !order.contains(node))
            .map(|(node, _)| node)
            .collect();
        Err(TopologyError::CycleDetected(DepRoute {
            route: self.find_cycle(&remaining),
        }))
    }

    /// Every node left over by Kahn's algorithm still has a leftover
    /// predecessor, so walking predecessors must revisit a node.
    fn find_cycle(&self, remaining: &BTreeSet<Node>) -> Vec<Node> {
        let Some(&start) = remaining.iter().next() else {
            return Vec::new();
        };
        let mut path = vec![start];
        let mut current = start;

        loop {
            let next = self
                .edges
                .iter()
                .find(|(from, to)| *to == current && remaining.contains(from))
                .map(|(from, _)| *from);
            let Some(next) = next else {
                return path;
            };
            if let Some(pos) = path.iter().position(|node| *node == next) {
                let mut cycle = vec![next];
                cycle.extend(path[pos..].iter().rev().copied());
                return cycle;
            }
            path.push(next);
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_sorts_in_dependency_order() {
        let mut graph: Graph<u32> = Graph::with_capacity(3);
        graph.route_to(1, 2);
        graph.route_to(2, 3);
        graph.route_to(1, 3);

        assert_eq!(graph.topology_sort().expect("acyclic"), vec![1, 2, 3]);
    }

    #[test]
    fn dependents_are_transitive() {
        let mut graph: Graph<u32> = Graph::new();
        graph.route_to(1, 2);
        graph.route_to(2, 3);
        graph.route_to(4, 5);

        let dependents: Vec<u32> = graph.dependents(1).into_iter().collect();
        assert_eq!(dependents, vec![2, 3]);
        assert!(graph.dependents(3).is_empty());
    }

    #[test]
    fn cycle_is_reported_as_closed_loop() {
        let mut graph: Graph<u32> = Graph::new();
        graph.route_to(1, 2);
        graph.route_to(2, 3);
        graph.route_to(3, 1);

        match graph.topology_sort() {
            Err(TopologyError::CycleDetected(route)) => {
                let nodes = route.nodes();
                assert!(nodes.len() >= 2, "cycle route too short: {route:?}");
                assert_eq!(nodes.first(), nodes.last(), "route should be closed: {route:?}");

                let message = TopologyError::CycleDetected(route).to_string();
                assert!(message.contains("Cycle detected"));
                assert!(message.contains("->"));
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let mut graph: Graph<u32> = Graph::new();
        graph.route_to(1, 2);
        graph.route_to(1, 2);

        match graph.topology_sort() {
            Err(err @ TopologyError::DuplicateEdge(_)) => {
                assert!(err.to_string().contains("from 1 to 2"));
            }
            other => panic!("expected a duplicate edge, got {other:?}"),
        }
    }
}
