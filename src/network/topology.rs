use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Diameter {
    Finite(usize),
    /// The graph is disconnected, so some pairs have no path.
    NotApplicable,
}

impl Display for Diameter {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Diameter::Finite(value) => write!(f, "{}", value),
            Diameter::NotApplicable => write!(f, "n/a"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    pub lcc_node_count: usize,
    pub lcc_edge_count: usize,
    pub diameter: Diameter,
    pub lcc_diameter: usize,
}

impl GraphStatistics {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("node_count", self.node_count.to_string()),
            ("edge_count", self.edge_count.to_string()),
            ("component_count", self.component_count.to_string()),
            ("lcc_node_count", self.lcc_node_count.to_string()),
            ("lcc_edge_count", self.lcc_edge_count.to_string()),
            ("diameter", self.diameter.to_string()),
            ("lcc_diameter", self.lcc_diameter.to_string()),
        ]
    }
}

/// Parallel and opposite-direction mentions collapse into one structural edge. A self-mention is
/// a loop edge: it counts toward the edge totals but never shortens a path.
pub struct UndirectedGraph {
    names: Vec<String>,
    adjacency: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

impl UndirectedGraph {
    /// Node indices follow the sorted order of node names.
    pub fn from_edges<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(pairs: I) -> Self {
        let pairs = pairs.into_iter().collect::<Vec<_>>();
        let names = pairs
            .iter()
            .flat_map(|(source, target)| vec![*source, *target])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect::<HashMap<_, _>>();

        let edges = pairs
            .iter()
            .map(|(source, target)| {
                let a = index[source];
                let b = index[target];
                (a.min(b), a.max(b))
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let mut adjacency = vec![vec![]; names.len()];
        for (a, b) in &edges {
            if a != b {
                adjacency[*a].push(*b);
                adjacency[*b].push(*a);
            }
        }

        UndirectedGraph {
            names,
            adjacency,
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    /// Connected components in order of their lowest node index.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.node_count()];
        let mut components = vec![];

        for start in 0..self.node_count() {
            if seen[start] {
                continue;
            }

            seen[start] = true;
            let mut component = vec![start];
            let mut queue = VecDeque::from(vec![start]);

            while let Some(node) = queue.pop_front() {
                for next in &self.adjacency[node] {
                    if !seen[*next] {
                        seen[*next] = true;
                        component.push(*next);
                        queue.push_back(*next);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }

    /// Longest shortest path from `start` to any node it can reach.
    pub fn eccentricity(&self, start: usize) -> usize {
        let mut distances = vec![None; self.node_count()];
        distances[start] = Some(0);
        let mut queue = VecDeque::from(vec![start]);
        let mut furthest = 0;

        while let Some(node) = queue.pop_front() {
            let distance = distances[node].unwrap_or(0);
            furthest = furthest.max(distance);

            for next in &self.adjacency[node] {
                if distances[*next].is_none() {
                    distances[*next] = Some(distance + 1);
                    queue.push_back(*next);
                }
            }
        }

        furthest
    }

    /// Diameter of a connected node set, by breadth-first search from every node.
    pub fn diameter_of(&self, component: &[usize]) -> usize {
        component
            .iter()
            .map(|node| self.eccentricity(*node))
            .max()
            .unwrap_or(0)
    }

    pub fn statistics(&self) -> GraphStatistics {
        let components = self.components();

        // Strictly greater, so the first of equally large components wins.
        let mut largest: &[usize] = &[];
        for component in &components {
            if component.len() > largest.len() {
                largest = component;
            }
        }

        let mut in_largest = vec![false; self.node_count()];
        for node in largest {
            in_largest[*node] = true;
        }
        let lcc_edge_count = self.edges.iter().filter(|(a, _)| in_largest[*a]).count();
        let lcc_diameter = self.diameter_of(largest);

        GraphStatistics {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            component_count: components.len(),
            lcc_node_count: largest.len(),
            lcc_edge_count,
            diameter: if components.len() == 1 {
                Diameter::Finite(lcc_diameter)
            } else {
                Diameter::NotApplicable
            },
            lcc_diameter,
        }
    }
}
