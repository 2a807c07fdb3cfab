/*!
 * Ethernity Threat Detector - Call Graph
 *
 * Grafo dirigido de chamadas indexado por endereço e busca de ciclos
 * (caminhos de reentrância) com profundidade limitada.
 */

use ethereum_types::U256;
use std::collections::{BTreeMap, BTreeSet};

use crate::signatures::{SignatureKind, SignatureRegistry};
use crate::trace::CallRecord;

/// Aresta do grafo de chamadas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEdge {
    pub to: String,
    /// Índice da chamada na lista de entrada
    pub call_index: usize,
    pub value: U256,
    /// Aresta reversa inferida (possível callback)
    pub callback: bool,
}

/// Caminho de reentrância: do primeiro nó até a repetição, inclusive
pub type CyclePath = Vec<String>;

/// Multigrafo dirigido de chamadas
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    adjacency: BTreeMap<String, Vec<CallEdge>>,
}

impl CallGraph {
    /// Constrói o grafo a partir de uma lista de chamadas de um mesmo nível
    ///
    /// Chamadas aninhadas não são achatadas. Chamadas sem `from` ou `to` são
    /// ignoradas.
    pub fn build(calls: &[CallRecord], registry: &SignatureRegistry) -> Self {
        let mut graph = Self::default();

        for (index, call) in calls.iter().enumerate() {
            let (Some(from), Some(to)) = (call.from_address(), call.to_address()) else {
                continue;
            };
            let value = call.value_or_zero();

            graph.add_edge(&from, &to, index, value, false);

            // Transferências de valor e saques são o vetor típico de callback
            let withdraw_like =
                registry.classify(call.input.as_deref()) == Some(SignatureKind::Withdraw);
            if !value.is_zero() || withdraw_like {
                graph.add_edge(&to, &from, index, value, true);
            }
        }

        graph
    }

    fn add_edge(&mut self, from: &str, to: &str, call_index: usize, value: U256, callback: bool) {
        self.adjacency.entry(to.to_string()).or_default();
        self.adjacency.entry(from.to_string()).or_default().push(CallEdge {
            to: to.to_string(),
            call_index,
            value,
            callback,
        });
    }

    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.adjacency.keys()
    }

    pub fn edges_from(&self, node: &str) -> &[CallEdge] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Busca em profundidade a partir de cada nó, registrando ciclos
    ///
    /// `max_depth` conta arestas a partir da raiz; nós nessa profundidade não
    /// são expandidos. Cada nó é raiz exatamente uma vez.
    pub fn find_cycles(&self, max_depth: usize) -> BTreeSet<CyclePath> {
        let mut cycles = BTreeSet::new();
        let mut path = Vec::new();

        for root in self.adjacency.keys() {
            self.search(root, 0, max_depth, &mut path, &mut cycles);
            debug_assert!(path.is_empty());
        }

        cycles
    }

    fn search(
        &self,
        node: &str,
        depth: usize,
        max_depth: usize,
        path: &mut Vec<String>,
        cycles: &mut BTreeSet<CyclePath>,
    ) {
        if let Some(position) = path.iter().position(|visited| visited == node) {
            let mut cycle = path[position..].to_vec();
            cycle.push(node.to_string());
            cycles.insert(cycle);
            return;
        }

        if depth >= max_depth {
            return;
        }

        // Arestas paralelas levam ao mesmo resultado
        let targets: BTreeSet<&str> = self.edges_from(node).iter().map(|e| e.to.as_str()).collect();

        path.push(node.to_string());
        for target in targets {
            self.search(target, depth + 1, max_depth, path, cycles);
        }
        path.pop();
    }
}

/// Conjunto de endereços que participam de um ciclo
pub fn cycle_members(cycle: &[String]) -> BTreeSet<&str> {
    cycle.iter().map(String::as_str).collect()
}
