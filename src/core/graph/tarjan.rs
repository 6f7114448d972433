//! Iterative Tarjan strongly-connected-components (spec 4.2). Recursion is
//! avoided so pathologically deep dependency chains cannot blow the stack.

use super::csr::Csr;

pub struct TarjanResult {
    /// Each inner vec is one SCC's member node indices, sorted.
    pub components: Vec<Vec<usize>>,
    /// `component_of[v]` is the index into `components` that `v` belongs to.
    pub component_of: Vec<usize>,
}

impl TarjanResult {
    pub fn cycle_count(&self) -> usize {
        self.components.iter().filter(|c| c.len() > 1).count()
    }
}

pub fn tarjan_scc(graph: &Csr) -> TarjanResult {
    let n = graph.node_count();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut node_stack: Vec<usize> = Vec::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    let mut component_of = vec![0usize; n];
    let mut counter = 0usize;

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }
        // `work_stack` holds `(node, next child slot to examine)`.
        let mut work_stack: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = Some(counter);
        lowlink[root] = counter;
        counter += 1;
        node_stack.push(root);
        on_stack[root] = true;

        while let Some(&mut (v, ref mut child_cursor)) = work_stack.last_mut() {
            let neighbors = graph.out_neighbors(v);
            if *child_cursor < neighbors.len() {
                let w = neighbors[*child_cursor];
                *child_cursor += 1;
                match index[w] {
                    None => {
                        index[w] = Some(counter);
                        lowlink[w] = counter;
                        counter += 1;
                        node_stack.push(w);
                        on_stack[w] = true;
                        work_stack.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
            } else {
                work_stack.pop();
                if let Some(&(parent, _)) = work_stack.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v] == index[v].unwrap() {
                    let mut members = Vec::new();
                    loop {
                        let w = node_stack.pop().unwrap();
                        on_stack[w] = false;
                        component_of[w] = components.len();
                        members.push(w);
                        if w == v {
                            break;
                        }
                    }
                    members.sort_unstable();
                    components.push(members);
                }
            }
        }
    }

    TarjanResult {
        components,
        component_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dag_has_zero_cycles() {
        let csr = Csr::build(3, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let result = tarjan_scc(&csr);
        assert_eq!(result.cycle_count(), 0);
        assert_eq!(result.components.len(), 3);
    }

    #[test]
    fn three_cycle_is_one_scc_of_size_three() {
        let csr = Csr::build(3, &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0)]);
        let result = tarjan_scc(&csr);
        assert_eq!(result.cycle_count(), 1);
        assert_eq!(result.components[0].len(), 3);
    }

    #[test]
    fn every_reported_cycle_has_size_at_least_two() {
        let csr = Csr::build(4, &[(0, 1, 1.0), (1, 0, 1.0), (2, 3, 1.0)]);
        let result = tarjan_scc(&csr);
        for component in &result.components {
            if component.len() > 1 {
                assert!(component.len() >= 2);
            }
        }
    }

    #[test]
    fn two_disjoint_cycles_are_separate_components() {
        let csr = Csr::build(6, &[(0, 1, 1.0), (1, 0, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 2, 1.0)]);
        let result = tarjan_scc(&csr);
        assert_eq!(result.cycle_count(), 2);
    }
}
