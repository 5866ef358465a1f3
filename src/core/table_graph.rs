use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use tracing::debug;

use crate::models::schema::Table;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DanglingReference {
    pub table: String,
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DuplicateColumn {
    pub table: String,
    pub column: String,
}

/// 外键图分析结果，仅作提示，不阻断请求构建
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct SchemaReport {
    /// 被引用的表排在引用方之前；有环时退化为创建顺序
    pub generation_order: Vec<String>,
    pub dangling_references: Vec<DanglingReference>,
    pub duplicate_tables: Vec<String>,
    pub duplicate_columns: Vec<DuplicateColumn>,
    pub has_cycle: bool,
}

impl SchemaReport {
    pub fn is_clean(&self) -> bool {
        self.dangling_references.is_empty()
            && self.duplicate_tables.is_empty()
            && self.duplicate_columns.is_empty()
            && !self.has_cycle
    }
}

/// Kahn 拓扑排序，同时就绪的表按创建顺序出队；有环返回 None
fn stable_order(graph: &DiGraph<&str, ()>) -> Option<Vec<NodeIndex>> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(i)) = ready.pop() {
        let node = NodeIndex::new(i);
        order.push(node);
        for child in graph.neighbors_directed(node, Direction::Outgoing) {
            let d = &mut in_degree[child.index()];
            *d -= 1;
            if *d == 0 {
                ready.push(Reverse(child.index()));
            }
        }
    }
    (order.len() == graph.node_count()).then_some(order)
}

pub fn analyze_schema(tables: &[Table]) -> SchemaReport {
    let mut report = SchemaReport::default();

    // 同名表只保留第一次出现的定义
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    let mut first_def: HashMap<&str, &Table> = HashMap::new();
    for table in tables {
        if index.contains_key(table.name.as_str()) {
            if !report.duplicate_tables.contains(&table.name) {
                report.duplicate_tables.push(table.name.clone());
            }
            continue;
        }
        index.insert(&table.name, graph.add_node(&table.name));
        first_def.insert(&table.name, table);
    }

    for table in tables {
        let mut seen = HashSet::new();
        for col in &table.columns {
            if !seen.insert(col.name.as_str()) {
                report.duplicate_columns.push(DuplicateColumn {
                    table: table.name.clone(),
                    column: col.name.clone(),
                });
            }

            let Some((ref_table, ref_column)) = col.reference() else {
                continue;
            };
            let target = first_def.get(ref_table);
            let resolved = target.is_some_and(|t| t.column(ref_column).is_some());
            if !resolved {
                report.dangling_references.push(DanglingReference {
                    table: table.name.clone(),
                    column: col.name.clone(),
                    references_table: ref_table.to_string(),
                    references_column: ref_column.to_string(),
                });
            }
            // 自引用不参与排序
            if ref_table == table.name {
                continue;
            }
            if let (Some(&parent), Some(&child)) = (index.get(ref_table), index.get(table.name.as_str())) {
                graph.update_edge(parent, child, ());
            }
        }
    }

    match stable_order(&graph) {
        Some(order) => {
            report.generation_order = order.into_iter().map(|n| graph[n].to_string()).collect();
        }
        None => {
            debug!("外键图存在环，按创建顺序生成");
            report.has_cycle = true;
            report.generation_order = graph.node_weights().map(|n| n.to_string()).collect();
        }
    }

    report
}
