//! Grouping engine.
//!
//! Uses the containment parents of the nodes: every node sits above a grid
//! of its children, so nodes sharing a parent form a compact block. Parent
//! chains that loop back are cut at the node where the loop is found.

use log::debug;
use stratum_core::geometry::{Point, Size};

use crate::layout::{
    LayoutEngine, LayoutError,
    config::{EdgeRouting, LayoutConfig},
    finalize::{Waypoints, finalize},
    graph::{LayoutGraph, LayoutResult, Topology},
};

use super::empty_result;

/// Tree layout engine
#[derive(Debug, Clone)]
pub struct Engine {
    spacing: f32,
}

/// Space taken by a node and everything below it.
#[derive(Debug, Clone, Copy, Default)]
struct Block {
    size: Size,
    /// Cell size and column count of the children grid.
    cell: Size,
    columns: usize,
}

impl Engine {
    pub fn new() -> Self {
        Self { spacing: 40.0 }
    }

    /// Set the default gap between blocks
    pub fn set_spacing(&mut self, spacing: f32) -> &mut Self {
        self.spacing = spacing;
        self
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Parent per node with every parent cycle cut.
fn acyclic_parents(parents: &[Option<usize>]) -> Vec<Option<usize>> {
    // 0 = unresolved, 1 = on the current chain, 2 = resolved
    let mut state = vec![0u8; parents.len()];
    let mut result = parents.to_vec();
    for start in 0..parents.len() {
        let mut chain = Vec::new();
        let mut node = start;
        loop {
            if state[node] == 2 {
                break;
            }
            if state[node] == 1 {
                result[node] = None;
                break;
            }
            state[node] = 1;
            chain.push(node);
            match result[node] {
                Some(parent) => node = parent,
                None => break,
            }
        }
        for node in chain {
            state[node] = 2;
        }
    }
    result
}

/// Children grid dimensions for `count` children of uniform `cell` size.
fn grid(count: usize, cell: Size, spacing: f32) -> (usize, Size) {
    if count == 0 {
        return (0, Size::default());
    }
    let columns = (count as f32).sqrt().ceil().max(1.0) as usize;
    let rows = count.div_ceil(columns);
    let size = Size::new(
        columns as f32 * cell.width() + (columns - 1) as f32 * spacing,
        rows as f32 * cell.height() + (rows - 1) as f32 * spacing,
    );
    (columns, size)
}

impl LayoutEngine for Engine {
    fn calculate_layout(
        &self,
        graph: &LayoutGraph,
        config: &LayoutConfig,
    ) -> Result<LayoutResult, LayoutError> {
        let topology = Topology::new(graph);
        if topology.is_empty() {
            return Ok(empty_result(graph, &topology));
        }

        let n = topology.len();
        let spacing = config.spacing_or(self.spacing);
        let parents = acyclic_parents(&topology.parents);
        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for (node, parent) in parents.iter().enumerate() {
            match parent {
                Some(parent) => children[*parent].push(node),
                None => roots.push(node),
            }
        }

        // Post-order so that children are measured before their parent.
        let mut order = Vec::with_capacity(n);
        let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            stack.push((node, true));
            stack.extend(children[node].iter().rev().map(|&c| (c, false)));
        }

        let mut blocks = vec![Block::default(); n];
        for &node in &order {
            let own = topology.sizes[node];
            let cell = children[node]
                .iter()
                .fold(Size::default(), |acc, &child| acc.max(blocks[child].size));
            let (columns, grid_size) = grid(children[node].len(), cell, spacing);
            let height = if columns == 0 {
                own.height()
            } else {
                own.height() + spacing + grid_size.height()
            };
            blocks[node] = Block {
                size: Size::new(own.width().max(grid_size.width()), height),
                cell,
                columns,
            };
        }

        // Roots on their own grid, twice as far apart as siblings.
        let root_gap = spacing * 2.0;
        let root_cell = roots
            .iter()
            .fold(Size::default(), |acc, &root| acc.max(blocks[root].size));
        let (root_columns, _) = grid(roots.len(), root_cell, root_gap);

        let mut positions = vec![Point::new(f32::NAN, f32::NAN); n];
        let mut pending: Vec<(usize, Point)> = roots
            .iter()
            .enumerate()
            .map(|(k, &root)| {
                let column = (k % root_columns.max(1)) as f32;
                let row = (k / root_columns.max(1)) as f32;
                let cell_origin = Point::new(
                    column * (root_cell.width() + root_gap),
                    row * (root_cell.height() + root_gap),
                );
                let inset = (root_cell.width() - blocks[root].size.width()) / 2.0;
                (root, cell_origin.add_point(Point::new(inset, 0.0)))
            })
            .collect();

        // Top-down: each entry is a node and the top-left corner of its block.
        while let Some((node, origin)) = pending.pop() {
            let block = blocks[node];
            let own = topology.sizes[node];
            positions[node] = Point::new(
                origin.x() + block.size.width() / 2.0,
                origin.y() + own.height() / 2.0,
            );
            if block.columns == 0 {
                continue;
            }

            let (_, grid_size) = grid(children[node].len(), block.cell, spacing);
            let grid_origin = Point::new(
                origin.x() + (block.size.width() - grid_size.width()) / 2.0,
                origin.y() + own.height() + spacing,
            );
            for (k, &child) in children[node].iter().enumerate() {
                let column = (k % block.columns) as f32;
                let row = (k / block.columns) as f32;
                let cell_origin = grid_origin.add_point(Point::new(
                    column * (block.cell.width() + spacing),
                    row * (block.cell.height() + spacing),
                ));
                let inset = (block.cell.width() - blocks[child].size.width()) / 2.0;
                pending.push((child, cell_origin.add_point(Point::new(inset, 0.0))));
            }
        }

        debug!(nodes = n, roots = roots.len(); "Tree layout finished");

        Ok(finalize(
            graph,
            &topology,
            positions,
            &Waypoints::new(),
            config.edge_routing_or(EdgeRouting::Straight),
            config.direction(),
        ))
    }
}
