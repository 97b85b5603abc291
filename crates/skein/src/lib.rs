// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

pub mod data_handler;
pub mod error;
pub mod flow;
pub mod render;

pub use data_handler::{
    export_csv, load_json, Column, ColumnBuilder, ColumnData, CsvWriter, DataFrame, DataType,
    JsonReader, TransformationEngine,
};
pub use error::{ConfigError, FlowDiagramError, FlowError, RenderError, Result};
pub use flow::{
    chained_edges, extract_local_network, pairwise_edges, Edge, EdgeList, FlowPath,
    DEFAULT_MIN_COUNT, SOURCE_ROLE, TARGET_ROLE,
};
pub use render::{RenderConfig, SankeyRenderer};
use std::path::Path;

/// Convenience facade tying the edge builder to the renderer: one call per
/// diagram, in the shape the analysis programs use.
pub struct FlowDiagramSystem {
    renderer: SankeyRenderer,
    min_count: usize,
}
impl FlowDiagramSystem {
    pub fn new() -> Self {
        Self {
            renderer: SankeyRenderer::new(),
            min_count: DEFAULT_MIN_COUNT,
        }
    }
    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            renderer: SankeyRenderer::with_config(config),
            min_count: DEFAULT_MIN_COUNT,
        }
    }
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }
    /// Extracts the filtered edge list for `path` and renders it to an
    /// HTML diagram at `output`. Returns the edge list so callers can
    /// export or inspect it.
    pub fn render_flow(
        &self,
        dataframe: &DataFrame,
        path: &FlowPath,
        count_name: &str,
        title: &str,
        output: &Path,
    ) -> Result<EdgeList> {
        let edge_list = extract_local_network(dataframe, path, count_name, self.min_count)?;
        self.renderer.render_to_html(&edge_list, title, output)?;
        Ok(edge_list)
    }
}
impl Default for FlowDiagramSystem {
    fn default() -> Self {
        Self::new()
    }
}
