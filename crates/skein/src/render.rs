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

use crate::error::{ConfigError, RenderError, Result};
use crate::flow::EdgeList;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

/// Style settings for rendered diagrams. Node ordering, layout and
/// interactivity are owned by the Plotly renderer itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub node_padding: f64,
    pub node_thickness: f64,
    pub colourway: Vec<String>,
}
impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            node_padding: 15.0,
            node_thickness: 20.0,
            colourway: vec![
                "#636efa".to_string(),
                "#ef553b".to_string(),
                "#00cc96".to_string(),
                "#ab63fa".to_string(),
                "#ffa15a".to_string(),
                "#19d3f3".to_string(),
                "#ff6692".to_string(),
                "#b6e880".to_string(),
            ],
        }
    }
}
impl RenderConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            ConfigError::ConfigFileError {
                path: path.as_ref().display().to_string(),
                source,
            }
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "width and height must be positive".to_string(),
            }
            .into());
        }
        if self.colourway.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "colourway must name at least one colour".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Renders an edge list as a self-contained HTML page embedding a Plotly
/// sankey figure. Edge width is proportional to weight.
#[derive(Debug, Clone, Default)]
pub struct SankeyRenderer {
    config: RenderConfig,
}
impl SankeyRenderer {
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
        }
    }
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }
    /// Builds the Plotly figure for an edge list. Node labels are
    /// deduplicated across sources and targets in first-appearance order,
    /// so a chained list's middle column shows as a single node layer.
    pub fn figure(&self, edge_list: &EdgeList, title: &str) -> serde_json::Value {
        let mut labels: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut sources = Vec::with_capacity(edge_list.len());
        let mut targets = Vec::with_capacity(edge_list.len());
        let mut values = Vec::with_capacity(edge_list.len());
        for edge in edge_list.edges() {
            for (slot, label) in [(&mut sources, &edge.source), (&mut targets, &edge.target)] {
                let node = *index.entry(label.clone()).or_insert_with(|| {
                    labels.push(label.clone());
                    labels.len() - 1
                });
                slot.push(node);
            }
            values.push(edge.weight);
        }
        let colours: Vec<&str> = labels
            .iter()
            .enumerate()
            .map(|(i, _)| self.config.colourway[i % self.config.colourway.len()].as_str())
            .collect();
        json!({
            "data": [{
                "type": "sankey",
                "orientation": "h",
                "node": {
                    "label": labels,
                    "color": colours,
                    "pad": self.config.node_padding,
                    "thickness": self.config.node_thickness,
                },
                "link": {
                    "source": sources,
                    "target": targets,
                    "value": values,
                },
            }],
            "layout": {
                "title": { "text": title },
                "width": self.config.width,
                "height": self.config.height,
            },
        })
    }
    pub fn render_to_html(&self, edge_list: &EdgeList, title: &str, path: &Path) -> Result<()> {
        if edge_list.is_empty() {
            tracing::warn!(title, "rendering an empty edge list; diagram will be blank");
        }
        let figure = self.figure(edge_list, title);
        let figure_json = serde_json::to_string(&figure).map_err(RenderError::from)?;
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.32.0.min.js"></script>
</head>
<body>
<div id="diagram"></div>
<script>
const figure = {figure_json};
Plotly.newPlot("diagram", figure.data, figure.layout);
</script>
</body>
</html>
"#
        );
        std::fs::write(path, html).map_err(|source| RenderError::OutputFile {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), edges = edge_list.len(), "wrote sankey diagram");
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handler::{Column, DataFrame, DataType};
    use crate::flow::{extract_local_network, FlowPath};

    fn chained_list() -> EdgeList {
        let mut df = DataFrame::empty("test");
        for (name, values) in [
            ("Nationality", vec!["American"; 4]),
            ("Gender", vec!["male"; 4]),
            ("Decade", vec!["1990"; 4]),
        ] {
            let values: Vec<Option<String>> =
                values.iter().map(|v| Some(v.to_string())).collect();
            df.add_column(
                name.to_string(),
                Column::from_strings(&values, DataType::String).unwrap(),
            )
            .unwrap();
        }
        let path = FlowPath::new(["Nationality", "Gender", "Decade"]).unwrap();
        extract_local_network(&df, &path, "Value", 1).unwrap()
    }

    #[test]
    fn shared_middle_column_becomes_one_node() {
        let list = chained_list();
        let figure = SankeyRenderer::new().figure(&list, "test");
        let node = &figure["data"][0]["node"];
        let labels: Vec<&str> = node["label"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["American", "male", "1990"]);
        let link = &figure["data"][0]["link"];
        assert_eq!(link["source"], json!([0, 1]));
        assert_eq!(link["target"], json!([1, 2]));
        assert_eq!(link["value"], json!([4, 4]));
    }

    #[test]
    fn empty_edge_list_renders_a_degenerate_figure() {
        let empty = {
            let mut df = DataFrame::empty("empty");
            for name in ["Nationality", "Decade"] {
                df.add_column(
                    name.to_string(),
                    Column::from_strings(&[], DataType::String).unwrap(),
                )
                .unwrap();
            }
            let path = FlowPath::new(["Nationality", "Decade"]).unwrap();
            extract_local_network(&df, &path, "Value", 20).unwrap()
        };
        let figure = SankeyRenderer::new().figure(&empty, "empty");
        assert_eq!(figure["data"][0]["link"]["value"], json!([]));
    }

    #[test]
    fn config_loads_from_yaml_with_partial_overrides() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "width: 900\nheight: 600\n").unwrap();
        let config = RenderConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.width, 900);
        assert_eq!(config.height, 600);
        assert_eq!(config.node_padding, RenderConfig::default().node_padding);
    }

    #[test]
    fn zero_dimensions_fail_validation() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "width: 0\n").unwrap();
        assert!(RenderConfig::from_yaml_file(file.path()).is_err());
    }

    #[test]
    fn html_output_embeds_the_figure() {
        let list = chained_list();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("diagram.html");
        SankeyRenderer::new()
            .render_to_html(&list, "Nationality to Decade", &out)
            .unwrap();
        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("\"type\":\"sankey\""));
        assert!(html.contains("Plotly.newPlot"));
    }
}
