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

use crate::data_handler::DataHandlerError;
use thiserror::Error;
#[derive(Error, Debug)]
pub enum FlowDiagramError {
    #[error("Data handling error: {0}")]
    Data(#[from] DataHandlerError),
    #[error("Flow extraction error: {0}")]
    Flow(#[from] FlowError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("A flow path connects exactly 2 or 3 columns, got {arity}")]
    InvalidPathArity { arity: usize },
    #[error("Duplicate column '{name}' in flow path")]
    DuplicatePathColumn { name: String },
}
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to serialise sankey figure: {source}")]
    FigureSerialisation {
        #[from]
        source: serde_json::Error,
    },
    #[error("Failed to write diagram '{path}': {source}")]
    OutputFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse YAML configuration: {source}")]
    YamlParseError {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Failed to read render configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid render configuration: {reason}")]
    ValidationFailed { reason: String },
}
pub type Result<T> = std::result::Result<T, FlowDiagramError>;
impl From<anyhow::Error> for FlowDiagramError {
    fn from(err: anyhow::Error) -> Self {
        FlowDiagramError::Config(ConfigError::ValidationFailed {
            reason: err.to_string(),
        })
    }
}
impl FlowDiagramError {
    pub fn category(&self) -> &'static str {
        match self {
            FlowDiagramError::Data(_) => "Data",
            FlowDiagramError::Flow(_) => "Flow",
            FlowDiagramError::Render(_) => "Render",
            FlowDiagramError::Config(_) => "Configuration",
            FlowDiagramError::Io(_) => "I/O",
        }
    }
}
