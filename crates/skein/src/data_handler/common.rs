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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
#[derive(Debug)]
pub enum DataHandlerError {
    IoError(std::io::Error),
    ParseError(String),
    ColumnNotFound(String),
    TypeMismatch(String),
    OutOfBounds(usize),
    InvalidOperation(String),
    JsonParseError(String),
    NullKey(String),
    SizeLimit(String),
    ThreadSafety(String),
}
impl std::error::Error for DataHandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            _ => None,
        }
    }
}
impl fmt::Display for DataHandlerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ParseError(s) => write!(f, "Parse error: {s}"),
            Self::ColumnNotFound(s) => write!(f, "Column not found: {s}"),
            Self::TypeMismatch(s) => write!(f, "Type mismatch: {s}"),
            Self::OutOfBounds(i) => write!(f, "Index out of bounds: {i}"),
            Self::InvalidOperation(s) => write!(f, "Invalid operation: {s}"),
            Self::JsonParseError(s) => write!(f, "JSON parse error: {s}"),
            Self::NullKey(s) => write!(f, "Null value in grouping column '{s}'"),
            Self::SizeLimit(s) => write!(f, "Size limit exceeded: {s}"),
            Self::ThreadSafety(s) => write!(f, "Thread safety error: {s}"),
        }
    }
}
impl From<std::io::Error> for DataHandlerError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error)
    }
}
impl From<std::num::ParseIntError> for DataHandlerError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::ParseError(error.to_string())
    }
}
impl From<std::num::ParseFloatError> for DataHandlerError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::ParseError(error.to_string())
    }
}
impl From<&str> for DataHandlerError {
    fn from(error: &str) -> Self {
        Self::InvalidOperation(error.to_string())
    }
}
impl From<String> for DataHandlerError {
    fn from(error: String) -> Self {
        Self::InvalidOperation(error)
    }
}
pub type Result<T> = std::result::Result<T, DataHandlerError>;
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DataType {
    Int64,
    Float64,
    String,
    Boolean,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetId(String);
impl DatasetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub id: DatasetId,
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub created_at: DateTime<Utc>,
    pub source_path: Option<std::path::PathBuf>,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: DataType,
    pub null_count: usize,
}
