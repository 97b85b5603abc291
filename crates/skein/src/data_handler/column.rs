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

use crate::data_handler::common::{DataHandlerError, DataType, Result};
use rayon::prelude::*;
use std::sync::Arc;
const MAX_STRING_LENGTH: usize = 1024 * 1024;
pub trait ColumnData: Send + Sync + std::fmt::Debug {
    fn len(&self) -> usize;
    fn data_type(&self) -> DataType;
    fn null_count(&self) -> usize;
    fn get_string(&self, index: usize) -> Option<String>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
#[derive(Debug, Clone)]
pub enum Column {
    Int64(Arc<[Option<i64>]>),
    Float64(Arc<[Option<f64>]>),
    String(Arc<[Option<Arc<str>>]>),
    Boolean(Arc<[Option<bool>]>),
}
impl ColumnData for Column {
    fn len(&self) -> usize {
        match self {
            Column::Int64(data) => data.len(),
            Column::Float64(data) => data.len(),
            Column::String(data) => data.len(),
            Column::Boolean(data) => data.len(),
        }
    }
    fn data_type(&self) -> DataType {
        match self {
            Column::Int64(_) => DataType::Int64,
            Column::Float64(_) => DataType::Float64,
            Column::String(_) => DataType::String,
            Column::Boolean(_) => DataType::Boolean,
        }
    }
    fn null_count(&self) -> usize {
        match self {
            Column::Int64(data) => data.par_iter().filter(|v| v.is_none()).count(),
            Column::Float64(data) => data.par_iter().filter(|v| v.is_none()).count(),
            Column::String(data) => data.par_iter().filter(|v| v.is_none()).count(),
            Column::Boolean(data) => data.par_iter().filter(|v| v.is_none()).count(),
        }
    }
    fn get_string(&self, index: usize) -> Option<String> {
        match self {
            Column::Int64(data) => data.get(index)?.as_ref().map(|v| v.to_string()),
            Column::Float64(data) => data.get(index)?.as_ref().map(|v| v.to_string()),
            Column::String(data) => data.get(index)?.as_ref().map(|s| s.to_string()),
            Column::Boolean(data) => data.get(index)?.as_ref().map(|v| v.to_string()),
        }
    }
}
impl Column {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn to_i64(&self, index: usize) -> Option<i64> {
        match self {
            Column::Int64(data) => data.get(index).copied()?,
            Column::Float64(data) => data.get(index).and_then(|opt| opt.map(|v| v as i64)),
            Column::String(data) => data
                .get(index)
                .and_then(|opt| opt.as_ref().and_then(|s| s.parse::<i64>().ok())),
            Column::Boolean(data) => data.get(index).and_then(|opt| opt.map(i64::from)),
        }
    }
    pub fn from_strings(values: &[Option<String>], data_type: DataType) -> Result<Self> {
        Ok(match data_type {
            DataType::Int64 => {
                let parsed: Result<Vec<Option<i64>>> = values
                    .par_iter()
                    .map(|opt_str| match opt_str {
                        None => Ok(None),
                        Some(s) if s.trim().is_empty() => Ok(None),
                        Some(s) => s.trim().parse::<i64>().map(Some).map_err(|e| e.into()),
                    })
                    .collect();
                Column::Int64(parsed?.into())
            }
            DataType::Float64 => {
                let parsed: Result<Vec<Option<f64>>> = values
                    .par_iter()
                    .map(|opt_str| match opt_str {
                        None => Ok(None),
                        Some(s) if s.trim().is_empty() => Ok(None),
                        Some(s) => s.trim().parse::<f64>().map(Some).map_err(|e| e.into()),
                    })
                    .collect();
                Column::Float64(parsed?.into())
            }
            DataType::Boolean => {
                let parsed: Result<Vec<Option<bool>>> = values
                    .par_iter()
                    .map(|opt_str| match opt_str {
                        None => Ok(None),
                        Some(s) if s.trim().is_empty() => Ok(None),
                        Some(s) => match s.to_lowercase().as_str() {
                            "true" | "t" | "1" | "yes" | "y" => Ok(Some(true)),
                            "false" | "f" | "0" | "no" | "n" => Ok(Some(false)),
                            _ => Err(DataHandlerError::ParseError(format!(
                                "Cannot parse '{s}' as boolean"
                            ))),
                        },
                    })
                    .collect();
                Column::Boolean(parsed?.into())
            }
            DataType::String => {
                let strings: Vec<Option<Arc<str>>> = values
                    .iter()
                    .map(|opt| {
                        opt.as_ref().map(|s| {
                            if s.len() > MAX_STRING_LENGTH {
                                Arc::from(&s[..MAX_STRING_LENGTH])
                            } else {
                                Arc::from(s.as_str())
                            }
                        })
                    })
                    .collect();
                Column::String(strings.into())
            }
        })
    }
    pub fn select_rows(&self, indices: &[usize]) -> Result<Column> {
        match self {
            Column::Int64(data) => {
                let new_data: Result<Vec<Option<i64>>> = indices
                    .par_iter()
                    .map(|&i| {
                        if i >= data.len() {
                            Err(DataHandlerError::OutOfBounds(i))
                        } else {
                            Ok(data.get(i).copied().unwrap_or(None))
                        }
                    })
                    .collect();
                Ok(Column::Int64(new_data?.into()))
            }
            Column::Float64(data) => {
                let new_data: Result<Vec<Option<f64>>> = indices
                    .par_iter()
                    .map(|&i| {
                        if i >= data.len() {
                            Err(DataHandlerError::OutOfBounds(i))
                        } else {
                            Ok(data.get(i).copied().unwrap_or(None))
                        }
                    })
                    .collect();
                Ok(Column::Float64(new_data?.into()))
            }
            Column::String(data) => {
                let new_data: Result<Vec<Option<Arc<str>>>> = indices
                    .par_iter()
                    .map(|&i| {
                        if i >= data.len() {
                            Err(DataHandlerError::OutOfBounds(i))
                        } else {
                            Ok(data.get(i).cloned().unwrap_or(None))
                        }
                    })
                    .collect();
                Ok(Column::String(new_data?.into()))
            }
            Column::Boolean(data) => {
                let new_data: Result<Vec<Option<bool>>> = indices
                    .par_iter()
                    .map(|&i| {
                        if i >= data.len() {
                            Err(DataHandlerError::OutOfBounds(i))
                        } else {
                            Ok(data.get(i).copied().unwrap_or(None))
                        }
                    })
                    .collect();
                Ok(Column::Boolean(new_data?.into()))
            }
        }
    }
}
#[derive(Debug)]
pub struct ColumnBuilder {
    values: Vec<Option<String>>,
    inferred_type: Option<DataType>,
}
impl ColumnBuilder {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            inferred_type: None,
        }
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            inferred_type: None,
        }
    }
    pub fn push(&mut self, value: Option<String>) -> Result<()> {
        if let Some(ref s) = value {
            if s.len() > MAX_STRING_LENGTH {
                return Err(DataHandlerError::SizeLimit(format!(
                    "String length {} exceeds limit {}",
                    s.len(),
                    MAX_STRING_LENGTH
                )));
            }
        }
        if self.inferred_type.is_none() && value.is_some() {
            self.inferred_type = Some(Self::infer_type(value.as_ref().unwrap()));
        }
        self.values.push(value);
        Ok(())
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn build(self) -> Result<Column> {
        let data_type = self.inferred_type.unwrap_or(DataType::String);
        Column::from_strings(&self.values, data_type)
    }
    fn infer_type(sample: &str) -> DataType {
        if sample.parse::<i64>().is_ok() {
            DataType::Int64
        } else if sample.parse::<f64>().is_ok() {
            DataType::Float64
        } else if matches!(sample.to_lowercase().as_str(), "true" | "false") {
            DataType::Boolean
        } else {
            DataType::String
        }
    }
}
impl Default for ColumnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_infers_int_from_first_value() {
        let mut builder = ColumnBuilder::new();
        builder.push(Some("1930".to_string())).unwrap();
        builder.push(None).unwrap();
        builder.push(Some("1895".to_string())).unwrap();
        let column = builder.build().unwrap();
        assert_eq!(column.data_type(), DataType::Int64);
        assert_eq!(column.len(), 3);
        assert_eq!(column.null_count(), 1);
        assert_eq!(column.to_i64(2), Some(1895));
    }

    #[test]
    fn builder_defaults_to_string_for_all_nulls() {
        let mut builder = ColumnBuilder::new();
        builder.push(None).unwrap();
        builder.push(None).unwrap();
        let column = builder.build().unwrap();
        assert_eq!(column.data_type(), DataType::String);
        assert_eq!(column.null_count(), 2);
    }

    #[test]
    fn select_rows_out_of_bounds_is_an_error() {
        let column = Column::from_strings(
            &[Some("American".to_string()), Some("French".to_string())],
            DataType::String,
        )
        .unwrap();
        assert!(matches!(
            column.select_rows(&[0, 7]),
            Err(DataHandlerError::OutOfBounds(7))
        ));
    }

    #[test]
    fn int_parse_failure_surfaces_as_parse_error() {
        let result = Column::from_strings(
            &[Some("12".to_string()), Some("abc".to_string())],
            DataType::Int64,
        );
        assert!(matches!(result, Err(DataHandlerError::ParseError(_))));
    }
}
