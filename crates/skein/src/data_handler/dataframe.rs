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

use crate::data_handler::column::{Column, ColumnData};
use crate::data_handler::common::{
    ColumnMetadata, DataHandlerError, DatasetId, DatasetMetadata, Result,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
#[derive(Debug, Clone)]
pub struct DataFrame {
    pub columns: HashMap<String, Arc<Column>>,
    pub metadata: DatasetMetadata,
    column_order: Vec<String>,
}
#[derive(Debug)]
pub struct DataFrameView<'a> {
    source: &'a DataFrame,
    row_indices: Option<Arc<[usize]>>,
    column_selection: Option<Arc<[String]>>,
}
impl<'a> DataFrameView<'a> {
    pub fn new(source: &'a DataFrame) -> Self {
        Self {
            source,
            row_indices: None,
            column_selection: None,
        }
    }
    pub fn filter<P>(source: &'a DataFrame, predicate: P) -> Result<Self>
    where
        P: Fn(usize) -> bool + Send + Sync,
    {
        let indices: Vec<usize> = (0..source.row_count())
            .into_par_iter()
            .filter(|&i| predicate(i))
            .collect();
        Ok(Self {
            source,
            row_indices: Some(indices.into()),
            column_selection: None,
        })
    }
    pub fn select(mut self, columns: &[String]) -> Result<Self> {
        for col in columns {
            if !self.source.columns.contains_key(col) {
                return Err(DataHandlerError::ColumnNotFound(col.clone()));
            }
        }
        self.column_selection = Some(columns.to_vec().into());
        Ok(self)
    }
    pub fn row_count(&self) -> usize {
        self.row_indices
            .as_ref()
            .map_or(self.source.row_count(), |indices| indices.len())
    }
    pub fn column_count(&self) -> usize {
        self.column_selection
            .as_ref()
            .map_or(self.source.column_count(), |cols| cols.len())
    }
    pub fn collect(self) -> Result<DataFrame> {
        let mut new_df = DataFrame::new(DatasetMetadata {
            id: DatasetId::new(),
            name: format!("{}_view", self.source.metadata.name),
            row_count: self.row_count(),
            column_count: self.column_count(),
            created_at: chrono::Utc::now(),
            source_path: None,
        });
        let columns_to_process: &[String] = self
            .column_selection
            .as_ref()
            .map_or(self.source.column_order.as_slice(), |cols| cols.as_ref());
        for name in columns_to_process {
            let column = &self.source.columns[name];
            let new_column = if let Some(ref indices) = self.row_indices {
                column.select_rows(indices)?
            } else {
                column.as_ref().clone()
            };
            new_df.add_column(name.clone(), new_column)?;
        }
        Ok(new_df)
    }
}
impl DataFrame {
    pub fn new(metadata: DatasetMetadata) -> Self {
        Self {
            columns: HashMap::new(),
            metadata,
            column_order: Vec::new(),
        }
    }
    pub fn empty(name: &str) -> Self {
        Self::new(DatasetMetadata {
            id: DatasetId::new(),
            name: name.to_string(),
            row_count: 0,
            column_count: 0,
            created_at: chrono::Utc::now(),
            source_path: None,
        })
    }
    pub fn add_column(&mut self, name: String, column: Column) -> Result<()> {
        if !self.columns.is_empty() {
            let first_col_len = self.row_count();
            if column.len() != first_col_len {
                return Err(DataHandlerError::InvalidOperation(format!(
                    "Column length mismatch: expected {}, got {}",
                    first_col_len,
                    column.len()
                )));
            }
        }
        if !self.columns.contains_key(&name) {
            self.column_order.push(name.clone());
        }
        self.metadata.row_count = column.len();
        self.columns.insert(name, Arc::new(column));
        self.metadata.column_count = self.columns.len();
        Ok(())
    }
    pub fn row_count(&self) -> usize {
        self.metadata.row_count
    }
    pub fn column_count(&self) -> usize {
        self.metadata.column_count
    }
    pub fn column_names(&self) -> &[String] {
        &self.column_order
    }
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name).map(|arc| arc.as_ref())
    }
    pub fn column_metadata(&self) -> Vec<ColumnMetadata> {
        self.column_order
            .par_iter()
            .map(|name| {
                let column = &self.columns[name];
                ColumnMetadata {
                    name: name.clone(),
                    data_type: column.data_type(),
                    null_count: column.null_count(),
                }
            })
            .collect()
    }
    pub fn select(&self, column_names: &[String]) -> Result<DataFrame> {
        DataFrameView::new(self).select(column_names)?.collect()
    }
    pub fn filter<P>(&self, predicate: P) -> Result<DataFrame>
    where
        P: Fn(usize) -> bool + Send + Sync,
    {
        DataFrameView::filter(self, predicate)?.collect()
    }
    pub fn print_sample(&self, limit: usize) {
        let sample_size = std::cmp::min(limit, self.row_count());
        let header = self.column_order.join(" | ");
        println!("{header}");
        println!("{}", "-".repeat(header.len()));
        for i in 0..sample_size {
            let row: Vec<String> = self
                .column_order
                .iter()
                .map(|name| {
                    self.columns[name]
                        .get_string(i)
                        .unwrap_or_else(|| "NULL".to_string())
                })
                .collect();
            println!("{}", row.join(" | "));
        }
        if self.row_count() > sample_size {
            println!("... ({} more rows)", self.row_count() - sample_size);
        }
    }
}
