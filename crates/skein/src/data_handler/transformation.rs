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
use crate::data_handler::common::{DataHandlerError, Result};
use crate::data_handler::dataframe::DataFrame;
use rayon::prelude::*;
use std::collections::HashMap;

/// One distinct combination of grouping-key values and the number of rows
/// sharing it. The aggregation is always a row count; there is no
/// configurable aggregate function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: Vec<String>,
    pub count: usize,
}
#[derive(Debug)]
pub struct TransformationEngine {
    parallel_threshold: usize,
}
impl TransformationEngine {
    pub fn new() -> Self {
        Self {
            parallel_threshold: 10000,
        }
    }
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
    /// Groups rows by the given columns and counts rows per distinct key.
    /// Output order is unspecified; callers impose their own ordering.
    /// A null in any grouping column is an error.
    pub fn group_count(
        &self,
        dataframe: &DataFrame,
        group_columns: &[String],
    ) -> Result<Vec<GroupCount>> {
        let groups = if dataframe.row_count() > self.parallel_threshold {
            self.build_groups_parallel(dataframe, group_columns)?
        } else {
            self.build_groups_sequential(dataframe, group_columns)?
        };
        Ok(groups
            .into_iter()
            .map(|(key, indices)| GroupCount {
                key,
                count: indices.len(),
            })
            .collect())
    }
    fn key_columns<'a>(
        dataframe: &'a DataFrame,
        group_columns: &[String],
    ) -> Result<Vec<(String, &'a Column)>> {
        group_columns
            .iter()
            .map(|name| {
                dataframe
                    .get_column(name)
                    .ok_or_else(|| DataHandlerError::ColumnNotFound(name.clone()))
                    .map(|col| (name.clone(), col))
            })
            .collect()
    }
    fn row_key(columns: &[(String, &Column)], index: usize) -> Result<Vec<String>> {
        columns
            .iter()
            .map(|(name, column)| {
                column
                    .get_string(index)
                    .ok_or_else(|| DataHandlerError::NullKey(name.clone()))
            })
            .collect()
    }
    fn build_groups_sequential(
        &self,
        dataframe: &DataFrame,
        group_columns: &[String],
    ) -> Result<HashMap<Vec<String>, Vec<usize>>> {
        let columns = Self::key_columns(dataframe, group_columns)?;
        let mut groups: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for i in 0..dataframe.row_count() {
            groups.entry(Self::row_key(&columns, i)?).or_default().push(i);
        }
        Ok(groups)
    }
    fn build_groups_parallel(
        &self,
        dataframe: &DataFrame,
        group_columns: &[String],
    ) -> Result<HashMap<Vec<String>, Vec<usize>>> {
        let columns = Self::key_columns(dataframe, group_columns)?;
        let chunk_size = std::cmp::max(1000, dataframe.row_count() / rayon::current_num_threads());
        let indices: Vec<usize> = (0..dataframe.row_count()).collect();
        let partials: Result<Vec<HashMap<Vec<String>, Vec<usize>>>> = indices
            .par_chunks(chunk_size)
            .map(|chunk| {
                let mut local: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
                for &i in chunk {
                    local.entry(Self::row_key(&columns, i)?).or_default().push(i);
                }
                Ok(local)
            })
            .collect();
        let mut groups: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for local in partials? {
            for (key, idx) in local {
                groups.entry(key).or_default().extend(idx);
            }
        }
        Ok(groups)
    }
}
impl Default for TransformationEngine {
    fn default() -> Self {
        Self::new()
    }
}
