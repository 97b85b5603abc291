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

//! Turns a table plus a path of 2 or 3 categorical columns into a
//! filtered, sorted edge list for a sankey diagram.
//!
//! A 3-column path is modelled as two independent pairwise hops sharing
//! the middle column, not as a three-way joint distribution. That keeps
//! the middle column's labels acting as both targets of the first hop and
//! sources of the second, which is what a stacked sankey expects.

use crate::data_handler::{Column, DataFrame, TransformationEngine};
use crate::error::{FlowError, Result};

pub const DEFAULT_MIN_COUNT: usize = 20;
/// Column labels used when a chained edge list is materialised as a table.
pub const SOURCE_ROLE: &str = "Source";
pub const TARGET_ROLE: &str = "Target";

/// Ordered list of 2 or 3 column names defining the hops of a sankey
/// diagram. Any other arity is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPath {
    columns: Vec<String>,
}
impl FlowPath {
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if !(2..=3).contains(&columns.len()) {
            return Err(FlowError::InvalidPathArity {
                arity: columns.len(),
            }
            .into());
        }
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(FlowError::DuplicatePathColumn { name: name.clone() }.into());
            }
        }
        Ok(Self { columns })
    }
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn is_chained(&self) -> bool {
        self.columns.len() == 3
    }
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: usize,
}
/// An edge list plus the column labels to use when it is handed to a
/// renderer or exporter as a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeList {
    edges: Vec<Edge>,
    source_label: String,
    target_label: String,
    value_label: String,
}
impl EdgeList {
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
    pub fn source_label(&self) -> &str {
        &self.source_label
    }
    pub fn target_label(&self) -> &str {
        &self.target_label
    }
    pub fn value_label(&self) -> &str {
        &self.value_label
    }
    pub fn len(&self) -> usize {
        self.edges.len()
    }
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
    pub fn total_weight(&self) -> usize {
        self.edges.iter().map(|e| e.weight).sum()
    }
    /// Materialises the list as a three-column table: source, target and
    /// count, named by the labels carried on the list.
    pub fn into_dataframe(self, name: &str) -> Result<DataFrame> {
        let sources: Vec<Option<String>> =
            self.edges.iter().map(|e| Some(e.source.clone())).collect();
        let targets: Vec<Option<String>> =
            self.edges.iter().map(|e| Some(e.target.clone())).collect();
        let weights: Vec<Option<i64>> = self.edges.iter().map(|e| Some(e.weight as i64)).collect();
        let mut df = DataFrame::empty(name);
        df.add_column(
            self.source_label.clone(),
            Column::from_strings(&sources, crate::data_handler::DataType::String)?,
        )?;
        df.add_column(
            self.target_label.clone(),
            Column::from_strings(&targets, crate::data_handler::DataType::String)?,
        )?;
        df.add_column(self.value_label.clone(), Column::Int64(weights.into()))?;
        Ok(df)
    }
}

/// Groups rows by the (col_a, col_b) value pair and emits one edge per
/// distinct combination, weighted by its row count. Output order is
/// unspecified; `extract_local_network` imposes the ordering.
pub fn pairwise_edges(
    dataframe: &DataFrame,
    col_a: &str,
    col_b: &str,
    count_name: &str,
) -> Result<EdgeList> {
    let engine = TransformationEngine::new();
    let groups = engine.group_count(dataframe, &[col_a.to_string(), col_b.to_string()])?;
    let edges = groups
        .into_iter()
        .map(|group| {
            let mut key = group.key.into_iter();
            Edge {
                source: key.next().unwrap_or_default(),
                target: key.next().unwrap_or_default(),
                weight: group.count,
            }
        })
        .collect();
    Ok(EdgeList {
        edges,
        source_label: col_a.to_string(),
        target_label: col_b.to_string(),
        value_label: count_name.to_string(),
    })
}

/// Stacks two pairwise hops (a→b, then b→c) into one edge list under the
/// `Source`/`Target` role labels, first hop's edges first. Each hop
/// independently accounts for every row of the input.
pub fn chained_edges(
    dataframe: &DataFrame,
    col_a: &str,
    col_b: &str,
    col_c: &str,
    count_name: &str,
) -> Result<EdgeList> {
    let first_hop = pairwise_edges(dataframe, col_a, col_b, count_name)?;
    let second_hop = pairwise_edges(dataframe, col_b, col_c, count_name)?;
    let mut edges = first_hop.edges;
    edges.extend(second_hop.edges);
    Ok(EdgeList {
        edges,
        source_label: SOURCE_ROLE.to_string(),
        target_label: TARGET_ROLE.to_string(),
        value_label: count_name.to_string(),
    })
}

/// Builds the edge list for a path, sorts it by weight descending (ties
/// broken by source then target, ascending) and drops every edge whose
/// weight is below `min_count`. Pure function of its inputs; the input
/// table is never mutated.
pub fn extract_local_network(
    dataframe: &DataFrame,
    path: &FlowPath,
    count_name: &str,
    min_count: usize,
) -> Result<EdgeList> {
    let cols = path.columns();
    let mut list = if path.is_chained() {
        chained_edges(dataframe, &cols[0], &cols[1], &cols[2], count_name)?
    } else {
        pairwise_edges(dataframe, &cols[0], &cols[1], count_name)?
    };
    list.edges.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });
    let before = list.edges.len();
    list.edges.retain(|e| e.weight >= min_count);
    tracing::debug!(
        path = ?cols,
        kept = list.edges.len(),
        dropped = before - list.edges.len(),
        min_count,
        "extracted local network"
    );
    Ok(list)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handler::common::DataType;
    use crate::error::FlowDiagramError;
    use proptest::prelude::*;

    fn frame(columns: &[(&str, Vec<&str>)]) -> DataFrame {
        let mut df = DataFrame::empty("test");
        for (name, values) in columns {
            let values: Vec<Option<String>> =
                values.iter().map(|v| Some(v.to_string())).collect();
            df.add_column(
                name.to_string(),
                Column::from_strings(&values, DataType::String).unwrap(),
            )
            .unwrap();
        }
        df
    }

    fn artists() -> DataFrame {
        let mut nationality = vec!["American"; 25];
        nationality.extend(vec!["French"; 5]);
        let mut decade = vec!["1990"; 25];
        decade.extend(vec!["1980"; 5]);
        frame(&[("Nationality", nationality), ("Decade", decade)])
    }

    #[test]
    fn pairwise_weights_sum_to_row_count() {
        let df = artists();
        let list = pairwise_edges(&df, "Nationality", "Decade", "Value").unwrap();
        assert_eq!(list.total_weight(), df.row_count());
    }

    #[test]
    fn pairwise_keeps_original_column_labels() {
        let df = artists();
        let list = pairwise_edges(&df, "Nationality", "Decade", "Value").unwrap();
        assert_eq!(list.source_label(), "Nationality");
        assert_eq!(list.target_label(), "Decade");
        assert_eq!(list.value_label(), "Value");
    }

    #[test]
    fn threshold_drops_rare_combinations() {
        let df = artists();
        let path = FlowPath::new(["Nationality", "Decade"]).unwrap();
        let list = extract_local_network(&df, &path, "Value", 20).unwrap();
        assert_eq!(
            list.edges(),
            &[Edge {
                source: "American".to_string(),
                target: "1990".to_string(),
                weight: 25,
            }]
        );
    }

    #[test]
    fn empty_result_after_filtering_is_not_an_error() {
        let df = artists();
        let path = FlowPath::new(["Nationality", "Decade"]).unwrap();
        let list = extract_local_network(&df, &path, "Value", 1000).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn chained_path_relabels_roles_and_covers_both_hops() {
        // 30 rows so both hops clear the default threshold.
        let nationality = vec!["American"; 30];
        let gender = vec!["male"; 30];
        let decade = vec!["1990"; 30];
        let df = frame(&[
            ("Nationality", nationality),
            ("Gender", gender),
            ("Decade", decade),
        ]);
        let path = FlowPath::new(["Nationality", "Gender", "Decade"]).unwrap();
        let list = extract_local_network(&df, &path, "Value", DEFAULT_MIN_COUNT).unwrap();
        assert_eq!(list.source_label(), SOURCE_ROLE);
        assert_eq!(list.target_label(), TARGET_ROLE);
        let sources: Vec<&str> = list.edges().iter().map(|e| e.source.as_str()).collect();
        assert!(sources.contains(&"American"));
        assert!(sources.contains(&"male"));
        let targets: Vec<&str> = list.edges().iter().map(|e| e.target.as_str()).collect();
        assert!(targets.contains(&"male"));
        assert!(targets.contains(&"1990"));
    }

    #[test]
    fn each_hop_independently_accounts_for_all_rows() {
        let df = frame(&[
            ("Nationality", vec!["American", "American", "French", "Japanese"]),
            ("Gender", vec!["male", "female", "male", "male"]),
            ("Decade", vec!["1990", "1990", "1980", "1990"]),
        ]);
        let list = chained_edges(&df, "Nationality", "Gender", "Decade", "Value").unwrap();
        assert_eq!(list.total_weight(), 2 * df.row_count());
        let nationalities = ["American", "French", "Japanese"];
        let first_hop: usize = list
            .edges()
            .iter()
            .filter(|e| nationalities.contains(&e.source.as_str()))
            .map(|e| e.weight)
            .sum();
        let second_hop: usize = list
            .edges()
            .iter()
            .filter(|e| !nationalities.contains(&e.source.as_str()))
            .map(|e| e.weight)
            .sum();
        assert_eq!(first_hop, df.row_count());
        assert_eq!(second_hop, df.row_count());
    }

    #[test]
    fn output_is_sorted_by_weight_with_lexicographic_tie_break() {
        let df = frame(&[
            (
                "Nationality",
                vec!["French", "French", "American", "American", "Danish"],
            ),
            ("Decade", vec!["1980", "1980", "1990", "1990", "1970"]),
        ]);
        let path = FlowPath::new(["Nationality", "Decade"]).unwrap();
        let list = extract_local_network(&df, &path, "Value", 1).unwrap();
        let rendered: Vec<(String, usize)> = list
            .edges()
            .iter()
            .map(|e| (e.source.clone(), e.weight))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("American".to_string(), 2),
                ("French".to_string(), 2),
                ("Danish".to_string(), 1),
            ]
        );
    }

    #[test]
    fn identical_inputs_produce_identical_output() {
        let df = artists();
        let path = FlowPath::new(["Nationality", "Decade"]).unwrap();
        let first = extract_local_network(&df, &path, "Value", 2).unwrap();
        let second = extract_local_network(&df, &path, "Value", 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn path_arity_outside_two_or_three_is_rejected() {
        for columns in [vec!["Nationality"], vec!["A", "B", "C", "D"], Vec::new()] {
            let arity = columns.len();
            match FlowPath::new(columns) {
                Err(FlowDiagramError::Flow(FlowError::InvalidPathArity { arity: got })) => {
                    assert_eq!(got, arity);
                }
                other => panic!("expected arity error for {arity} columns, got {other:?}"),
            }
        }
    }

    #[test]
    fn duplicate_path_columns_are_rejected() {
        assert!(matches!(
            FlowPath::new(["Gender", "Gender"]),
            Err(FlowDiagramError::Flow(FlowError::DuplicatePathColumn { .. }))
        ));
    }

    #[test]
    fn unknown_column_surfaces_column_not_found() {
        let df = artists();
        let path = FlowPath::new(["Nationality", "Medium"]).unwrap();
        let result = extract_local_network(&df, &path, "Value", 1);
        assert!(matches!(
            result,
            Err(FlowDiagramError::Data(
                crate::data_handler::DataHandlerError::ColumnNotFound(_)
            ))
        ));
    }

    #[test]
    fn into_dataframe_uses_carried_labels() {
        let df = artists();
        let path = FlowPath::new(["Nationality", "Decade"]).unwrap();
        let list = extract_local_network(&df, &path, "Value", 1).unwrap();
        let table = list.into_dataframe("nationality_decade").unwrap();
        assert_eq!(
            table.column_names(),
            &[
                "Nationality".to_string(),
                "Decade".to_string(),
                "Value".to_string()
            ]
        );
        assert_eq!(table.get_column("Value").unwrap().to_i64(0), Some(25));
    }

    fn labelled_frame(rows: &[(u8, u8)]) -> DataFrame {
        let nationality: Vec<&str> = rows
            .iter()
            .map(|(n, _)| ["American", "French", "Japanese", "Danish"][*n as usize % 4])
            .collect();
        let decade: Vec<&str> = rows
            .iter()
            .map(|(_, d)| ["1960", "1970", "1980", "1990"][*d as usize % 4])
            .collect();
        frame(&[("Nationality", nationality), ("Decade", decade)])
    }

    proptest! {
        #[test]
        fn every_row_is_counted_in_exactly_one_edge(
            rows in proptest::collection::vec((0u8..4, 0u8..4), 1..200)
        ) {
            let df = labelled_frame(&rows);
            let list = pairwise_edges(&df, "Nationality", "Decade", "Value").unwrap();
            prop_assert_eq!(list.total_weight(), rows.len());
        }

        #[test]
        fn filtered_output_is_sorted_and_above_threshold(
            rows in proptest::collection::vec((0u8..4, 0u8..4), 1..200),
            min_count in 1usize..10,
        ) {
            let df = labelled_frame(&rows);
            let path = FlowPath::new(["Nationality", "Decade"]).unwrap();
            let list = extract_local_network(&df, &path, "Value", min_count).unwrap();
            for pair in list.edges().windows(2) {
                prop_assert!(pair[0].weight >= pair[1].weight);
            }
            for edge in list.edges() {
                prop_assert!(edge.weight >= min_count);
            }
        }
    }
}
