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

use anyhow::{Context, Result};
use clap::Parser;
use skein::{export_csv, load_json, FlowDiagramSystem, FlowPath, RenderConfig};
use std::path::PathBuf;
use tracing::info;

mod prep;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "artist-flows-demo",
    about = "Sankey flow diagrams over the MoMA artists dataset"
)]
struct Cli {
    /// JSON array of artist records
    #[arg(long, default_value = "data/Artists.json")]
    dataset: PathBuf,

    /// Directory the diagrams are written to
    #[arg(long, default_value = "diagrams")]
    out_dir: PathBuf,

    /// Smallest combination count kept in a diagram
    #[arg(long, default_value_t = skein::DEFAULT_MIN_COUNT)]
    min_count: usize,

    /// Optional YAML style configuration for the renderer
    #[arg(long)]
    render_config: Option<PathBuf>,

    /// Also export each edge list as CSV next to its diagram
    #[arg(long)]
    export_csv: bool,
}

const COUNT_NAME: &str = "Value";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let cli = Cli::parse();

    let raw = load_json(&cli.dataset, "artists".to_string())
        .with_context(|| format!("loading dataset {}", cli.dataset.display()))?;
    info!(
        rows = raw.row_count(),
        columns = raw.column_count(),
        "loaded artists dataset"
    );
    for col in raw.column_metadata() {
        info!(
            column = %col.name,
            data_type = ?col.data_type,
            nulls = col.null_count,
            "schema"
        );
    }

    let artists = prep::prepare_artists(&raw).context("preparing artists dataset")?;
    info!(
        rows = artists.row_count(),
        dropped = raw.row_count() - artists.row_count(),
        "prepared dataset"
    );
    artists.print_sample(5);

    let config = match &cli.render_config {
        Some(path) => RenderConfig::from_yaml_file(path)
            .with_context(|| format!("loading render configuration {}", path.display()))?,
        None => RenderConfig::default(),
    };
    let system = FlowDiagramSystem::with_config(config).with_min_count(cli.min_count);
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    let analyses: [(&str, &str, Vec<&str>); 4] = [
        (
            "nationality_decade",
            "Nationality by Decade",
            vec![prep::NATIONALITY, prep::DECADE],
        ),
        (
            "nationality_gender",
            "Nationality by Gender",
            vec![prep::NATIONALITY, prep::GENDER],
        ),
        (
            "gender_decade",
            "Gender by Decade",
            vec![prep::GENDER, prep::DECADE],
        ),
        (
            "nationality_gender_decade",
            "Nationality by Gender by Decade",
            vec![prep::NATIONALITY, prep::GENDER, prep::DECADE],
        ),
    ];

    for (stem, title, columns) in analyses {
        let path = FlowPath::new(columns)?;
        let diagram = cli.out_dir.join(format!("{stem}.html"));
        let edges = system
            .render_flow(&artists, &path, COUNT_NAME, title, &diagram)
            .with_context(|| format!("rendering {title}"))?;
        info!(diagram = %diagram.display(), edges = edges.len(), "rendered analysis");
        if cli.export_csv {
            let table = edges.into_dataframe(stem)?;
            let csv_path = cli.out_dir.join(format!("{stem}.csv"));
            export_csv(&table, &csv_path)
                .with_context(|| format!("exporting {}", csv_path.display()))?;
        }
    }
    Ok(())
}
