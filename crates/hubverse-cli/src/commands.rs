use std::fs;

use anyhow::{Context, Result};
use comfy_table::Table;

use hubverse_cli::pipeline::{ConvertConfig, InputSource, NhsnConfig, run_conversion, run_nhsn};
use hubverse_cli::types::{ConversionResult, NhsnResult};
use hubverse_ingest::InputPaths;
use hubverse_model::{DatasetKind, DatasetProfile, PreprocessOptions};
use hubverse_output::WriteOptions;
use hubverse_validate::InvalidDocumentPolicy;

use crate::cli::{ConvertArgs, DatasetArg, InvalidPolicyArg, NhsnArgs};
use crate::summary::{apply_table_style, header_cell};

pub fn run_profiles() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Label"),
        header_cell("File suffix"),
        header_cell("Ground truth target"),
        header_cell("Date column"),
        header_cell("Min GT date"),
        header_cell("Metro"),
        header_cell("Output dir"),
    ]);
    apply_table_style(&mut table);
    for kind in DatasetKind::ALL {
        let profile = kind.profile();
        table.add_row(vec![
            kind.as_str().to_string(),
            profile.dataset_label,
            profile.file_suffix,
            profile.ground_truth_value_key.unwrap_or_else(|| "-".to_string()),
            profile.ground_truth_date_column,
            profile
                .ground_truth_min_date
                .map_or_else(|| "-".to_string(), |date| date.to_string()),
            if profile.is_metro { "yes" } else { "no" }.to_string(),
            profile.output_dir,
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_convert(args: &ConvertArgs) -> Result<ConversionResult> {
    let config = convert_config(args)?;
    run_conversion(&config)
}

pub fn run_nhsn_command(args: &NhsnArgs) -> Result<NhsnResult> {
    run_nhsn(&NhsnConfig {
        data: args.data.clone(),
        locations: args.locations_data.clone(),
        column_metadata: args.column_metadata.clone(),
        output_dir: args.output_dir.clone(),
        dry_run: args.dry_run,
        write: WriteOptions {
            overwrite: !args.no_overwrite,
        },
    })
}

fn convert_config(args: &ConvertArgs) -> Result<ConvertConfig> {
    let profile = load_profile(args)?;
    let source = match (&args.hub_path, &args.forecast_data) {
        (Some(hub), _) => InputSource::Hub(hub.clone()),
        (None, Some(forecast)) => InputSource::Files(InputPaths {
            forecast: forecast.clone(),
            target: args
                .target_data
                .clone()
                .context("--target-data is required with --forecast-data")?,
            locations: args
                .locations_data
                .clone()
                .context("--locations-data is required with --forecast-data")?,
        }),
        (None, None) => anyhow::bail!("either --hub-path or --forecast-data is required"),
    };
    let preprocess = PreprocessOptions::new()
        .with_output_type_id_filter(!args.keep_all_output_type_ids)
        .with_nowcast_filter(!args.keep_nowcasts);
    Ok(ConvertConfig {
        profile,
        source,
        output_dir: args.output_dir.clone(),
        dry_run: args.dry_run,
        preprocess,
        write: WriteOptions {
            overwrite: !args.no_overwrite,
        },
        on_invalid: match args.on_invalid {
            InvalidPolicyArg::Save => InvalidDocumentPolicy::Save,
            InvalidPolicyArg::Skip => InvalidDocumentPolicy::Skip,
        },
    })
}

fn load_profile(args: &ConvertArgs) -> Result<DatasetProfile> {
    if let Some(path) = &args.profile_file {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read profile {}", path.display()))?;
        return DatasetProfile::from_toml(&contents)
            .with_context(|| format!("parse profile {}", path.display()));
    }
    let kind = match args.dataset {
        Some(DatasetArg::Flu) => DatasetKind::Flu,
        Some(DatasetArg::FluMetro) => DatasetKind::FluMetro,
        Some(DatasetArg::Rsv) => DatasetKind::Rsv,
        Some(DatasetArg::Covid) => DatasetKind::Covid,
        None => anyhow::bail!("either --dataset or --profile-file is required"),
    };
    Ok(kind.profile())
}
