use crate::OutputFormat;
use anyhow::{Context, Result};
use legends_ingest::{
    config::Config,
    ingest::{CancelFlag, ChunkDriver, FileSource, IngestError, ProgressDisplay},
    types::{LegendsDataset, RecordCounts, RecordId},
    util::truncate_str,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Number of slayers listed in the summary
const TOP_SLAYERS: usize = 10;

#[derive(Debug, Serialize)]
struct SlayerSummary {
    hfid: RecordId,
    name: String,
    race: String,
    kills: usize,
}

#[derive(Debug, Serialize)]
struct WorldSummary {
    source: String,
    world_name: String,
    current_year: Option<i32>,
    elapsed_seconds: f64,
    counts: RecordCounts,
    top_slayers: Vec<SlayerSummary>,
    artifact_status: BTreeMap<String, usize>,
}

fn summarize(dataset: &LegendsDataset, source: String, elapsed_seconds: f64) -> WorldSummary {
    let mut slayers: Vec<SlayerSummary> = dataset
        .historical_figures
        .iter()
        .filter(|f| !f.kills.is_empty())
        .map(|f| SlayerSummary {
            hfid: f.id,
            name: f.name.clone(),
            race: f.race.clone(),
            kills: f.kills.len(),
        })
        .collect();
    slayers.sort_by(|a, b| b.kills.cmp(&a.kills).then(a.hfid.cmp(&b.hfid)));
    slayers.truncate(TOP_SLAYERS);

    let mut artifact_status = BTreeMap::new();
    for artifact in &dataset.artifacts {
        *artifact_status
            .entry(artifact.current_status.as_str().to_string())
            .or_insert(0) += 1;
    }

    WorldSummary {
        source,
        world_name: dataset.world_name.clone(),
        current_year: dataset.current_year,
        elapsed_seconds,
        counts: dataset.counts(),
        top_slayers: slayers,
        artifact_status,
    }
}

fn print_text(summary: &WorldSummary) {
    let world = if summary.world_name.is_empty() {
        "(unnamed world)"
    } else {
        summary.world_name.as_str()
    };
    let c = &summary.counts;

    println!("\nWorld Summary");
    println!("=============");
    println!("World:               {}", world);
    match summary.current_year {
        Some(year) => println!("Current year:        {}", year),
        None => println!("Current year:        unknown"),
    }
    println!("Regions:             {}", c.regions);
    println!("Underground regions: {}", c.underground_regions);
    println!("Sites:               {}", c.sites);
    println!("Historical figures:  {}", c.historical_figures);
    println!("Entities:            {}", c.entities);
    println!("Artifacts:           {}", c.artifacts);
    println!("Written contents:    {}", c.written_contents);
    println!("Historical events:   {}", c.historical_events);
    println!("Event collections:   {}", c.event_collections);
    println!("Elapsed time:        {:.1}s", summary.elapsed_seconds);

    if !summary.top_slayers.is_empty() {
        println!("\nTop slayers");
        println!("-----------");
        for (rank, slayer) in summary.top_slayers.iter().enumerate() {
            println!(
                "{:>2}. {:<32} {:<12} {} kills",
                rank + 1,
                truncate_str(&slayer.name, 32),
                truncate_str(&slayer.race, 12),
                slayer.kills
            );
        }
    }

    if !summary.artifact_status.is_empty() {
        println!("\nArtifacts by status");
        println!("-------------------");
        for (status, count) in &summary.artifact_status {
            println!("{:<10} {}", status, count);
        }
    }
}

pub async fn parse_export(
    config: Config,
    path: PathBuf,
    chunk_size: Option<usize>,
    quiet: bool,
    format: OutputFormat,
) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Export file not found: {}", path.display());
    }

    let mut ingest_config = config.ingest.clone();
    if let Some(size) = chunk_size {
        ingest_config = ingest_config.with_chunk_size(size);
    }

    let source = FileSource::open(&path, ingest_config.chunk_size)
        .with_context(|| format!("Failed to open export: {}", path.display()))?;
    info!("Parsing {} (compressed: {})", path.display(), source.is_compressed());

    let cancel = CancelFlag::new();
    let signal_flag = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current chunk");
            signal_flag.cancel();
        }
    });

    // JSON output goes to stdout; keep the bar out of it
    let display = ProgressDisplay::new(quiet || format == OutputFormat::Json);
    let bar = display.clone();
    let result = ChunkDriver::new(ingest_config)
        .with_cancel_flag(cancel)
        .with_progress(move |p| bar.update(p))
        .run(source)
        .await;
    signal_task.abort();

    let dataset = match result {
        Ok(dataset) => dataset,
        Err(IngestError::Cancelled) => {
            display.cancel();
            anyhow::bail!("Parse cancelled");
        }
        Err(e) => {
            display.cancel();
            return Err(e).with_context(|| format!("Failed to parse {}", path.display()));
        }
    };
    display.finish(&dataset.counts());

    let summary = summarize(
        &dataset,
        path.display().to_string(),
        display.elapsed_seconds(),
    );
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_text(&summary),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_ranks_slayers_and_groups_artifacts() {
        let doc = b"<df_world><name>Summary World</name>\
            <historical_figures>\
            <historical_figure><id>1</id><name>urist</name><race>DWARF</race></historical_figure>\
            <historical_figure><id>2</id><name>bomrek</name></historical_figure>\
            <historical_figure><id>3</id><name>ast</name></historical_figure>\
            </historical_figures>\
            <artifacts><artifact><id>0</id></artifact><artifact><id>1</id><holder_hfid>1</holder_hfid></artifact></artifacts>\
            <historical_events>\
            <historical_event><id>0</id><year>5</year><type>hf died</type><hfid>2</hfid><slayer_hfid>1</slayer_hfid></historical_event>\
            <historical_event><id>1</id><year>6</year><type>hf died</type><hfid>3</hfid><slayer_hfid>1</slayer_hfid></historical_event>\
            <historical_event><id>2</id><year>7</year><type>artifact destroyed</type><artifact_id>1</artifact_id></historical_event>\
            </historical_events></df_world>";
        let dataset = legends_ingest::parse_document(doc);
        let summary = summarize(&dataset, "test".into(), 0.0);

        assert_eq!(summary.world_name, "Summary World");
        assert_eq!(summary.current_year, Some(7));
        assert_eq!(summary.top_slayers.len(), 1);
        assert_eq!(summary.top_slayers[0].hfid, 1);
        assert_eq!(summary.top_slayers[0].kills, 2);
        assert_eq!(summary.artifact_status.get("held"), Some(&1));
        assert_eq!(summary.artifact_status.get("destroyed"), Some(&1));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["counts"]["historical_figures"], 3);
    }
}
