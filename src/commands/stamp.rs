use std::path::PathBuf;

use crate::Config;
use crate::store::ContentId;

/// Run the watermark pipeline on a local file and print where the results went.
pub async fn handle_stamp_command(
    config: Config,
    source: PathBuf,
    content_id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    if !source.exists() {
        eprintln!("Error: Source image not found: {:?}", source);
        std::process::exit(1);
    }

    let content_id = ContentId::new(content_id)?;
    tokio::fs::create_dir_all(&config.storage.directory).await?;

    let pipeline = crate::build_pipeline(&config)?;
    let bytes = tokio::fs::read(&source).await?;
    let rendered = pipeline.render(&content_id, &bytes).await?;

    println!("=== Stamped {} ===", content_id);
    for artifact in [&rendered.source, &rendered.composite, &rendered.preview] {
        println!(
            "{:<10} {}  {:?}",
            artifact.kind.to_string(),
            artifact.dimensions,
            artifact.path
        );
    }

    println!();
    for message in pipeline.reply_messages(&rendered) {
        println!("{}", serde_json::to_string_pretty(&message)?);
    }

    Ok(())
}
