use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting timetable extraction...");

        // Extract
        let page = self.pipeline.extract().await?;
        tracing::debug!("Extracted page {}", page.url);

        // Transform
        let result = self.pipeline.transform(page).await?;
        tracing::debug!("Transformed into {} records", result.records.len());

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
