//! Document pipeline

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use cfop_engine::{CfopCatalogue, CoherenceEngine};
use nfe_extractor::{extract, Extraction};
use tax_audit::{AuditEngine, OrderLine};

use crate::config::Config;
use crate::report::{coherence_request, DocumentReport, ReportSummary};
use crate::{Error, Result};

/// Runs documents through every stage
pub struct Pipeline {
    audit: AuditEngine,
    coherence: CoherenceEngine,
}

impl Pipeline {
    /// Build the engines from configuration
    ///
    /// Each pipeline loads its own CFOP catalogue; the built-in table is used
    /// when none is configured or the file cannot be read.
    pub fn new(config: &Config) -> Result<Self> {
        let coherence = CoherenceEngine::new(&config.adjudicator)?;
        let coherence = match &config.cfop_catalogue_path {
            Some(path) => {
                let catalogue = CfopCatalogue::load_or_builtin(Some(path.as_path()));
                info!("CFOP catalogue with {} codes", catalogue.len());
                coherence.with_catalogue(Arc::new(catalogue))
            }
            None => coherence,
        };

        Ok(Self::with_engines(AuditEngine::new(config.audit.clone()), coherence))
    }

    /// Assemble from ready engines
    pub fn with_engines(audit: AuditEngine, coherence: CoherenceEngine) -> Self {
        Self { audit, coherence }
    }

    /// Process one document
    ///
    /// Only extraction failures are errors; everything else lands in the report.
    pub async fn process(
        &self,
        label: &str,
        xml: &[u8],
        orders: Option<&[OrderLine]>,
    ) -> Result<DocumentReport> {
        let Extraction {
            document,
            validations,
        } = extract(label, xml)?;
        debug!("Extracted {}: {} items", label, document.items.len());

        let recomputation = self.audit.recompute(&document);
        let audit = self.audit.reconcile(&document, &recomputation, orders);
        let coherence = self.coherence.evaluate(&coherence_request(&document)).await;

        let summary = ReportSummary::of(&document, &validations, &audit, &coherence);
        info!(
            "Processed {}: {} audit findings, {} blocked items, {} failed validations",
            label, summary.audit_findings, summary.blocked_items, summary.failed_validations
        );

        Ok(DocumentReport {
            label: label.to_string(),
            generated_at: Utc::now(),
            summary,
            document,
            validations,
            recomputation,
            audit,
            coherence,
        })
    }

    /// Read and process one file, labelled by its path
    pub async fn process_file(
        &self,
        path: impl AsRef<Path>,
        orders: Option<&[OrderLine]>,
    ) -> Result<DocumentReport> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let xml = tokio::fs::read(path).await.map_err(|source| Error::Read {
            path: label.clone(),
            source,
        })?;
        self.process(&label, &xml, orders).await
    }
}
