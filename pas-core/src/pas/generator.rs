use std::sync::Arc;

use tracing::{info, warn};

use crate::config::GenerationSection;
use crate::model::Audit;
use crate::store::EntityDirectory;
use crate::synthese::Resolver;

use super::builder::PasBuilder;
use super::models::PasDocument;
use super::PasResult;

/// Generates and persists a PAS for one projet. The projet is the root: its
/// absence is fatal, everything else (owning audit, normes, sécurité)
/// degrades to empty sections.
pub struct Generateur {
    resolver: Resolver,
    generation: GenerationSection,
}

impl Generateur {
    pub fn new(annuaire: Arc<dyn EntityDirectory>, generation: GenerationSection) -> Self {
        Self {
            resolver: Resolver::new(annuaire),
            generation,
        }
    }

    pub async fn generer_pas(
        &self,
        projet_id: &str,
        creer_par: Option<&str>,
    ) -> PasResult<PasDocument> {
        let cloture = self.resolver.resolve_projet(projet_id).await?;
        let audit = self.audit_du_projet(&cloture.projet).await;
        let normes = match &audit {
            Some(audit) if !audit.normes.is_empty() => {
                match self
                    .resolver
                    .annuaire()
                    .find_normes_by_ids(&audit.normes)
                    .await
                {
                    Ok(normes) => normes,
                    Err(err) => {
                        warn!(
                            target: "pas.generation",
                            projet = %projet_id,
                            error = %err,
                            "normes indisponibles, section références réduite"
                        );
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };

        let version = cloture.pas.len() as u32 + 1;
        let document = PasBuilder::new(&cloture.projet, &self.generation)
            .with_audit(audit.as_ref())
            .with_normes(&normes)
            .with_swots(&cloture.swots)
            .with_risques(&cloture.risques)
            .with_securite(cloture.securite.as_ref())
            .construire(version, creer_par.map(str::to_string));

        self.resolver.annuaire().create_pas(&document).await?;
        info!(
            target: "pas.generation",
            projet = %projet_id,
            pas = %document.id,
            version,
            "PAS généré et persisté"
        );
        Ok(document)
    }

    async fn audit_du_projet(&self, projet: &crate::model::Projet) -> Option<Audit> {
        let audit_id = projet.audit.as_deref()?;
        match self.resolver.annuaire().find_audit(audit_id).await {
            Ok(Some(audit)) => Some(audit),
            Ok(None) => {
                warn!(
                    target: "pas.generation",
                    projet = %projet.id,
                    audit = %audit_id,
                    "audit référencé introuvable, sections liées laissées vides"
                );
                None
            }
            Err(err) => {
                warn!(
                    target: "pas.generation",
                    projet = %projet.id,
                    audit = %audit_id,
                    error = %err,
                    "audit indisponible, sections liées laissées vides"
                );
                None
            }
        }
    }
}
