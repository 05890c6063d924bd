use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::model::{
    Audit, Conception, Constat, Norme, PlanAction, Preuve, Projet, Recommandation, Risque,
    SecuriteProjet, Swot,
};
use crate::pas::PasDocument;

use super::{EntityDirectory, StoreResult};

/// Ordered two-tier (or more) read strategy: the first source is
/// authoritative, the following ones are offline/cache fallbacks consulted
/// only when the preceding sources return nothing linked to the parent.
/// Results are never merged across sources, which would double count.
/// A failing fallback degrades to the previous (empty) result with a
/// diagnostic; a failing primary is surfaced to the caller.
pub struct TieredDirectory {
    sources: Vec<Arc<dyn EntityDirectory>>,
}

impl TieredDirectory {
    pub fn new(primary: Arc<dyn EntityDirectory>) -> Self {
        Self {
            sources: vec![primary],
        }
    }

    pub fn with_fallback(mut self, source: Arc<dyn EntityDirectory>) -> Self {
        self.sources.push(source);
        self
    }

    fn primary(&self) -> &dyn EntityDirectory {
        self.sources[0].as_ref()
    }
}

macro_rules! premiere_liste {
    ($self:ident, $methode:ident ( $($arg:expr),* )) => {{
        let mut resultat = Vec::new();
        for (rang, source) in $self.sources.iter().enumerate() {
            match source.$methode($($arg),*).await {
                Ok(liste) if !liste.is_empty() => return Ok(liste),
                Ok(liste) => resultat = liste,
                Err(err) if rang == 0 => return Err(err),
                Err(err) => {
                    warn!(
                        target: "pas.store",
                        source = rang,
                        methode = stringify!($methode),
                        error = %err,
                        "source secondaire indisponible, résultat précédent conservé"
                    );
                }
            }
        }
        Ok(resultat)
    }};
}

macro_rules! premier_trouve {
    ($self:ident, $methode:ident ( $($arg:expr),* )) => {{
        for (rang, source) in $self.sources.iter().enumerate() {
            match source.$methode($($arg),*).await {
                Ok(Some(valeur)) => return Ok(Some(valeur)),
                Ok(None) => {}
                Err(err) if rang == 0 => return Err(err),
                Err(err) => {
                    warn!(
                        target: "pas.store",
                        source = rang,
                        methode = stringify!($methode),
                        error = %err,
                        "source secondaire indisponible"
                    );
                }
            }
        }
        Ok(None)
    }};
}

#[async_trait]
impl EntityDirectory for TieredDirectory {
    async fn find_audit(&self, audit_id: &str) -> StoreResult<Option<Audit>> {
        premier_trouve!(self, find_audit(audit_id))
    }

    async fn find_projet(&self, projet_id: &str) -> StoreResult<Option<Projet>> {
        premier_trouve!(self, find_projet(projet_id))
    }

    async fn find_constats_by_audit(&self, audit_id: &str) -> StoreResult<Vec<Constat>> {
        premiere_liste!(self, find_constats_by_audit(audit_id))
    }

    async fn find_constats_by_projet(&self, projet_id: &str) -> StoreResult<Vec<Constat>> {
        premiere_liste!(self, find_constats_by_projet(projet_id))
    }

    async fn find_recommandations_by_constats(
        &self,
        constat_ids: &[String],
    ) -> StoreResult<Vec<Recommandation>> {
        premiere_liste!(self, find_recommandations_by_constats(constat_ids))
    }

    async fn find_plan_actions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<PlanAction>> {
        premiere_liste!(self, find_plan_actions_by_ids(ids))
    }

    async fn find_plan_actions_referencing(
        &self,
        recommandation_ids: &[String],
    ) -> StoreResult<Vec<PlanAction>> {
        premiere_liste!(self, find_plan_actions_referencing(recommandation_ids))
    }

    async fn find_projets_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Projet>> {
        premiere_liste!(self, find_projets_by_ids(ids))
    }

    async fn find_swots_by_projets(&self, projet_ids: &[String]) -> StoreResult<Vec<Swot>> {
        premiere_liste!(self, find_swots_by_projets(projet_ids))
    }

    async fn find_risques_by_projets(&self, projet_ids: &[String]) -> StoreResult<Vec<Risque>> {
        premiere_liste!(self, find_risques_by_projets(projet_ids))
    }

    async fn find_conceptions_by_projets(
        &self,
        projet_ids: &[String],
    ) -> StoreResult<Vec<Conception>> {
        premiere_liste!(self, find_conceptions_by_projets(projet_ids))
    }

    async fn find_securite_by_projet(
        &self,
        projet_id: &str,
    ) -> StoreResult<Option<SecuriteProjet>> {
        premier_trouve!(self, find_securite_by_projet(projet_id))
    }

    async fn find_preuves_by_audit(&self, audit_id: &str) -> StoreResult<Vec<Preuve>> {
        premiere_liste!(self, find_preuves_by_audit(audit_id))
    }

    async fn find_normes_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Norme>> {
        premiere_liste!(self, find_normes_by_ids(ids))
    }

    async fn find_pas_by_projet(&self, projet_id: &str) -> StoreResult<Vec<PasDocument>> {
        premiere_liste!(self, find_pas_by_projet(projet_id))
    }

    /// The single write always lands on the authoritative source.
    async fn create_pas(&self, document: &PasDocument) -> StoreResult<()> {
        self.primary().create_pas(document).await
    }
}
