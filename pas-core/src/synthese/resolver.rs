//! Cross-reference resolver: walks the web of loosely-linked records from a
//! root audit or projet and assembles the closure the aggregator and the PAS
//! builder consume. Missing cross-references degrade to empty sets; only an
//! absent root is fatal.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, warn};

use crate::model::{Constat, PlanAction, Recommandation};
use crate::store::{EntityDirectory, StoreResult};

use super::models::{AuditClosure, DonneesAudit, ProjetClosure, Synthese};
use super::stats;
use super::{SyntheseError, SyntheseResult};

pub struct Resolver {
    annuaire: Arc<dyn EntityDirectory>,
}

impl Resolver {
    pub fn new(annuaire: Arc<dyn EntityDirectory>) -> Self {
        Self { annuaire }
    }

    pub fn annuaire(&self) -> &Arc<dyn EntityDirectory> {
        &self.annuaire
    }

    /// Resolves the full closure of one audit. The project fan-out (SWOT,
    /// risques, conceptions) is issued concurrently and joined per class.
    pub async fn resolve_audit(&self, audit_id: &str) -> SyntheseResult<AuditClosure> {
        let audit = self
            .annuaire
            .find_audit(audit_id)
            .await?
            .ok_or_else(|| SyntheseError::AuditNotFound {
                id: audit_id.to_string(),
            })?;

        let constats = self.annuaire.find_constats_by_audit(audit_id).await?;
        let constat_ids: Vec<String> = constats.iter().map(|c| c.id.clone()).collect();
        let recommandations = if constat_ids.is_empty() {
            Vec::new()
        } else {
            self.annuaire
                .find_recommandations_by_constats(&constat_ids)
                .await?
        };
        let plan_actions = self.resoudre_plans_action(&recommandations).await?;

        let projet_ids = ids_projets_references(&constats);
        let projets = if projet_ids.is_empty() {
            Vec::new()
        } else {
            self.annuaire.find_projets_by_ids(&projet_ids).await?
        };
        let resolus: Vec<String> = projets.iter().map(|p| p.id.clone()).collect();
        for manquant in projet_ids
            .iter()
            .filter(|id| !resolus.contains(*id))
        {
            // The owning constat stays in the set; only the link is dropped.
            warn!(
                target: "pas.synthese",
                audit = %audit_id,
                projet = %manquant,
                "référence de projet non résolue, ignorée"
            );
        }

        let (swots, risques, conceptions) = tokio::join!(
            self.annuaire.find_swots_by_projets(&resolus),
            self.annuaire.find_risques_by_projets(&resolus),
            self.annuaire.find_conceptions_by_projets(&resolus),
        );
        let swot_by_projet = grouper(vide_si_indisponible("swot", swots), |s| s.projet.clone());
        let risques_by_projet =
            grouper(vide_si_indisponible("risques", risques), |r| r.projet.clone());
        let conceptions_by_projet = grouper(
            vide_si_indisponible("conceptions", conceptions),
            |c| c.projet.clone(),
        );

        let preuves =
            vide_si_indisponible("preuves", self.annuaire.find_preuves_by_audit(audit_id).await);

        info!(
            target: "pas.synthese",
            audit = %audit_id,
            constats = constats.len(),
            recommandations = recommandations.len(),
            plan_actions = plan_actions.len(),
            projets = projets.len(),
            "clôture d'audit résolue"
        );

        Ok(AuditClosure {
            audit,
            donnees: DonneesAudit {
                constats,
                recommandations,
                plan_actions,
                preuves,
                projets,
                swot_by_projet,
                risques_by_projet,
                conceptions_by_projet,
            },
        })
    }

    /// Union of the forward refs (recommandation -> plans d'action) and the
    /// reverse refs (plan d'action -> recommandations), de-duplicated by id.
    /// A plan reachable through both directions is kept exactly once.
    async fn resoudre_plans_action(
        &self,
        recommandations: &[Recommandation],
    ) -> StoreResult<Vec<PlanAction>> {
        let avant: Vec<String> = dedupe(
            recommandations
                .iter()
                .flat_map(|r| r.plans_action.iter().cloned()),
        );
        let reco_ids: Vec<String> = recommandations.iter().map(|r| r.id.clone()).collect();
        if avant.is_empty() && reco_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (directs, inverses) = tokio::join!(
            self.annuaire.find_plan_actions_by_ids(&avant),
            self.annuaire.find_plan_actions_referencing(&reco_ids),
        );

        let mut vus = HashSet::new();
        let mut fusion = Vec::new();
        for plan in directs?.into_iter().chain(inverses?) {
            if vus.insert(plan.id.clone()) {
                fusion.push(plan);
            }
        }
        Ok(fusion)
    }

    /// Resolves the closure of one projet, the input of a PAS generation.
    pub async fn resolve_projet(&self, projet_id: &str) -> SyntheseResult<ProjetClosure> {
        let projet = self
            .annuaire
            .find_projet(projet_id)
            .await?
            .ok_or_else(|| SyntheseError::ProjetNotFound {
                id: projet_id.to_string(),
            })?;

        let constats = self.annuaire.find_constats_by_projet(projet_id).await?;
        let ids = vec![projet_id.to_string()];
        let (swots, risques, conceptions, securite, pas) = tokio::join!(
            self.annuaire.find_swots_by_projets(&ids),
            self.annuaire.find_risques_by_projets(&ids),
            self.annuaire.find_conceptions_by_projets(&ids),
            self.annuaire.find_securite_by_projet(projet_id),
            self.annuaire.find_pas_by_projet(projet_id),
        );

        Ok(ProjetClosure {
            projet,
            constats,
            swots: vide_si_indisponible("swot", swots),
            risques: vide_si_indisponible("risques", risques),
            conceptions: vide_si_indisponible("conceptions", conceptions),
            securite: match securite {
                Ok(valeur) => valeur,
                Err(err) => {
                    warn!(
                        target: "pas.synthese",
                        projet = %projet_id,
                        error = %err,
                        "configuration sécurité indisponible, traitée comme absente"
                    );
                    None
                }
            },
            pas: vide_si_indisponible("pas", pas),
        })
    }

    /// Synthesis entry point: the audit closure plus its statistics.
    pub async fn synthese_audit(&self, audit_id: &str) -> SyntheseResult<Synthese> {
        let cloture = self.resolve_audit(audit_id).await?;
        let stats = stats::agreger(
            &cloture.donnees.constats,
            &cloture.donnees.recommandations,
            &cloture.donnees.plan_actions,
            &cloture.donnees.preuves,
        );
        Ok(Synthese {
            audit: cloture.audit,
            data: cloture.donnees,
            stats,
        })
    }

    /// Chart-ready merged breakdowns for one projet.
    pub async fn stats_projet(&self, projet_id: &str) -> SyntheseResult<stats::StatsProjet> {
        let cloture = self.resolve_projet(projet_id).await?;
        let constat_ids: Vec<String> = cloture.constats.iter().map(|c| c.id.clone()).collect();
        let recommandations = if constat_ids.is_empty() {
            Vec::new()
        } else {
            self.annuaire
                .find_recommandations_by_constats(&constat_ids)
                .await?
        };
        Ok(stats::stats_projet(
            &cloture.constats,
            &recommandations,
            &cloture.conceptions,
            &cloture.risques,
        ))
    }
}

/// Distinct projet ids referenced by the constats, in first-seen order.
fn ids_projets_references(constats: &[Constat]) -> Vec<String> {
    dedupe(
        constats
            .iter()
            .filter_map(|c| c.projet.as_ref())
            .map(|reference| reference.id().to_string()),
    )
}

fn dedupe<I: IntoIterator<Item = String>>(ids: I) -> Vec<String> {
    let mut vus = HashSet::new();
    ids.into_iter().filter(|id| vus.insert(id.clone())).collect()
}

fn grouper<T, F>(valeurs: Vec<T>, cle: F) -> HashMap<String, Vec<T>>
where
    F: Fn(&T) -> String,
{
    let mut groupes: HashMap<String, Vec<T>> = HashMap::new();
    for valeur in valeurs {
        groupes.entry(cle(&valeur)).or_default().push(valeur);
    }
    groupes
}

fn vide_si_indisponible<T>(classe: &str, resultat: StoreResult<Vec<T>>) -> Vec<T> {
    match resultat {
        Ok(liste) => liste,
        Err(err) => {
            warn!(
                target: "pas.synthese",
                classe,
                error = %err,
                "classe d'entités dégradée en liste vide"
            );
            Vec::new()
        }
    }
}
