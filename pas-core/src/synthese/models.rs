use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    Audit, Conception, Constat, PlanAction, Preuve, Projet, Recommandation, Risque,
    SecuriteProjet, Swot,
};
use crate::pas::PasDocument;

use super::stats::StatsSynthese;

/// Transitive closure of the records reachable from one audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditClosure {
    pub audit: Audit,
    pub donnees: DonneesAudit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonneesAudit {
    pub constats: Vec<Constat>,
    pub recommandations: Vec<Recommandation>,
    pub plan_actions: Vec<PlanAction>,
    pub preuves: Vec<Preuve>,
    pub projets: Vec<Projet>,
    pub swot_by_projet: HashMap<String, Vec<Swot>>,
    pub risques_by_projet: HashMap<String, Vec<Risque>>,
    pub conceptions_by_projet: HashMap<String, Vec<Conception>>,
}

/// The aggregated statistical summary served to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Synthese {
    pub audit: Audit,
    pub data: DonneesAudit,
    pub stats: StatsSynthese,
}

/// Closure of the records attached to one projet, the input of a PAS
/// generation. `securite: None` is a valid, expected state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjetClosure {
    pub projet: Projet,
    pub constats: Vec<Constat>,
    pub swots: Vec<Swot>,
    pub risques: Vec<Risque>,
    pub conceptions: Vec<Conception>,
    pub securite: Option<SecuriteProjet>,
    pub pas: Vec<PasDocument>,
}
