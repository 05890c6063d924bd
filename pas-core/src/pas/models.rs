//! The Plan d'Assurance Sécurité artifact: nine fixed sections plus the SWOT
//! and risk detail appendices kept for the audit trail. Every section holds
//! real, sourced data or an explicitly empty value; the builder never
//! fabricates placeholder content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::RoleSecurite;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PasDocument {
    pub id: String,
    /// Id of the projet the document covers.
    pub projet: String,
    pub version: u32,
    pub creer_par: Option<String>,
    pub date_creation: DateTime<Utc>,
    /// Templated one-liner referencing the projet name; the only generated
    /// text in the document.
    pub objet: String,
    pub champ_application: ChampApplication,
    pub references: ReferencesSection,
    pub organisation_securite: OrganisationSecurite,
    pub analyse_risques: AnalyseRisques,
    pub mesures_securite: MesuresSecuriteSection,
    pub pca_pra: PcaPraSection,
    pub suivi_audit: SuiviAudit,
    pub annexes: Annexes,
    pub swot_analyses: Vec<SwotDetail>,
    pub risques: Vec<RisqueDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChampApplication {
    pub infrastructure: String,
    pub systemes: String,
    pub personnel: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferencesSection {
    /// "{nom} {version}" per linked norme.
    pub normes: Vec<String>,
    pub politiques: Vec<String>,
    /// Copied verbatim from the audit.
    pub reglementations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationSecurite {
    pub responsable: String,
    pub roles: Vec<RoleSecurite>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyseRisques {
    pub menaces: Vec<String>,
    pub evaluation_impacts: Vec<String>,
    pub mesures_prevention: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MesuresSecuriteSection {
    pub physique: Vec<String>,
    pub logique: Vec<String>,
    pub organisationnelle: Vec<String>,
}

/// Continuity/recovery subsections. Absent source data yields empty-string
/// leaves with the structure preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PcaPraSection {
    pub sauvegarde: SauvegardeSection,
    pub site_secours: SiteSecoursSection,
    pub exercices: ExercicesSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SauvegardeSection {
    pub frequence: String,
    pub type_sauvegarde: String,
    pub emplacement: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteSecoursSection {
    pub type_site: String,
    pub localisation: String,
    pub rto: String,
    pub rpo: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExercicesSection {
    pub frequence: String,
    pub dernier_exercice: String,
    pub resultat: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuiviAudit {
    pub reunions: String,
    pub audits_internes: String,
    pub indicateurs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annexes {
    pub supports_sensibilisation: Vec<String>,
    pub registre_incidents: String,
    /// "{nom} ({role}): {telephone} - {email}".
    pub contacts_urgence: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwotDetail {
    pub forces: Vec<String>,
    pub faiblesses: Vec<String>,
    pub opportunites: Vec<String>,
    pub menaces: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RisqueDetail {
    pub description: String,
    pub type_risque: String,
    pub priorite: String,
    pub niveau_risque: String,
    pub decision: String,
    pub impacts: Vec<String>,
    pub probabilites: Vec<String>,
}
