//! Entity model consumed by the synthesis and PAS engines. Records are owned
//! by external CRUD collaborators; this crate only reads and assembles them.
//! Label fields (statut, criticité, priorité, décision) stay free text here
//! and are canonicalized through [`crate::labels`] at aggregation time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cross-entity reference stored either as a bare id or as an embedded
/// summary object, depending on which collaborator wrote the record. Callers
/// go through [`Reference::id`] so nothing downstream branches on shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reference {
    Resume(ProjetResume),
    Id(String),
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Resume(resume) => &resume.id,
            Reference::Id(id) => id,
        }
    }

    pub fn resume(&self) -> Option<&ProjetResume> {
        match self {
            Reference::Resume(resume) => Some(resume),
            Reference::Id(_) => None,
        }
    }
}

/// Summary fields fetchers embed on a reference to avoid a second round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjetResume {
    pub id: String,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub perimetre: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
}

/// A field authored sometimes as a scalar, sometimes as a list. Coerced to
/// `Vec<String>` via [`Valeurs::en_liste`], dropping blank entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Valeurs {
    Plusieurs(Vec<String>),
    Une(String),
}

impl Valeurs {
    pub fn en_liste(&self) -> Vec<String> {
        let brutes: Vec<&str> = match self {
            Valeurs::Une(valeur) => vec![valeur.as_str()],
            Valeurs::Plusieurs(valeurs) => valeurs.iter().map(String::as_str).collect(),
        };
        brutes
            .into_iter()
            .map(str::trim)
            .filter(|valeur| !valeur.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Valeurs {
    fn default() -> Self {
        Valeurs::Plusieurs(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: String,
    pub nom: String,
    /// "organisationnel" or "technique".
    pub type_audit: String,
    #[serde(default)]
    pub perimetre: Option<String>,
    #[serde(default)]
    pub objectifs: Vec<String>,
    #[serde(default)]
    pub date_debut: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_fin: Option<DateTime<Utc>>,
    #[serde(default)]
    pub statut: String,
    /// Ids of the referenced normes.
    #[serde(default)]
    pub normes: Vec<String>,
    #[serde(default)]
    pub entreprise: Option<String>,
    #[serde(default)]
    pub effectif_interne: Option<String>,
    #[serde(default)]
    pub effectif_externe: Option<String>,
    #[serde(default)]
    pub reglementations: Vec<String>,
    #[serde(default)]
    pub frequence_reunions: Option<String>,
    #[serde(default)]
    pub frequence_audits_internes: Option<String>,
    #[serde(default)]
    pub indicateurs: Vec<String>,
    #[serde(default)]
    pub supports_sensibilisation: Vec<String>,
    #[serde(default)]
    pub registre_incidents: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Constat {
    pub id: String,
    pub audit: String,
    /// Optional remediation projet; tolerated even when it no longer resolves.
    #[serde(default)]
    pub projet: Option<Reference>,
    pub type_constat: String,
    #[serde(default)]
    pub criticite: String,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub probabilite: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommandations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommandation {
    pub id: String,
    pub constat: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub statut: String,
    #[serde(default)]
    pub priorite: String,
    /// Forward refs to plans d'action; the reverse direction lives on the
    /// plan d'action itself.
    #[serde(default)]
    pub plans_action: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanAction {
    pub id: String,
    #[serde(default)]
    pub intitule: Option<String>,
    #[serde(default)]
    pub audit: Option<String>,
    #[serde(default)]
    pub projet: Option<String>,
    #[serde(default)]
    pub recommandations: Vec<String>,
    #[serde(default)]
    pub statut: String,
    #[serde(default)]
    pub priorite: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FichierRef {
    pub nom: String,
    #[serde(default)]
    pub chemin: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preuve {
    pub id: String,
    pub audit: String,
    pub fichier: FichierRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Projet {
    pub id: String,
    pub nom: String,
    /// Derived from the constats at creation time.
    #[serde(default)]
    pub audit: Option<String>,
    /// Required, non-empty at creation; the resolver still tolerates gaps.
    #[serde(default)]
    pub constats: Vec<String>,
    #[serde(default)]
    pub perimetre: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub priorite: String,
    #[serde(default)]
    pub statut: String,
    #[serde(default)]
    pub valide_par: Option<String>,
    #[serde(default)]
    pub creer_par: Option<String>,
    #[serde(default)]
    pub contacts_urgence: Vec<ContactUrgence>,
}

impl Projet {
    pub fn resume(&self) -> ProjetResume {
        ProjetResume {
            id: self.id.clone(),
            nom: Some(self.nom.clone()),
            perimetre: self.perimetre.clone(),
            statut: Some(self.statut.clone()),
            budget: self.budget,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactUrgence {
    pub nom: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Swot {
    pub id: String,
    pub projet: String,
    #[serde(default)]
    pub forces: Valeurs,
    #[serde(default)]
    pub faiblesses: Valeurs,
    #[serde(default)]
    pub opportunites: Valeurs,
    #[serde(default)]
    pub menaces: Valeurs,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Risque {
    pub id: String,
    pub projet: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub type_risque: String,
    #[serde(default)]
    pub priorite: String,
    #[serde(default)]
    pub niveau_risque: String,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub probabilite: Option<String>,
    /// accepter | reduire | transferer | eviter (free text, normalized later).
    #[serde(default)]
    pub decision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conception {
    pub id: String,
    pub projet: String,
    #[serde(default)]
    pub fichier: Option<FichierRef>,
    #[serde(default)]
    pub statut_validation: String,
}

/// Structured security measures and continuity plan of a projet. At most one
/// per projet; absence is a valid, expected state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecuriteProjet {
    pub id: String,
    pub projet: String,
    #[serde(default)]
    pub mesures: Mesures,
    #[serde(default)]
    pub pca_pra: Option<PcaPraConfig>,
    #[serde(default)]
    pub roles: Vec<RoleSecurite>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mesures {
    #[serde(default)]
    pub physique: BTreeMap<String, String>,
    #[serde(default)]
    pub logique: BTreeMap<String, String>,
    #[serde(default)]
    pub organisationnelle: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PcaPraConfig {
    #[serde(default)]
    pub sauvegarde: Option<SauvegardeConfig>,
    #[serde(default)]
    pub site_secours: Option<SiteSecoursConfig>,
    #[serde(default)]
    pub exercices: Option<ExercicesConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SauvegardeConfig {
    #[serde(default)]
    pub frequence: Option<String>,
    #[serde(default)]
    pub type_sauvegarde: Option<String>,
    #[serde(default)]
    pub emplacement: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteSecoursConfig {
    #[serde(default)]
    pub type_site: Option<String>,
    #[serde(default)]
    pub localisation: Option<String>,
    #[serde(default)]
    pub rto: Option<String>,
    #[serde(default)]
    pub rpo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExercicesConfig {
    #[serde(default)]
    pub frequence: Option<String>,
    #[serde(default)]
    pub dernier_exercice: Option<String>,
    #[serde(default)]
    pub resultat: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleSecurite {
    pub role: String,
    #[serde(default)]
    pub responsabilite: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Norme {
    pub id: String,
    pub nom: String,
    #[serde(default)]
    pub version: String,
}
