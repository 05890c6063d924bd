//! Pure mapping from a resolved projet closure into the PAS document.
//! Policy: real data only. A section with no sourced data is emitted as an
//! explicitly empty value, never filled with generic best-practice text.

use chrono::Utc;
use uuid::Uuid;

use crate::config::GenerationSection;
use crate::model::{Audit, Norme, Projet, Risque, SecuriteProjet, Swot};

use super::models::{
    AnalyseRisques, Annexes, ChampApplication, ExercicesSection, MesuresSecuriteSection,
    OrganisationSecurite, PasDocument, PcaPraSection, ReferencesSection, RisqueDetail,
    SauvegardeSection, SiteSecoursSection, SuiviAudit, SwotDetail,
};

pub struct PasBuilder<'a> {
    projet: &'a Projet,
    generation: &'a GenerationSection,
    audit: Option<&'a Audit>,
    normes: &'a [Norme],
    swots: &'a [Swot],
    risques: &'a [Risque],
    securite: Option<&'a SecuriteProjet>,
}

impl<'a> PasBuilder<'a> {
    pub fn new(projet: &'a Projet, generation: &'a GenerationSection) -> Self {
        Self {
            projet,
            generation,
            audit: None,
            normes: &[],
            swots: &[],
            risques: &[],
            securite: None,
        }
    }

    pub fn with_audit(mut self, audit: Option<&'a Audit>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_normes(mut self, normes: &'a [Norme]) -> Self {
        self.normes = normes;
        self
    }

    pub fn with_swots(mut self, swots: &'a [Swot]) -> Self {
        self.swots = swots;
        self
    }

    pub fn with_risques(mut self, risques: &'a [Risque]) -> Self {
        self.risques = risques;
        self
    }

    pub fn with_securite(mut self, securite: Option<&'a SecuriteProjet>) -> Self {
        self.securite = securite;
        self
    }

    pub fn construire(&self, version: u32, creer_par: Option<String>) -> PasDocument {
        PasDocument {
            id: format!("pas-{}", Uuid::new_v4().simple()),
            projet: self.projet.id.clone(),
            version,
            creer_par,
            date_creation: Utc::now(),
            objet: format!(
                "Plan d'assurance sécurité du projet {}",
                self.projet.nom
            ),
            champ_application: self.champ_application(),
            references: self.references(),
            organisation_securite: self.organisation_securite(),
            analyse_risques: self.analyse_risques(),
            mesures_securite: self.mesures_securite(),
            pca_pra: self.pca_pra(),
            suivi_audit: self.suivi_audit(),
            annexes: self.annexes(),
            swot_analyses: self.swots.iter().map(detail_swot).collect(),
            risques: self.risques.iter().map(detail_risque).collect(),
        }
    }

    fn champ_application(&self) -> ChampApplication {
        ChampApplication {
            infrastructure: perimetre_reel(self.projet.perimetre.as_deref()),
            systemes: self
                .audit
                .and_then(|audit| audit.perimetre.clone())
                .unwrap_or_default(),
            personnel: self.personnel(),
        }
    }

    fn personnel(&self) -> String {
        let interne = self
            .audit
            .and_then(|audit| audit.effectif_interne.as_deref())
            .map(str::trim)
            .filter(|valeur| !valeur.is_empty());
        let externe = self
            .audit
            .and_then(|audit| audit.effectif_externe.as_deref())
            .map(str::trim)
            .filter(|valeur| !valeur.is_empty());
        match (interne, externe) {
            (Some(interne), Some(externe)) => format!(
                "{interne}{}{externe}",
                self.generation.personnel_separator
            ),
            (Some(seul), None) | (None, Some(seul)) => seul.to_string(),
            (None, None) => String::new(),
        }
    }

    fn references(&self) -> ReferencesSection {
        let politiques = match self.audit.and_then(|audit| audit.entreprise.as_deref()) {
            Some(entreprise) if !entreprise.trim().is_empty() => {
                vec![format!("Politique de sécurité de {}", entreprise.trim())]
            }
            _ => Vec::new(),
        };
        ReferencesSection {
            normes: self
                .normes
                .iter()
                .map(|norme| format!("{} {}", norme.nom, norme.version))
                .collect(),
            politiques,
            reglementations: self
                .audit
                .map(|audit| audit.reglementations.clone())
                .unwrap_or_default(),
        }
    }

    fn organisation_securite(&self) -> OrganisationSecurite {
        let responsable = self
            .projet
            .valide_par
            .as_deref()
            .or(self.projet.creer_par.as_deref())
            .map(str::trim)
            .filter(|nom| !nom.is_empty())
            .map(|nom| format!("{nom}{}", self.generation.responsable_suffix))
            .unwrap_or_default();
        OrganisationSecurite {
            responsable,
            roles: self
                .securite
                .map(|securite| securite.roles.clone())
                .unwrap_or_default(),
        }
    }

    fn analyse_risques(&self) -> AnalyseRisques {
        let mut menaces: Vec<String> = self
            .swots
            .iter()
            .flat_map(|swot| swot.menaces.en_liste())
            .collect();
        menaces.extend(
            self.risques
                .iter()
                .map(|risque| risque.description.trim().to_string())
                .filter(|description| !description.is_empty()),
        );
        AnalyseRisques {
            menaces,
            evaluation_impacts: self
                .risques
                .iter()
                .filter_map(|risque| risque.impact.as_deref())
                .map(str::trim)
                .filter(|impact| !impact.is_empty())
                .map(str::to_string)
                .collect(),
            mesures_prevention: self
                .swots
                .iter()
                .flat_map(|swot| swot.opportunites.en_liste())
                .collect(),
        }
    }

    fn mesures_securite(&self) -> MesuresSecuriteSection {
        let Some(securite) = self.securite else {
            return MesuresSecuriteSection::default();
        };
        MesuresSecuriteSection {
            physique: valeurs_renseignees(&securite.mesures.physique),
            logique: valeurs_renseignees(&securite.mesures.logique),
            organisationnelle: valeurs_renseignees(&securite.mesures.organisationnelle),
        }
    }

    fn pca_pra(&self) -> PcaPraSection {
        let Some(pca) = self.securite.and_then(|securite| securite.pca_pra.as_ref()) else {
            return PcaPraSection::default();
        };
        PcaPraSection {
            sauvegarde: pca
                .sauvegarde
                .as_ref()
                .map(|sauvegarde| SauvegardeSection {
                    frequence: sauvegarde.frequence.clone().unwrap_or_default(),
                    type_sauvegarde: sauvegarde.type_sauvegarde.clone().unwrap_or_default(),
                    emplacement: sauvegarde.emplacement.clone().unwrap_or_default(),
                })
                .unwrap_or_default(),
            site_secours: pca
                .site_secours
                .as_ref()
                .map(|site| SiteSecoursSection {
                    type_site: site.type_site.clone().unwrap_or_default(),
                    localisation: site.localisation.clone().unwrap_or_default(),
                    rto: site.rto.clone().unwrap_or_default(),
                    rpo: site.rpo.clone().unwrap_or_default(),
                })
                .unwrap_or_default(),
            exercices: pca
                .exercices
                .as_ref()
                .map(|exercices| ExercicesSection {
                    frequence: exercices.frequence.clone().unwrap_or_default(),
                    dernier_exercice: exercices.dernier_exercice.clone().unwrap_or_default(),
                    resultat: exercices.resultat.clone().unwrap_or_default(),
                })
                .unwrap_or_default(),
        }
    }

    fn suivi_audit(&self) -> SuiviAudit {
        let reunions = self
            .audit
            .and_then(|audit| audit.frequence_reunions.as_deref())
            .map(str::trim)
            .filter(|frequence| !frequence.is_empty())
            .map(|frequence| format!("Réunions de suivi {frequence}"))
            .unwrap_or_default();
        let audits_internes = self
            .audit
            .and_then(|audit| audit.frequence_audits_internes.as_deref())
            .map(str::trim)
            .filter(|frequence| !frequence.is_empty())
            .map(|frequence| format!("Audits internes {frequence}"))
            .unwrap_or_default();
        SuiviAudit {
            reunions,
            audits_internes,
            indicateurs: self
                .audit
                .map(|audit| audit.indicateurs.clone())
                .unwrap_or_default(),
        }
    }

    fn annexes(&self) -> Annexes {
        Annexes {
            supports_sensibilisation: self
                .audit
                .map(|audit| audit.supports_sensibilisation.clone())
                .unwrap_or_default(),
            registre_incidents: self
                .audit
                .and_then(|audit| audit.registre_incidents.clone())
                .unwrap_or_default(),
            contacts_urgence: self
                .projet
                .contacts_urgence
                .iter()
                .map(|contact| {
                    format!(
                        "{} ({}): {} - {}",
                        contact.nom, contact.role, contact.telephone, contact.email
                    )
                })
                .collect(),
        }
    }
}

/// Empty or wildcard perimeters carry no real scope.
fn perimetre_reel(perimetre: Option<&str>) -> String {
    match perimetre.map(str::trim) {
        Some("") | Some("*") | None => String::new(),
        Some(valeur) => valeur.to_string(),
    }
}

fn valeurs_renseignees(mesures: &std::collections::BTreeMap<String, String>) -> Vec<String> {
    mesures
        .values()
        .map(|valeur| valeur.trim())
        .filter(|valeur| !valeur.is_empty())
        .map(str::to_string)
        .collect()
}

fn detail_swot(swot: &Swot) -> SwotDetail {
    SwotDetail {
        forces: swot.forces.en_liste(),
        faiblesses: swot.faiblesses.en_liste(),
        opportunites: swot.opportunites.en_liste(),
        menaces: swot.menaces.en_liste(),
    }
}

fn detail_risque(risque: &Risque) -> RisqueDetail {
    RisqueDetail {
        description: risque.description.clone(),
        type_risque: risque.type_risque.clone(),
        priorite: risque.priorite.clone(),
        niveau_risque: risque.niveau_risque.clone(),
        decision: risque.decision.clone(),
        impacts: liste_depuis(risque.impact.as_deref()),
        probabilites: liste_depuis(risque.probabilite.as_deref()),
    }
}

fn liste_depuis(valeur: Option<&str>) -> Vec<String> {
    valeur
        .map(str::trim)
        .filter(|valeur| !valeur.is_empty())
        .map(|valeur| vec![valeur.to_string()])
        .unwrap_or_default()
}
