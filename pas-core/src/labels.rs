//! Canonicalization of the free-text enumeration values (statuts, criticités,
//! priorités, décisions) entered by auditors with inconsistent case and
//! accents ("Élevée", "elevee", "élevé"). Every function here is total: an
//! unrecognized label maps to the `Autre` bucket, never to an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower-cases, trims, folds French accents and collapses inner whitespace so
/// "NC  Majeure" and "nc majeure" share one lookup key.
pub fn cle_normalisee(label: &str) -> String {
    let mut cle = String::with_capacity(label.len());
    let mut dernier_espace = true;
    for c in label.trim().chars() {
        let c = plier_accent(c);
        if c.is_whitespace() {
            if !dernier_espace {
                cle.push(' ');
                dernier_espace = true;
            }
            continue;
        }
        dernier_espace = false;
        for minuscule in c.to_lowercase() {
            cle.push(minuscule);
        }
    }
    cle
}

fn plier_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'À' | 'Â' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'î' | 'ï' | 'Î' | 'Ï' => 'i',
        'ô' | 'ö' | 'Ô' | 'Ö' => 'o',
        'ù' | 'û' | 'ü' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        autre => autre,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TypeConstat {
    NcMajeure,
    NcMineure,
    Observation,
    PointFort,
    Autre,
}

impl TypeConstat {
    pub fn normalise(label: &str) -> Self {
        match cle_normalisee(label).as_str() {
            "nc maj" | "nc majeure" | "non conformite majeure" | "non-conformite majeure" => {
                TypeConstat::NcMajeure
            }
            "nc min" | "nc mineure" | "non conformite mineure" | "non-conformite mineure" => {
                TypeConstat::NcMineure
            }
            "ps" | "point sensible" | "observation" | "observation positive" | "remarque" => {
                TypeConstat::Observation
            }
            "pf" | "point fort" | "force" => TypeConstat::PointFort,
            _ => TypeConstat::Autre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeConstat::NcMajeure => "nc-majeure",
            TypeConstat::NcMineure => "nc-mineure",
            TypeConstat::Observation => "observation",
            TypeConstat::PointFort => "point-fort",
            TypeConstat::Autre => "autre",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Criticite {
    Critique,
    Elevee,
    Moyenne,
    Faible,
    Autre,
}

impl Criticite {
    pub fn normalise(label: &str) -> Self {
        match cle_normalisee(label).as_str() {
            "critique" => Criticite::Critique,
            "elevee" | "eleve" | "haute" | "haut" => Criticite::Elevee,
            "moyenne" | "moyen" | "moderee" | "modere" => Criticite::Moyenne,
            "faible" | "basse" | "bas" | "mineure" => Criticite::Faible,
            _ => Criticite::Autre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criticite::Critique => "critique",
            Criticite::Elevee => "elevee",
            Criticite::Moyenne => "moyenne",
            Criticite::Faible => "faible",
            Criticite::Autre => "autre",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StatutRecommandation {
    EnAttente,
    Validee,
    AReviser,
    Autre,
}

impl StatutRecommandation {
    pub fn normalise(label: &str) -> Self {
        match cle_normalisee(label).as_str() {
            "en attente" | "attente" => StatutRecommandation::EnAttente,
            "validee" | "valide" => StatutRecommandation::Validee,
            "a reviser" | "a revoir" | "revision" => StatutRecommandation::AReviser,
            _ => StatutRecommandation::Autre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatutRecommandation::EnAttente => "en-attente",
            StatutRecommandation::Validee => "validee",
            StatutRecommandation::AReviser => "a-reviser",
            StatutRecommandation::Autre => "autre",
        }
    }
}

/// Statuses of remediation work: plans d'action and conception validations
/// share this family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StatutAction {
    EnCours,
    Termine,
    EnAttente,
    Autre,
}

impl StatutAction {
    pub fn normalise(label: &str) -> Self {
        match cle_normalisee(label).as_str() {
            "en cours" | "demarre" => StatutAction::EnCours,
            "termine" | "terminee" | "fait" | "realise" | "cloture" | "valide" | "validee" => {
                StatutAction::Termine
            }
            "en attente" | "attente" | "planifie" | "planifiee" | "a faire" => {
                StatutAction::EnAttente
            }
            _ => StatutAction::Autre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatutAction::EnCours => "en-cours",
            StatutAction::Termine => "termine",
            StatutAction::EnAttente => "en-attente",
            StatutAction::Autre => "autre",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priorite {
    Haute,
    Moyenne,
    Basse,
    Autre,
}

impl Priorite {
    pub fn normalise(label: &str) -> Self {
        match cle_normalisee(label).as_str() {
            "haute" | "elevee" | "urgente" | "critique" => Priorite::Haute,
            "moyenne" | "normale" => Priorite::Moyenne,
            "basse" | "faible" => Priorite::Basse,
            _ => Priorite::Autre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priorite::Haute => "haute",
            Priorite::Moyenne => "moyenne",
            Priorite::Basse => "basse",
            Priorite::Autre => "autre",
        }
    }
}

/// Risk treatment decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Accepter,
    Reduire,
    Transferer,
    Eviter,
    Autre,
}

impl Decision {
    pub fn normalise(label: &str) -> Self {
        match cle_normalisee(label).as_str() {
            "accepter" | "accepte" | "acceptee" | "acceptation" => Decision::Accepter,
            "reduire" | "reduction" | "attenuer" => Decision::Reduire,
            "transferer" | "transfert" => Decision::Transferer,
            "eviter" | "evitement" => Decision::Eviter,
            _ => Decision::Autre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepter => "accepter",
            Decision::Reduire => "reduire",
            Decision::Transferer => "transferer",
            Decision::Eviter => "eviter",
            Decision::Autre => "autre",
        }
    }
}

macro_rules! impl_display {
    ($($famille:ident),+) => {
        $(
            impl fmt::Display for $famille {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

impl_display!(
    TypeConstat,
    Criticite,
    StatutRecommandation,
    StatutAction,
    Priorite,
    Decision
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variantes_accentuees_partagent_un_canon() {
        for variante in ["Élevée", "elevee", "élevé", "ELEVEE", "  Haute "] {
            assert_eq!(Criticite::normalise(variante), Criticite::Elevee);
        }
        for variante in ["Validée", "validee", "valide", "VALIDE"] {
            assert_eq!(
                StatutRecommandation::normalise(variante),
                StatutRecommandation::Validee
            );
        }
        for variante in ["Terminé", "terminee", "Réalisé", "clôturé"] {
            assert_eq!(StatutAction::normalise(variante), StatutAction::Termine);
        }
    }

    #[test]
    fn types_constat_courants() {
        assert_eq!(TypeConstat::normalise("NC maj"), TypeConstat::NcMajeure);
        assert_eq!(
            TypeConstat::normalise("Non-conformité majeure"),
            TypeConstat::NcMajeure
        );
        assert_eq!(TypeConstat::normalise("PS"), TypeConstat::Observation);
        assert_eq!(TypeConstat::normalise("Point Fort"), TypeConstat::PointFort);
    }

    #[test]
    fn inconnu_tombe_dans_autre() {
        assert_eq!(TypeConstat::normalise("???"), TypeConstat::Autre);
        assert_eq!(Criticite::normalise(""), Criticite::Autre);
        assert_eq!(Priorite::normalise("bizarre"), Priorite::Autre);
        assert_eq!(Decision::normalise("ignorer"), Decision::Autre);
    }

    #[test]
    fn cle_compacte_les_espaces() {
        assert_eq!(cle_normalisee("  NC   Majeure "), "nc majeure");
        assert_eq!(cle_normalisee("À  Réviser"), "a reviser");
    }
}
