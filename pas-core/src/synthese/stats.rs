//! Single-pass breakdowns over the resolved entity sets. Counts always sum
//! to the input length per dimension: unrecognized labels land in the
//! `autre` buckets instead of being dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::labels::{Criticite, Decision, Priorite, StatutAction, StatutRecommandation, TypeConstat};
use crate::model::{Conception, Constat, PlanAction, Preuve, Recommandation, Risque};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSynthese {
    pub constats: StatsConstats,
    pub recommandations: StatsRecommandations,
    pub plan_actions: StatsPlanActions,
    pub preuves: StatsPreuves,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsConstats {
    pub total: usize,
    pub nc_maj: usize,
    pub nc_min: usize,
    pub observation: usize,
    pub point_fort: usize,
    pub type_autre: usize,
    pub critique: usize,
    pub elevee: usize,
    pub moyenne: usize,
    pub faible: usize,
    pub criticite_autre: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecommandations {
    pub total: usize,
    pub en_attente: usize,
    pub validees: usize,
    pub a_reviser: usize,
    pub statut_autre: usize,
    pub haute: usize,
    pub moyenne: usize,
    pub basse: usize,
    pub priorite_autre: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsPlanActions {
    pub total: usize,
    pub en_cours: usize,
    pub termines: usize,
    pub en_attente: usize,
    pub statut_autre: usize,
    pub haute: usize,
    pub moyenne: usize,
    pub basse: usize,
    pub priorite_autre: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsPreuves {
    pub total: usize,
}

/// Chart-ready per-projet breakdown merging two label families: remediation
/// statuses (recommandations + conceptions) and criticality (constats +
/// niveaux de risque), each as one normalized-label -> count map, plus the
/// risk treatment decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsProjet {
    pub statut_actions: BTreeMap<String, usize>,
    pub criticites: BTreeMap<String, usize>,
    pub decisions: BTreeMap<String, usize>,
}

pub fn agreger(
    constats: &[Constat],
    recommandations: &[Recommandation],
    plan_actions: &[PlanAction],
    preuves: &[Preuve],
) -> StatsSynthese {
    StatsSynthese {
        constats: agreger_constats(constats),
        recommandations: agreger_recommandations(recommandations),
        plan_actions: agreger_plan_actions(plan_actions),
        preuves: StatsPreuves {
            total: preuves.len(),
        },
    }
}

pub fn agreger_constats(constats: &[Constat]) -> StatsConstats {
    let mut stats = StatsConstats {
        total: constats.len(),
        ..StatsConstats::default()
    };
    for constat in constats {
        match TypeConstat::normalise(&constat.type_constat) {
            TypeConstat::NcMajeure => stats.nc_maj += 1,
            TypeConstat::NcMineure => stats.nc_min += 1,
            TypeConstat::Observation => stats.observation += 1,
            TypeConstat::PointFort => stats.point_fort += 1,
            TypeConstat::Autre => stats.type_autre += 1,
        }
        match Criticite::normalise(&constat.criticite) {
            Criticite::Critique => stats.critique += 1,
            Criticite::Elevee => stats.elevee += 1,
            Criticite::Moyenne => stats.moyenne += 1,
            Criticite::Faible => stats.faible += 1,
            Criticite::Autre => stats.criticite_autre += 1,
        }
    }
    stats
}

pub fn agreger_recommandations(recommandations: &[Recommandation]) -> StatsRecommandations {
    let mut stats = StatsRecommandations {
        total: recommandations.len(),
        ..StatsRecommandations::default()
    };
    for recommandation in recommandations {
        match StatutRecommandation::normalise(&recommandation.statut) {
            StatutRecommandation::EnAttente => stats.en_attente += 1,
            StatutRecommandation::Validee => stats.validees += 1,
            StatutRecommandation::AReviser => stats.a_reviser += 1,
            StatutRecommandation::Autre => stats.statut_autre += 1,
        }
        match Priorite::normalise(&recommandation.priorite) {
            Priorite::Haute => stats.haute += 1,
            Priorite::Moyenne => stats.moyenne += 1,
            Priorite::Basse => stats.basse += 1,
            Priorite::Autre => stats.priorite_autre += 1,
        }
    }
    stats
}

pub fn agreger_plan_actions(plan_actions: &[PlanAction]) -> StatsPlanActions {
    let mut stats = StatsPlanActions {
        total: plan_actions.len(),
        ..StatsPlanActions::default()
    };
    for plan in plan_actions {
        match StatutAction::normalise(&plan.statut) {
            StatutAction::EnCours => stats.en_cours += 1,
            StatutAction::Termine => stats.termines += 1,
            StatutAction::EnAttente => stats.en_attente += 1,
            StatutAction::Autre => stats.statut_autre += 1,
        }
        match Priorite::normalise(&plan.priorite) {
            Priorite::Haute => stats.haute += 1,
            Priorite::Moyenne => stats.moyenne += 1,
            Priorite::Basse => stats.basse += 1,
            Priorite::Autre => stats.priorite_autre += 1,
        }
    }
    stats
}

pub fn stats_projet(
    constats: &[Constat],
    recommandations: &[Recommandation],
    conceptions: &[Conception],
    risques: &[Risque],
) -> StatsProjet {
    let mut statut_actions = BTreeMap::new();
    for recommandation in recommandations {
        *statut_actions
            .entry(
                StatutRecommandation::normalise(&recommandation.statut)
                    .as_str()
                    .to_string(),
            )
            .or_insert(0) += 1;
    }
    for conception in conceptions {
        *statut_actions
            .entry(
                StatutAction::normalise(&conception.statut_validation)
                    .as_str()
                    .to_string(),
            )
            .or_insert(0) += 1;
    }

    let mut criticites = BTreeMap::new();
    for constat in constats {
        *criticites
            .entry(Criticite::normalise(&constat.criticite).as_str().to_string())
            .or_insert(0) += 1;
    }
    for risque in risques {
        *criticites
            .entry(
                Criticite::normalise(&risque.niveau_risque)
                    .as_str()
                    .to_string(),
            )
            .or_insert(0) += 1;
    }

    let mut decisions = BTreeMap::new();
    for risque in risques {
        *decisions
            .entry(Decision::normalise(&risque.decision).as_str().to_string())
            .or_insert(0) += 1;
    }

    StatsProjet {
        statut_actions,
        criticites,
        decisions,
    }
}

/// `total == 0` never divides; it yields 0.
pub fn pourcentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constat(id: &str, type_constat: &str, criticite: &str) -> Constat {
        Constat {
            id: id.into(),
            audit: "a1".into(),
            projet: None,
            type_constat: type_constat.into(),
            criticite: criticite.into(),
            impact: None,
            probabilite: None,
            description: String::new(),
            recommandations: vec![],
        }
    }

    #[test]
    fn scenario_trois_constats() {
        let constats = vec![
            constat("c1", "NC maj", "Critique"),
            constat("c2", "NC maj", "Critique"),
            constat("c3", "PS", "Faible"),
        ];
        let stats = agreger_constats(&constats);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.nc_maj, 2);
        assert_eq!(stats.observation, 1);
        assert_eq!(stats.critique, 2);
        assert_eq!(stats.faible, 1);
    }

    #[test]
    fn les_comptes_somment_au_total() {
        let constats = vec![
            constat("c1", "NC min", "élevée"),
            constat("c2", "inconnu", "??"),
            constat("c3", "Point Fort", "Moyenne"),
            constat("c4", "Observation", ""),
        ];
        let stats = agreger_constats(&constats);
        let par_type =
            stats.nc_maj + stats.nc_min + stats.observation + stats.point_fort + stats.type_autre;
        let par_criticite =
            stats.critique + stats.elevee + stats.moyenne + stats.faible + stats.criticite_autre;
        assert_eq!(par_type, stats.total);
        assert_eq!(par_criticite, stats.total);
    }

    #[test]
    fn pourcentage_sans_division_par_zero() {
        assert_eq!(pourcentage(0, 0), 0);
        assert_eq!(pourcentage(5, 5), 100);
        assert_eq!(pourcentage(1, 3), 33);
        assert_eq!(pourcentage(2, 3), 67);
    }

    #[test]
    fn familles_fusionnees_par_projet() {
        let recommandations = vec![Recommandation {
            id: "r1".into(),
            constat: "c1".into(),
            description: String::new(),
            statut: "Validée".into(),
            priorite: "Haute".into(),
            plans_action: vec![],
        }];
        let conceptions = vec![Conception {
            id: "d1".into(),
            projet: "p1".into(),
            fichier: None,
            statut_validation: "terminé".into(),
        }];
        let risques = vec![Risque {
            id: "rq1".into(),
            projet: "p1".into(),
            description: "fuite".into(),
            type_risque: "technique".into(),
            priorite: "haute".into(),
            niveau_risque: "Élevée".into(),
            impact: None,
            probabilite: None,
            decision: "réduire".into(),
        }];
        let constats = vec![constat("c1", "NC maj", "elevee")];

        let stats = stats_projet(&constats, &recommandations, &conceptions, &risques);
        assert_eq!(stats.statut_actions.get("validee"), Some(&1));
        assert_eq!(stats.statut_actions.get("termine"), Some(&1));
        assert_eq!(stats.criticites.get("elevee"), Some(&2));
        assert_eq!(stats.decisions.get("reduire"), Some(&1));
    }
}
