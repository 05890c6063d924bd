use std::sync::Arc;

use pas_core::model::{
    Audit, Conception, Constat, PlanAction, Projet, Recommandation, Reference, Risque, Swot,
    Valeurs,
};
use pas_core::{EntityDirectory, Resolver, SqliteEntityStore, SyntheseError};

fn setup_store() -> SqliteEntityStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entites.sqlite");
    // Preserve directory on disk for the duration of the test runs.
    #[allow(deprecated)]
    let _persist = dir.into_path();
    let store = SqliteEntityStore::builder()
        .path(&path)
        .create_if_missing(true)
        .build()
        .unwrap();
    store.initialize().unwrap();
    store
}

fn audit_minimal(id: &str) -> Audit {
    Audit {
        id: id.into(),
        nom: format!("Audit {id}"),
        type_audit: "organisationnel".into(),
        perimetre: None,
        objectifs: vec![],
        date_debut: None,
        date_fin: None,
        statut: "en cours".into(),
        normes: vec![],
        entreprise: None,
        effectif_interne: None,
        effectif_externe: None,
        reglementations: vec![],
        frequence_reunions: None,
        frequence_audits_internes: None,
        indicateurs: vec![],
        supports_sensibilisation: vec![],
        registre_incidents: None,
    }
}

fn constat(id: &str, audit: &str, type_constat: &str, criticite: &str) -> Constat {
    Constat {
        id: id.into(),
        audit: audit.into(),
        projet: None,
        type_constat: type_constat.into(),
        criticite: criticite.into(),
        impact: None,
        probabilite: None,
        description: format!("constat {id}"),
        recommandations: vec![],
    }
}

fn projet_minimal(id: &str, audit: &str) -> Projet {
    Projet {
        id: id.into(),
        nom: format!("Projet {id}"),
        audit: Some(audit.into()),
        constats: vec![],
        perimetre: None,
        budget: None,
        priorite: "Haute".into(),
        statut: "en cours".into(),
        valide_par: None,
        creer_par: None,
        contacts_urgence: vec![],
    }
}

fn recommandation(id: &str, constat: &str, plans: &[&str]) -> Recommandation {
    Recommandation {
        id: id.into(),
        constat: constat.into(),
        description: format!("recommandation {id}"),
        statut: "En attente".into(),
        priorite: "Haute".into(),
        plans_action: plans.iter().map(|p| p.to_string()).collect(),
    }
}

fn plan(id: &str, recommandations: &[&str]) -> PlanAction {
    PlanAction {
        id: id.into(),
        intitule: Some(format!("Plan {id}")),
        audit: None,
        projet: None,
        recommandations: recommandations.iter().map(|r| r.to_string()).collect(),
        statut: "en cours".into(),
        priorite: "Moyenne".into(),
    }
}

#[tokio::test]
async fn synthese_complete_d_un_audit() {
    let store = setup_store();
    store.upsert_audit(&audit_minimal("a1")).unwrap();
    store.upsert_projet(&projet_minimal("p1", "a1")).unwrap();

    let mut c1 = constat("c1", "a1", "NC maj", "Critique");
    c1.projet = Some(Reference::Id("p1".into()));
    c1.recommandations = vec!["r1".into()];
    store.upsert_constat(&c1).unwrap();
    store
        .upsert_constat(&constat("c2", "a1", "NC maj", "Critique"))
        .unwrap();
    store
        .upsert_constat(&constat("c3", "a1", "PS", "Faible"))
        .unwrap();

    store
        .upsert_recommandation(&recommandation("r1", "c1", &["pa1"]))
        .unwrap();
    // pa1 only reachable forward, pa2 only through its own reverse list.
    store.upsert_plan_action(&plan("pa1", &[])).unwrap();
    store.upsert_plan_action(&plan("pa2", &["r1"])).unwrap();

    store
        .upsert_swot(&Swot {
            id: "s1".into(),
            projet: "p1".into(),
            forces: Valeurs::default(),
            faiblesses: Valeurs::default(),
            opportunites: Valeurs::default(),
            menaces: Valeurs::Une("phishing".into()),
        })
        .unwrap();

    let resolver = Resolver::new(Arc::new(store));
    let synthese = resolver.synthese_audit("a1").await.unwrap();

    assert_eq!(synthese.stats.constats.total, 3);
    assert_eq!(synthese.stats.constats.nc_maj, 2);
    assert_eq!(synthese.stats.constats.observation, 1);
    assert_eq!(synthese.stats.constats.critique, 2);
    assert_eq!(synthese.stats.constats.faible, 1);
    assert_eq!(synthese.stats.recommandations.total, 1);
    assert_eq!(synthese.stats.recommandations.en_attente, 1);

    let mut ids: Vec<&str> = synthese
        .data
        .plan_actions
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["pa1", "pa2"]);

    assert_eq!(synthese.data.projets.len(), 1);
    assert_eq!(
        synthese.data.swot_by_projet.get("p1").map(Vec::len),
        Some(1)
    );
    // The fetcher re-embeds the projet summary on the bare id reference.
    let embarque = synthese
        .data
        .constats
        .iter()
        .find(|c| c.id == "c1")
        .and_then(|c| c.projet.as_ref())
        .and_then(Reference::resume)
        .and_then(|resume| resume.nom.clone());
    assert_eq!(embarque.as_deref(), Some("Projet p1"));
}

#[tokio::test]
async fn plan_accessible_dans_les_deux_sens_compte_une_fois() {
    let store = setup_store();
    store.upsert_audit(&audit_minimal("a1")).unwrap();
    store
        .upsert_constat(&constat("c1", "a1", "NC min", "Moyenne"))
        .unwrap();
    store
        .upsert_recommandation(&recommandation("r1", "c1", &["pa1"]))
        .unwrap();
    store.upsert_plan_action(&plan("pa1", &["r1"])).unwrap();

    let resolver = Resolver::new(Arc::new(store));
    let cloture = resolver.resolve_audit("a1").await.unwrap();
    assert_eq!(cloture.donnees.plan_actions.len(), 1);
    assert_eq!(cloture.donnees.plan_actions[0].id, "pa1");
}

#[tokio::test]
async fn plan_d_action_fantome_ignore() {
    let store = setup_store();
    store.upsert_audit(&audit_minimal("a1")).unwrap();
    store
        .upsert_constat(&constat("c1", "a1", "NC min", "Moyenne"))
        .unwrap();
    store
        .upsert_recommandation(&recommandation("r1", "c1", &["pa-fantome"]))
        .unwrap();

    let resolver = Resolver::new(Arc::new(store));
    let cloture = resolver.resolve_audit("a1").await.unwrap();

    // The recommandation survives; its unresolvable forward ref yields no plan.
    assert_eq!(cloture.donnees.recommandations.len(), 1);
    assert_eq!(cloture.donnees.recommandations[0].id, "r1");
    assert!(cloture.donnees.plan_actions.is_empty());
}

#[tokio::test]
async fn reference_de_projet_non_resolue_toleree() {
    let store = setup_store();
    store.upsert_audit(&audit_minimal("a1")).unwrap();
    let mut orphelin = constat("c1", "a1", "NC maj", "Critique");
    orphelin.projet = Some(Reference::Id("p-fantome".into()));
    store.upsert_constat(&orphelin).unwrap();

    let resolver = Resolver::new(Arc::new(store));
    let cloture = resolver.resolve_audit("a1").await.unwrap();

    // The constat stays in the closure, only the projet link is dropped.
    assert_eq!(cloture.donnees.constats.len(), 1);
    assert!(cloture.donnees.projets.is_empty());
    assert!(cloture.donnees.swot_by_projet.is_empty());
}

#[tokio::test]
async fn audit_racine_absent_fatal() {
    let store = setup_store();
    let resolver = Resolver::new(Arc::new(store));
    let erreur = resolver.resolve_audit("a-inconnu").await.unwrap_err();
    assert!(matches!(erreur, SyntheseError::AuditNotFound { id } if id == "a-inconnu"));
}

#[tokio::test]
async fn stats_projet_fusionne_les_familles() {
    let store = setup_store();
    store.upsert_projet(&projet_minimal("p1", "a1")).unwrap();
    let mut c1 = constat("c1", "a1", "NC maj", "élevée");
    c1.projet = Some(Reference::Id("p1".into()));
    store.upsert_constat(&c1).unwrap();
    store
        .upsert_recommandation(&recommandation("r1", "c1", &[]))
        .unwrap();
    store
        .upsert_conception(&Conception {
            id: "d1".into(),
            projet: "p1".into(),
            fichier: None,
            statut_validation: "terminé".into(),
        })
        .unwrap();
    store
        .upsert_risque(&Risque {
            id: "rq1".into(),
            projet: "p1".into(),
            description: "fuite de données".into(),
            type_risque: "technique".into(),
            priorite: "haute".into(),
            niveau_risque: "Élevée".into(),
            impact: None,
            probabilite: None,
            decision: "réduire".into(),
        })
        .unwrap();

    let resolver = Resolver::new(Arc::new(store));
    let stats = resolver.stats_projet("p1").await.unwrap();
    assert_eq!(stats.statut_actions.get("en-attente"), Some(&1));
    assert_eq!(stats.statut_actions.get("termine"), Some(&1));
    assert_eq!(stats.criticites.get("elevee"), Some(&2));
    assert_eq!(stats.decisions.get("reduire"), Some(&1));
}

#[tokio::test]
async fn projet_racine_absent_fatal() {
    let store = setup_store();
    let resolver = Resolver::new(Arc::new(store));
    let erreur = resolver.resolve_projet("p-inconnu").await.unwrap_err();
    assert!(matches!(erreur, SyntheseError::ProjetNotFound { id } if id == "p-inconnu"));
}

#[tokio::test]
async fn pas_existants_charges_dans_la_cloture_projet() {
    let store = setup_store();
    store.upsert_projet(&projet_minimal("p1", "a1")).unwrap();

    let resolver = Resolver::new(Arc::new(store));
    let cloture = resolver.resolve_projet("p1").await.unwrap();
    assert!(cloture.pas.is_empty());
    assert!(cloture.securite.is_none());
    let _ = resolver.annuaire().find_projet("p1").await.unwrap().unwrap();
}
