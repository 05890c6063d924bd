use std::sync::Arc;

use chrono::Utc;
use pas_core::model::{Audit, Constat};
use pas_core::pas::{
    AnalyseRisques, Annexes, ChampApplication, MesuresSecuriteSection, OrganisationSecurite,
    PasDocument, PcaPraSection, ReferencesSection, SuiviAudit,
};
use pas_core::{EntityDirectory, SqliteEntityStore, TieredDirectory};

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

fn store_defaillant() -> SqliteEntityStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.sqlite");
    #[allow(deprecated)]
    let _persist = dir.into_path();
    // Read-only on a path that does not exist: every query fails at open.
    SqliteEntityStore::builder()
        .path(&path)
        .read_only(true)
        .create_if_missing(false)
        .build()
        .unwrap()
}

fn audit_minimal(id: &str) -> Audit {
    Audit {
        id: id.into(),
        nom: format!("Audit {id}"),
        type_audit: "technique".into(),
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

fn constat(id: &str, audit: &str) -> Constat {
    Constat {
        id: id.into(),
        audit: audit.into(),
        projet: None,
        type_constat: "NC min".into(),
        criticite: "Moyenne".into(),
        impact: None,
        probabilite: None,
        description: String::new(),
        recommandations: vec![],
    }
}

fn document(id: &str, projet: &str, version: u32) -> PasDocument {
    PasDocument {
        id: id.into(),
        projet: projet.into(),
        version,
        creer_par: None,
        date_creation: Utc::now(),
        objet: String::new(),
        champ_application: ChampApplication::default(),
        references: ReferencesSection::default(),
        organisation_securite: OrganisationSecurite::default(),
        analyse_risques: AnalyseRisques::default(),
        mesures_securite: MesuresSecuriteSection::default(),
        pca_pra: PcaPraSection::default(),
        suivi_audit: SuiviAudit::default(),
        annexes: Annexes::default(),
        swot_analyses: vec![],
        risques: vec![],
    }
}

#[tokio::test]
async fn repli_consulte_quand_le_primaire_est_vide() {
    let primaire = setup_store();
    let repli = setup_store();
    repli.upsert_constat(&constat("c1", "a1")).unwrap();

    let annuaire = TieredDirectory::new(Arc::new(primaire)).with_fallback(Arc::new(repli));
    let constats = annuaire.find_constats_by_audit("a1").await.unwrap();
    assert_eq!(constats.len(), 1);
    assert_eq!(constats[0].id, "c1");
}

#[tokio::test]
async fn les_sources_ne_sont_jamais_fusionnees() {
    let primaire = setup_store();
    primaire.upsert_constat(&constat("c1", "a1")).unwrap();
    let repli = setup_store();
    repli.upsert_constat(&constat("c2", "a1")).unwrap();

    let annuaire = TieredDirectory::new(Arc::new(primaire)).with_fallback(Arc::new(repli));
    let constats = annuaire.find_constats_by_audit("a1").await.unwrap();
    assert_eq!(constats.len(), 1);
    assert_eq!(constats[0].id, "c1");
}

#[tokio::test]
async fn entite_unique_trouvee_dans_le_repli() {
    let primaire = setup_store();
    let repli = setup_store();
    repli.upsert_audit(&audit_minimal("a1")).unwrap();

    let annuaire = TieredDirectory::new(Arc::new(primaire)).with_fallback(Arc::new(repli));
    let audit = annuaire.find_audit("a1").await.unwrap();
    assert_eq!(audit.map(|a| a.id), Some("a1".to_string()));
    assert!(annuaire.find_audit("a2").await.unwrap().is_none());
}

#[tokio::test]
async fn repli_defaillant_degrade_en_resultat_precedent() {
    let primaire = setup_store();
    let annuaire =
        TieredDirectory::new(Arc::new(primaire)).with_fallback(Arc::new(store_defaillant()));

    let constats = annuaire.find_constats_by_audit("a1").await.unwrap();
    assert!(constats.is_empty());
    assert!(annuaire.find_audit("a1").await.unwrap().is_none());
}

#[tokio::test]
async fn primaire_defaillant_propage_l_erreur() {
    let repli = setup_store();
    repli.upsert_constat(&constat("c1", "a1")).unwrap();
    let annuaire =
        TieredDirectory::new(Arc::new(store_defaillant())).with_fallback(Arc::new(repli));

    assert!(annuaire.find_constats_by_audit("a1").await.is_err());
}

#[tokio::test]
async fn ecriture_toujours_sur_le_primaire() {
    let primaire = setup_store();
    let repli = setup_store();
    let annuaire = TieredDirectory::new(Arc::new(primaire.clone()))
        .with_fallback(Arc::new(repli.clone()));

    annuaire.create_pas(&document("pas-1", "p1", 1)).await.unwrap();

    assert_eq!(primaire.find_pas_by_projet("p1").await.unwrap().len(), 1);
    assert!(repli.find_pas_by_projet("p1").await.unwrap().is_empty());
}
