use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::model::{
    Audit, Conception, Constat, Norme, PlanAction, Preuve, Projet, Recommandation, Reference,
    Risque, SecuriteProjet, Swot,
};
use crate::pas::PasDocument;

use super::{EntityDirectory, StoreError, StoreResult};

const ENTITY_SCHEMA: &str = include_str!("../../../sql/entities.sql");

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;\n\
         PRAGMA synchronous = NORMAL;\n\
         PRAGMA temp_store = MEMORY;\n\
         PRAGMA busy_timeout = 5000;\n",
    )
}

#[derive(Debug, Clone)]
pub struct SqliteEntityStoreBuilder {
    path: Option<PathBuf>,
    read_only: bool,
    create_if_missing: bool,
}

impl Default for SqliteEntityStoreBuilder {
    fn default() -> Self {
        Self {
            path: None,
            read_only: false,
            create_if_missing: true,
        }
    }
}

impl SqliteEntityStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn read_only(mut self, value: bool) -> Self {
        self.read_only = value;
        self
    }

    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    pub fn build(self) -> StoreResult<SqliteEntityStore> {
        let path = self.path.ok_or(StoreError::MissingStore)?;
        let mut flags = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };

        if !self.read_only && self.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        Ok(SqliteEntityStore { path, flags })
    }
}

/// Document-style SQLite store: one table per entity class holding the id,
/// the indexed parent-reference columns and the JSON body.
#[derive(Debug, Clone)]
pub struct SqliteEntityStore {
    path: PathBuf,
    flags: OpenFlags,
}

/// A bundle of entities imported in one transaction, used to seed the
/// primary or the offline cache store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotEntites {
    #[serde(default)]
    pub audits: Vec<Audit>,
    #[serde(default)]
    pub constats: Vec<Constat>,
    #[serde(default)]
    pub recommandations: Vec<Recommandation>,
    #[serde(default)]
    pub plan_actions: Vec<PlanAction>,
    #[serde(default)]
    pub preuves: Vec<Preuve>,
    #[serde(default)]
    pub projets: Vec<Projet>,
    #[serde(default)]
    pub swots: Vec<Swot>,
    #[serde(default)]
    pub risques: Vec<Risque>,
    #[serde(default)]
    pub conceptions: Vec<Conception>,
    #[serde(default)]
    pub securite_projets: Vec<SecuriteProjet>,
    #[serde(default)]
    pub normes: Vec<Norme>,
}

impl SqliteEntityStore {
    pub fn builder() -> SqliteEntityStoreBuilder {
        SqliteEntityStoreBuilder::new()
    }

    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        SqliteEntityStoreBuilder::new().path(path).build()
    }

    fn open(&self) -> StoreResult<Connection> {
        let conn = Connection::open_with_flags(&self.path, self.flags).map_err(|source| {
            StoreError::OpenDatabase {
                path: self.path.clone(),
                source,
            }
        })?;
        configure_connection(&conn).map_err(|source| StoreError::OpenDatabase {
            path: self.path.clone(),
            source,
        })?;
        Ok(conn)
    }

    pub fn initialize(&self) -> StoreResult<()> {
        let conn = self.open()?;
        conn.execute_batch(ENTITY_SCHEMA)?;
        Ok(())
    }

    pub fn upsert_audit(&self, audit: &Audit) -> StoreResult<()> {
        put_audit(&self.open()?, audit)
    }

    pub fn upsert_constat(&self, constat: &Constat) -> StoreResult<()> {
        put_constat(&self.open()?, constat)
    }

    pub fn upsert_recommandation(&self, recommandation: &Recommandation) -> StoreResult<()> {
        put_recommandation(&self.open()?, recommandation)
    }

    pub fn upsert_plan_action(&self, plan: &PlanAction) -> StoreResult<()> {
        put_plan_action(&self.open()?, plan)
    }

    pub fn upsert_preuve(&self, preuve: &Preuve) -> StoreResult<()> {
        put_preuve(&self.open()?, preuve)
    }

    pub fn upsert_projet(&self, projet: &Projet) -> StoreResult<()> {
        put_projet(&self.open()?, projet)
    }

    pub fn upsert_swot(&self, swot: &Swot) -> StoreResult<()> {
        put_swot(&self.open()?, swot)
    }

    pub fn upsert_risque(&self, risque: &Risque) -> StoreResult<()> {
        put_risque(&self.open()?, risque)
    }

    pub fn upsert_conception(&self, conception: &Conception) -> StoreResult<()> {
        put_conception(&self.open()?, conception)
    }

    pub fn upsert_securite(&self, securite: &SecuriteProjet) -> StoreResult<()> {
        put_securite(&self.open()?, securite)
    }

    pub fn upsert_norme(&self, norme: &Norme) -> StoreResult<()> {
        put_norme(&self.open()?, norme)
    }

    /// Imports a whole bundle atomically. Returns the number of records
    /// written.
    pub fn import(&self, lot: &LotEntites) -> StoreResult<usize> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        let mut inseres = 0;
        for audit in &lot.audits {
            put_audit(&tx, audit)?;
            inseres += 1;
        }
        for constat in &lot.constats {
            put_constat(&tx, constat)?;
            inseres += 1;
        }
        for recommandation in &lot.recommandations {
            put_recommandation(&tx, recommandation)?;
            inseres += 1;
        }
        for plan in &lot.plan_actions {
            put_plan_action(&tx, plan)?;
            inseres += 1;
        }
        for preuve in &lot.preuves {
            put_preuve(&tx, preuve)?;
            inseres += 1;
        }
        for projet in &lot.projets {
            put_projet(&tx, projet)?;
            inseres += 1;
        }
        for swot in &lot.swots {
            put_swot(&tx, swot)?;
            inseres += 1;
        }
        for risque in &lot.risques {
            put_risque(&tx, risque)?;
            inseres += 1;
        }
        for conception in &lot.conceptions {
            put_conception(&tx, conception)?;
            inseres += 1;
        }
        for securite in &lot.securite_projets {
            put_securite(&tx, securite)?;
            inseres += 1;
        }
        for norme in &lot.normes {
            put_norme(&tx, norme)?;
            inseres += 1;
        }
        tx.commit()?;
        Ok(inseres)
    }

    /// Row counts per entity class, for operational status.
    pub fn count_entities(&self) -> StoreResult<BTreeMap<String, usize>> {
        let conn = self.open()?;
        let tables = [
            "audits",
            "constats",
            "recommandations",
            "plan_actions",
            "preuves",
            "projets",
            "swots",
            "risques",
            "conceptions",
            "securite_projets",
            "normes",
            "pas",
        ];
        let mut counts = BTreeMap::new();
        for table in tables {
            let total: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
            counts.insert(table.to_string(), total as usize);
        }
        Ok(counts)
    }

    /// Re-embeds a projet summary on constats that carry a bare projet id,
    /// so downstream consumers get the summary fields without a second round
    /// trip. Dangling ids are left as-is; the resolver decides their fate.
    fn populate_projets(&self, conn: &Connection, constats: &mut [Constat]) -> StoreResult<()> {
        let ids: Vec<String> = constats
            .iter()
            .filter_map(|constat| constat.projet.as_ref())
            .filter(|reference| reference.resume().is_none())
            .map(|reference| reference.id().to_string())
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        let projets: Vec<Projet> = fetch_by_ids(conn, "projets", &ids)?;
        for constat in constats.iter_mut() {
            let Some(reference) = constat.projet.as_ref() else {
                continue;
            };
            if reference.resume().is_some() {
                continue;
            }
            if let Some(projet) = projets.iter().find(|projet| projet.id == reference.id()) {
                constat.projet = Some(Reference::Resume(projet.resume()));
            }
        }
        Ok(())
    }
}

fn fetch_by_parent<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    parent: &str,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([parent], |row| row.get::<_, String>(0))?;
    let mut liste = Vec::new();
    for body in rows {
        liste.push(serde_json::from_str(&body?)?);
    }
    Ok(liste)
}

fn fetch_by_ids<T: DeserializeOwned>(
    conn: &Connection,
    table: &str,
    ids: &[String],
) -> StoreResult<Vec<T>> {
    fetch_in(conn, table, "id", ids)
}

fn fetch_in<T: DeserializeOwned>(
    conn: &Connection,
    table: &str,
    colonne: &str,
    valeurs: &[String],
) -> StoreResult<Vec<T>> {
    if valeurs.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; valeurs.len()].join(", ");
    let sql = format!("SELECT body FROM {table} WHERE {colonne} IN ({placeholders})");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(valeurs.iter()), |row| {
        row.get::<_, String>(0)
    })?;
    let mut liste = Vec::new();
    for body in rows {
        liste.push(serde_json::from_str(&body?)?);
    }
    Ok(liste)
}

fn put_audit(conn: &Connection, audit: &Audit) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO audits (id, body) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET body = excluded.body",
        params![audit.id, serde_json::to_string(audit)?],
    )?;
    Ok(())
}

fn put_constat(conn: &Connection, constat: &Constat) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO constats (id, audit_id, projet_id, body) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             audit_id = excluded.audit_id,
             projet_id = excluded.projet_id,
             body = excluded.body",
        params![
            constat.id,
            constat.audit,
            constat.projet.as_ref().map(Reference::id),
            serde_json::to_string(constat)?,
        ],
    )?;
    Ok(())
}

fn put_recommandation(conn: &Connection, recommandation: &Recommandation) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO recommandations (id, constat_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
             constat_id = excluded.constat_id,
             body = excluded.body",
        params![
            recommandation.id,
            recommandation.constat,
            serde_json::to_string(recommandation)?,
        ],
    )?;
    Ok(())
}

fn put_plan_action(conn: &Connection, plan: &PlanAction) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO plan_actions (id, body) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET body = excluded.body",
        params![plan.id, serde_json::to_string(plan)?],
    )?;
    // Refresh the reverse-edge rows.
    conn.execute(
        "DELETE FROM plan_action_recommandations WHERE plan_action_id = ?1",
        [plan.id.as_str()],
    )?;
    for recommandation_id in &plan.recommandations {
        conn.execute(
            "INSERT OR IGNORE INTO plan_action_recommandations
                 (plan_action_id, recommandation_id)
             VALUES (?1, ?2)",
            params![plan.id, recommandation_id],
        )?;
    }
    Ok(())
}

fn put_preuve(conn: &Connection, preuve: &Preuve) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO preuves (id, audit_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
             audit_id = excluded.audit_id,
             body = excluded.body",
        params![preuve.id, preuve.audit, serde_json::to_string(preuve)?],
    )?;
    Ok(())
}

fn put_projet(conn: &Connection, projet: &Projet) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO projets (id, audit_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
             audit_id = excluded.audit_id,
             body = excluded.body",
        params![projet.id, projet.audit, serde_json::to_string(projet)?],
    )?;
    Ok(())
}

fn put_swot(conn: &Connection, swot: &Swot) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO swots (id, projet_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
             projet_id = excluded.projet_id,
             body = excluded.body",
        params![swot.id, swot.projet, serde_json::to_string(swot)?],
    )?;
    Ok(())
}

fn put_risque(conn: &Connection, risque: &Risque) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO risques (id, projet_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
             projet_id = excluded.projet_id,
             body = excluded.body",
        params![risque.id, risque.projet, serde_json::to_string(risque)?],
    )?;
    Ok(())
}

fn put_conception(conn: &Connection, conception: &Conception) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO conceptions (id, projet_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET
             projet_id = excluded.projet_id,
             body = excluded.body",
        params![
            conception.id,
            conception.projet,
            serde_json::to_string(conception)?,
        ],
    )?;
    Ok(())
}

fn put_securite(conn: &Connection, securite: &SecuriteProjet) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO securite_projets (id, projet_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(projet_id) DO UPDATE SET
             id = excluded.id,
             body = excluded.body",
        params![
            securite.id,
            securite.projet,
            serde_json::to_string(securite)?,
        ],
    )?;
    Ok(())
}

fn put_norme(conn: &Connection, norme: &Norme) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO normes (id, body) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET body = excluded.body",
        params![norme.id, serde_json::to_string(norme)?],
    )?;
    Ok(())
}

#[async_trait]
impl EntityDirectory for SqliteEntityStore {
    async fn find_audit(&self, audit_id: &str) -> StoreResult<Option<Audit>> {
        let conn = self.open()?;
        let body = conn
            .query_row(
                "SELECT body FROM audits WHERE id = ?1",
                [audit_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(match body {
            Some(body) => Some(serde_json::from_str(&body)?),
            None => None,
        })
    }

    async fn find_projet(&self, projet_id: &str) -> StoreResult<Option<Projet>> {
        let conn = self.open()?;
        let body = conn
            .query_row(
                "SELECT body FROM projets WHERE id = ?1",
                [projet_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(match body {
            Some(body) => Some(serde_json::from_str(&body)?),
            None => None,
        })
    }

    async fn find_constats_by_audit(&self, audit_id: &str) -> StoreResult<Vec<Constat>> {
        let conn = self.open()?;
        let mut constats: Vec<Constat> = fetch_by_parent(
            &conn,
            "SELECT body FROM constats WHERE audit_id = ?1 ORDER BY id",
            audit_id,
        )?;
        self.populate_projets(&conn, &mut constats)?;
        Ok(constats)
    }

    async fn find_constats_by_projet(&self, projet_id: &str) -> StoreResult<Vec<Constat>> {
        let conn = self.open()?;
        let mut constats: Vec<Constat> = fetch_by_parent(
            &conn,
            "SELECT body FROM constats WHERE projet_id = ?1 ORDER BY id",
            projet_id,
        )?;
        self.populate_projets(&conn, &mut constats)?;
        Ok(constats)
    }

    async fn find_recommandations_by_constats(
        &self,
        constat_ids: &[String],
    ) -> StoreResult<Vec<Recommandation>> {
        let conn = self.open()?;
        fetch_in(&conn, "recommandations", "constat_id", constat_ids)
    }

    async fn find_plan_actions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<PlanAction>> {
        let conn = self.open()?;
        fetch_by_ids(&conn, "plan_actions", ids)
    }

    async fn find_plan_actions_referencing(
        &self,
        recommandation_ids: &[String],
    ) -> StoreResult<Vec<PlanAction>> {
        if recommandation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.open()?;
        let placeholders = vec!["?"; recommandation_ids.len()].join(", ");
        let sql = format!(
            "SELECT DISTINCT pa.body
             FROM plan_actions pa
             JOIN plan_action_recommandations lien ON lien.plan_action_id = pa.id
             WHERE lien.recommandation_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(recommandation_ids.iter()), |row| {
            row.get::<_, String>(0)
        })?;
        let mut liste = Vec::new();
        for body in rows {
            liste.push(serde_json::from_str(&body?)?);
        }
        Ok(liste)
    }

    async fn find_projets_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Projet>> {
        let conn = self.open()?;
        fetch_by_ids(&conn, "projets", ids)
    }

    async fn find_swots_by_projets(&self, projet_ids: &[String]) -> StoreResult<Vec<Swot>> {
        let conn = self.open()?;
        fetch_in(&conn, "swots", "projet_id", projet_ids)
    }

    async fn find_risques_by_projets(&self, projet_ids: &[String]) -> StoreResult<Vec<Risque>> {
        let conn = self.open()?;
        fetch_in(&conn, "risques", "projet_id", projet_ids)
    }

    async fn find_conceptions_by_projets(
        &self,
        projet_ids: &[String],
    ) -> StoreResult<Vec<Conception>> {
        let conn = self.open()?;
        fetch_in(&conn, "conceptions", "projet_id", projet_ids)
    }

    async fn find_securite_by_projet(
        &self,
        projet_id: &str,
    ) -> StoreResult<Option<SecuriteProjet>> {
        let conn = self.open()?;
        let body = conn
            .query_row(
                "SELECT body FROM securite_projets WHERE projet_id = ?1",
                [projet_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(match body {
            Some(body) => Some(serde_json::from_str(&body)?),
            None => None,
        })
    }

    async fn find_preuves_by_audit(&self, audit_id: &str) -> StoreResult<Vec<Preuve>> {
        let conn = self.open()?;
        fetch_by_parent(
            &conn,
            "SELECT body FROM preuves WHERE audit_id = ?1 ORDER BY id",
            audit_id,
        )
    }

    async fn find_normes_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Norme>> {
        let conn = self.open()?;
        fetch_by_ids(&conn, "normes", ids)
    }

    async fn find_pas_by_projet(&self, projet_id: &str) -> StoreResult<Vec<PasDocument>> {
        let conn = self.open()?;
        fetch_by_parent(
            &conn,
            "SELECT body FROM pas WHERE projet_id = ?1 ORDER BY version ASC",
            projet_id,
        )
    }

    async fn create_pas(&self, document: &PasDocument) -> StoreResult<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO pas (id, projet_id, version, body) VALUES (?1, ?2, ?3, ?4)",
            params![
                document.id,
                document.projet,
                document.version,
                serde_json::to_string(document)?,
            ],
        )?;
        Ok(())
    }
}
