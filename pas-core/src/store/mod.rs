pub mod error;
pub mod sqlite;
pub mod tiered;

use async_trait::async_trait;

use crate::model::{
    Audit, Conception, Constat, Norme, PlanAction, Preuve, Projet, Recommandation, Risque,
    SecuriteProjet, Swot,
};
use crate::pas::PasDocument;

pub use error::{StoreError, StoreResult};
pub use sqlite::{LotEntites, SqliteEntityStore, SqliteEntityStoreBuilder};
pub use tiered::TieredDirectory;

/// Read (and single write) contract over the entity stores. The engine never
/// mutates entities; `create_pas` is the one write, issued once per
/// generation after the whole computation completes.
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    async fn find_audit(&self, audit_id: &str) -> StoreResult<Option<Audit>>;
    async fn find_projet(&self, projet_id: &str) -> StoreResult<Option<Projet>>;
    async fn find_constats_by_audit(&self, audit_id: &str) -> StoreResult<Vec<Constat>>;
    async fn find_constats_by_projet(&self, projet_id: &str) -> StoreResult<Vec<Constat>>;
    async fn find_recommandations_by_constats(
        &self,
        constat_ids: &[String],
    ) -> StoreResult<Vec<Recommandation>>;
    async fn find_plan_actions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<PlanAction>>;
    /// Reverse direction of the recommandation<->plan d'action edge: plans
    /// d'action whose own list references one of the given recommandations.
    async fn find_plan_actions_referencing(
        &self,
        recommandation_ids: &[String],
    ) -> StoreResult<Vec<PlanAction>>;
    async fn find_projets_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Projet>>;
    async fn find_swots_by_projets(&self, projet_ids: &[String]) -> StoreResult<Vec<Swot>>;
    async fn find_risques_by_projets(&self, projet_ids: &[String]) -> StoreResult<Vec<Risque>>;
    async fn find_conceptions_by_projets(
        &self,
        projet_ids: &[String],
    ) -> StoreResult<Vec<Conception>>;
    async fn find_securite_by_projet(
        &self,
        projet_id: &str,
    ) -> StoreResult<Option<SecuriteProjet>>;
    async fn find_preuves_by_audit(&self, audit_id: &str) -> StoreResult<Vec<Preuve>>;
    async fn find_normes_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Norme>>;
    async fn find_pas_by_projet(&self, projet_id: &str) -> StoreResult<Vec<PasDocument>>;
    async fn create_pas(&self, document: &PasDocument) -> StoreResult<()>;
}
