pub mod config;
pub mod error;
pub mod labels;
pub mod model;
pub mod pas;
pub mod store;
pub mod synthese;

pub use config::{load_pas_config, GenerationSection, PasConfig, StoresSection};
pub use error::{ConfigError, Result};
pub use labels::{
    Criticite, Decision, Priorite, StatutAction, StatutRecommandation, TypeConstat,
};
pub use pas::{Generateur, PasBuilder, PasDocument, PasError, PasResult};
pub use store::{
    EntityDirectory, LotEntites, SqliteEntityStore, SqliteEntityStoreBuilder, StoreError,
    StoreResult, TieredDirectory,
};
pub use synthese::{
    pourcentage, AuditClosure, DonneesAudit, ProjetClosure, Resolver, StatsProjet, Synthese,
    SyntheseError, SyntheseResult,
};
