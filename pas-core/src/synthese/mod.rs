pub mod error;
pub mod models;
pub mod resolver;
pub mod stats;

pub use error::{SyntheseError, SyntheseResult};
pub use models::{AuditClosure, DonneesAudit, ProjetClosure, Synthese};
pub use resolver::Resolver;
pub use stats::{
    pourcentage, StatsConstats, StatsPlanActions, StatsPreuves, StatsProjet,
    StatsRecommandations, StatsSynthese,
};
