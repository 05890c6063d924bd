pub mod builder;
pub mod error;
pub mod generator;
pub mod models;

pub use builder::PasBuilder;
pub use error::{PasError, PasResult};
pub use generator::Generateur;
pub use models::{
    AnalyseRisques, Annexes, ChampApplication, MesuresSecuriteSection, OrganisationSecurite,
    PasDocument, PcaPraSection, ReferencesSection, RisqueDetail, SuiviAudit, SwotDetail,
};
