use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Serialize;
use thiserror::Error;

use pas_core::{
    load_pas_config, pourcentage, EntityDirectory, Generateur, LotEntites, PasConfig, PasDocument,
    Resolver, SqliteEntityStore, StatsProjet, Synthese, TieredDirectory,
};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] pas_core::ConfigError),
    #[error("store error: {0}")]
    Store(#[from] pas_core::StoreError),
    #[error("synthèse error: {0}")]
    Synthese(#[from] pas_core::SyntheseError),
    #[error("PAS error: {0}")]
    Pas(#[from] pas_core::PasError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("authentication failed")]
    Authentication,
    #[error("required resource missing: {0}")]
    MissingResource(String),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Interface de contrôle du moteur de synthèse d'audits et de génération de PAS", long_about = None)]
pub struct Cli {
    /// Chemin du pas.toml principal
    #[arg(long, default_value = "configs/pas.toml")]
    pub config: PathBuf,
    /// Chemin alternatif pour la base primaire
    #[arg(long)]
    pub primary_db: Option<PathBuf>,
    /// Chemin alternatif pour la base cache/hors-ligne
    #[arg(long)]
    pub cache_db: Option<PathBuf>,
    /// Token pour authentification locale (si PASCTL_TOKEN est défini)
    #[arg(long)]
    pub token: Option<String>,
    /// Format de sortie
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Affiche les effectifs par classe d'entités
    Status,
    /// Calcule la synthèse statistique d'un audit
    Synthese(SyntheseArgs),
    /// Répartitions fusionnées (statuts, criticités) d'un projet
    Stats(StatsArgs),
    /// Opérations sur les Plans d'Assurance Sécurité
    #[command(subcommand)]
    Pas(PasCommands),
    /// Importe un lot d'entités JSON dans un magasin
    Import(ImportArgs),
    /// Génère les complétions shell
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct SyntheseArgs {
    /// Identifiant de l'audit racine
    #[arg(long)]
    pub audit: String,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Identifiant du projet racine
    #[arg(long)]
    pub projet: String,
}

#[derive(Subcommand, Debug)]
pub enum PasCommands {
    /// Génère et persiste le PAS d'un projet
    Generer(PasGenererArgs),
}

#[derive(Args, Debug)]
pub struct PasGenererArgs {
    /// Identifiant du projet racine
    #[arg(long)]
    pub projet: String,
    /// Rédacteur consigné dans le document
    #[arg(long)]
    pub creer_par: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Fichier JSON contenant le lot d'entités
    pub file: PathBuf,
    /// Importe vers le magasin cache/hors-ligne plutôt que le primaire
    #[arg(long, default_value_t = false)]
    pub cache: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell cible
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        clap_complete::generate(
            args.shell,
            &mut Cli::command(),
            "pasctl",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    enforce_token(&cli)?;
    let context = AppContext::new(&cli)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match &cli.command {
        Commands::Status => {
            let status = context.gather_status()?;
            render(&status, cli.format)
        }
        Commands::Synthese(args) => {
            let synthese = runtime.block_on(context.synthese(args))?;
            render(&synthese, cli.format)
        }
        Commands::Stats(args) => {
            let stats = runtime.block_on(context.stats_projet(args))?;
            render(&stats, cli.format)
        }
        Commands::Pas(PasCommands::Generer(args)) => {
            let document = runtime.block_on(context.generer_pas(args))?;
            render(&document, cli.format)
        }
        Commands::Import(args) => {
            let report = context.import(args)?;
            render(&report, cli.format)
        }
        Commands::Completions(_) => Ok(()),
    }
}

fn enforce_token(cli: &Cli) -> Result<()> {
    if let Ok(expected) = std::env::var("PASCTL_TOKEN") {
        match &cli.token {
            Some(provided) if provided == &expected => Ok(()),
            _ => Err(AppError::Authentication),
        }
    } else {
        Ok(())
    }
}

fn render<T>(value: &T, format: OutputFormat) -> Result<()>
where
    T: Serialize + Affichage,
{
    match format {
        OutputFormat::Text => {
            println!("{}", value.texte());
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
            Ok(())
        }
    }
}

trait Affichage {
    fn texte(&self) -> String;
}

struct AppContext {
    config: PasConfig,
    primary_db: PathBuf,
    cache_db: Option<PathBuf>,
}

impl AppContext {
    fn new(cli: &Cli) -> Result<Self> {
        let config = load_pas_config(&cli.config)?;
        let base = cli
            .config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let primary_db = cli
            .primary_db
            .clone()
            .unwrap_or_else(|| config.resolve_path(&base, &config.stores.primary_db));
        let cache_db = cli.cache_db.clone().or_else(|| {
            config
                .stores
                .cache_db
                .as_deref()
                .map(|chemin| config.resolve_path(&base, chemin))
        });

        Ok(Self {
            config,
            primary_db,
            cache_db,
        })
    }

    fn primary_store(&self) -> Result<SqliteEntityStore> {
        Ok(SqliteEntityStore::builder()
            .path(&self.primary_db)
            .create_if_missing(true)
            .build()?)
    }

    /// Primary store plus the optional offline cache, tried in that order.
    fn directory(&self) -> Result<Arc<dyn EntityDirectory>> {
        let primary = self.primary_store()?;
        primary.initialize()?;
        let mut tiered = TieredDirectory::new(Arc::new(primary));
        if let Some(cache) = &self.cache_db {
            if cache.exists() {
                let store = SqliteEntityStore::builder()
                    .path(cache)
                    .read_only(true)
                    .create_if_missing(false)
                    .build()?;
                tiered = tiered.with_fallback(Arc::new(store));
            }
        }
        Ok(Arc::new(tiered))
    }

    fn gather_status(&self) -> Result<StatusReport> {
        let store = self.primary_store()?;
        store.initialize()?;
        let counts = store.count_entities()?;
        Ok(StatusReport {
            primary_db: self.primary_db.display().to_string(),
            cache_db: self
                .cache_db
                .as_ref()
                .map(|chemin| chemin.display().to_string()),
            counts,
        })
    }

    async fn synthese(&self, args: &SyntheseArgs) -> Result<Synthese> {
        let resolver = Resolver::new(self.directory()?);
        Ok(resolver.synthese_audit(&args.audit).await?)
    }

    async fn stats_projet(&self, args: &StatsArgs) -> Result<StatsProjet> {
        let resolver = Resolver::new(self.directory()?);
        Ok(resolver.stats_projet(&args.projet).await?)
    }

    async fn generer_pas(&self, args: &PasGenererArgs) -> Result<PasDocument> {
        let generateur = Generateur::new(self.directory()?, self.config.generation.clone());
        Ok(generateur
            .generer_pas(&args.projet, args.creer_par.as_deref())
            .await?)
    }

    fn import(&self, args: &ImportArgs) -> Result<ImportReport> {
        let cible = if args.cache {
            self.cache_db
                .clone()
                .ok_or_else(|| AppError::MissingResource("stores.cache_db".to_string()))?
        } else {
            self.primary_db.clone()
        };
        let contenu = fs::read_to_string(&args.file)?;
        let lot: LotEntites = serde_json::from_str(&contenu)?;
        let store = SqliteEntityStore::builder()
            .path(&cible)
            .create_if_missing(true)
            .build()?;
        store.initialize()?;
        let inseres = store.import(&lot)?;
        Ok(ImportReport {
            cible: cible.display().to_string(),
            inseres,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub primary_db: String,
    pub cache_db: Option<String>,
    pub counts: std::collections::BTreeMap<String, usize>,
}

impl Affichage for StatusReport {
    fn texte(&self) -> String {
        let mut sortie = format!("magasin primaire : {}\n", self.primary_db);
        match &self.cache_db {
            Some(cache) => {
                let _ = writeln!(sortie, "magasin cache    : {cache}");
            }
            None => sortie.push_str("magasin cache    : (absent)\n"),
        }
        for (table, total) in &self.counts {
            let _ = writeln!(sortie, "{table:<20} {total}");
        }
        sortie.trim_end().to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub cible: String,
    pub inseres: usize,
}

impl Affichage for ImportReport {
    fn texte(&self) -> String {
        format!("{} enregistrements importés vers {}", self.inseres, self.cible)
    }
}

impl Affichage for Synthese {
    fn texte(&self) -> String {
        let constats = &self.stats.constats;
        let mut sortie = String::new();
        let _ = writeln!(sortie, "audit : {} ({})", self.audit.nom, self.audit.id);
        let _ = writeln!(
            sortie,
            "constats        : {} (NC maj {}, NC min {}, observations {}, points forts {})",
            constats.total,
            quota(constats.nc_maj, constats.total),
            quota(constats.nc_min, constats.total),
            quota(constats.observation, constats.total),
            quota(constats.point_fort, constats.total),
        );
        let _ = writeln!(
            sortie,
            "criticités      : critique {}, élevée {}, moyenne {}, faible {}",
            quota(constats.critique, constats.total),
            quota(constats.elevee, constats.total),
            quota(constats.moyenne, constats.total),
            quota(constats.faible, constats.total),
        );
        let _ = writeln!(
            sortie,
            "recommandations : {} (en attente {}, validées {}, à réviser {})",
            self.stats.recommandations.total,
            quota(
                self.stats.recommandations.en_attente,
                self.stats.recommandations.total
            ),
            quota(
                self.stats.recommandations.validees,
                self.stats.recommandations.total
            ),
            quota(
                self.stats.recommandations.a_reviser,
                self.stats.recommandations.total
            ),
        );
        let _ = writeln!(
            sortie,
            "plans d'action  : {} (en cours {}, terminés {}, en attente {})",
            self.stats.plan_actions.total,
            quota(
                self.stats.plan_actions.en_cours,
                self.stats.plan_actions.total
            ),
            quota(
                self.stats.plan_actions.termines,
                self.stats.plan_actions.total
            ),
            quota(
                self.stats.plan_actions.en_attente,
                self.stats.plan_actions.total
            ),
        );
        let _ = writeln!(sortie, "preuves         : {}", self.stats.preuves.total);
        let _ = write!(sortie, "projets liés    : {}", self.data.projets.len());
        sortie
    }
}

/// "count (percent%)" pair used by the text renderings.
fn quota(part: usize, total: usize) -> String {
    format!("{part} ({}%)", pourcentage(part, total))
}

impl Affichage for StatsProjet {
    fn texte(&self) -> String {
        let mut sortie = String::from("statuts d'actions :\n");
        let actions: usize = self.statut_actions.values().sum();
        for (statut, total) in &self.statut_actions {
            let _ = writeln!(sortie, "  {statut:<12} {}", quota(*total, actions));
        }
        sortie.push_str("criticités :\n");
        let criticites: usize = self.criticites.values().sum();
        for (criticite, total) in &self.criticites {
            let _ = writeln!(sortie, "  {criticite:<12} {}", quota(*total, criticites));
        }
        sortie.push_str("décisions :\n");
        let decisions: usize = self.decisions.values().sum();
        for (decision, total) in &self.decisions {
            let _ = writeln!(sortie, "  {decision:<12} {}", quota(*total, decisions));
        }
        sortie.trim_end().to_string()
    }
}

impl Affichage for PasDocument {
    fn texte(&self) -> String {
        let mut sortie = String::new();
        let _ = writeln!(sortie, "PAS {} (version {})", self.id, self.version);
        let _ = writeln!(sortie, "projet : {}", self.projet);
        let _ = writeln!(sortie, "objet  : {}", self.objet);
        let _ = writeln!(
            sortie,
            "mesures : {} physiques, {} logiques, {} organisationnelles",
            self.mesures_securite.physique.len(),
            self.mesures_securite.logique.len(),
            self.mesures_securite.organisationnelle.len(),
        );
        let _ = write!(
            sortie,
            "annexes : {} contacts d'urgence, {} risques détaillés",
            self.annexes.contacts_urgence.len(),
            self.risques.len(),
        );
        sortie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;
    use tempfile::TempDir;

    fn prepare_test_context() -> (TempDir, AppContext) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let configs_dir = root.join("configs");
        fs::create_dir_all(&configs_dir).unwrap();
        fs::copy("../configs/pas.toml", configs_dir.join("pas.toml")).unwrap();

        let data_dir = root.join("data");
        fs::create_dir_all(&data_dir).unwrap();
        let primary_db = data_dir.join("pas.sqlite");
        let conn = rusqlite::Connection::open(&primary_db).unwrap();
        conn.execute_batch(&fs::read_to_string("../sql/entities.sql").unwrap())
            .unwrap();
        conn.execute(
            "INSERT INTO audits (id, body) VALUES (?1, ?2)",
            params![
                "a1",
                r#"{"id":"a1","nom":"Audit SI 2026","typeAudit":"organisationnel"}"#
            ],
        )
        .unwrap();

        let cli = Cli {
            config: configs_dir.join("pas.toml"),
            primary_db: Some(primary_db),
            cache_db: None,
            token: None,
            format: OutputFormat::Json,
            command: Commands::Status,
        };
        let context = AppContext::new(&cli).unwrap();
        (temp, context)
    }

    #[test]
    fn la_definition_cli_est_coherente() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_compte_les_entites() {
        let (_temp, context) = prepare_test_context();
        let report = context.gather_status().unwrap();
        assert_eq!(report.counts.get("audits"), Some(&1));
        assert_eq!(report.counts.get("pas"), Some(&0));
    }

    #[test]
    fn import_d_un_lot_vers_le_primaire() {
        let (temp, context) = prepare_test_context();
        let lot = temp.path().join("lot.json");
        fs::write(
            &lot,
            r#"{
                "audits": [{"id": "a2", "nom": "Audit interne", "typeAudit": "technique"}],
                "normes": [{"id": "n1", "nom": "ISO 27001", "version": "2022"}]
            }"#,
        )
        .unwrap();

        let report = context
            .import(&ImportArgs {
                file: lot,
                cache: false,
            })
            .unwrap();
        assert_eq!(report.inseres, 2);

        let status = context.gather_status().unwrap();
        assert_eq!(status.counts.get("audits"), Some(&2));
        assert_eq!(status.counts.get("normes"), Some(&1));
    }

    #[test]
    fn le_texte_de_synthese_affiche_les_pourcentages() {
        let audit: pas_core::model::Audit = serde_json::from_str(
            r#"{"id":"a1","nom":"Audit SI 2026","typeAudit":"organisationnel"}"#,
        )
        .unwrap();
        let mut stats = pas_core::synthese::StatsSynthese::default();
        stats.constats.total = 3;
        stats.constats.nc_maj = 2;
        stats.constats.observation = 1;
        stats.constats.critique = 2;
        stats.constats.faible = 1;

        let synthese = Synthese {
            audit,
            data: pas_core::DonneesAudit {
                constats: vec![],
                recommandations: vec![],
                plan_actions: vec![],
                preuves: vec![],
                projets: vec![],
                swot_by_projet: Default::default(),
                risques_by_projet: Default::default(),
                conceptions_by_projet: Default::default(),
            },
            stats,
        };

        let texte = synthese.texte();
        assert!(texte.contains("NC maj 2 (67%)"));
        assert!(texte.contains("faible 1 (33%)"));
        assert!(texte.contains("NC min 0 (0%)"));
    }

    #[test]
    fn le_texte_des_stats_projet_couvre_les_trois_familles() {
        let mut stats = StatsProjet::default();
        stats.criticites.insert("critique".into(), 1);
        stats.criticites.insert("faible".into(), 3);
        stats.decisions.insert("reduire".into(), 2);

        let texte = stats.texte();
        assert!(texte.contains("décisions :"));
        assert!(texte.contains("1 (25%)"));
        assert!(texte.contains("3 (75%)"));
        assert!(texte.contains("2 (100%)"));
    }

    #[test]
    fn import_vers_le_cache_sans_configuration_echoue() {
        let (temp, mut context) = prepare_test_context();
        context.cache_db = None;
        let lot = temp.path().join("lot.json");
        fs::write(&lot, "{}").unwrap();
        let erreur = context
            .import(&ImportArgs {
                file: lot,
                cache: true,
            })
            .unwrap_err();
        assert!(matches!(erreur, AppError::MissingResource(_)));
    }
}
