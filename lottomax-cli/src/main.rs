mod display;
mod import;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use lottomax_analysis::{
    AnalysisConfig, FrequencyAnalyzer, PatternAnalyzer, RecommendationEngine, Strategy,
};
use lottomax_db::db::{default_db_path, DrawStore};
use lottomax_db::models::DrawRecord;

use crate::display::{
    display_draws, display_import_summary, display_recommendation, display_summary,
    display_trends,
};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StrategyArg {
    Hot,
    Cold,
    #[default]
    Balanced,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Hot => Strategy::Hot,
            StrategyArg::Cold => Strategy::Cold,
            StrategyArg::Balanced => Strategy::Balanced,
        }
    }
}

#[derive(Parser)]
#[command(name = "lottomax", about = "Analyseur de tirages Lotto Max")]
struct Cli {
    /// Chemin de la base de données (défaut : ./data/lottomax.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Ajouter un tirage manuellement
    Add,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Afficher les statistiques de fréquences
    Stats {
        /// Date de début (AAAA-MM-JJ)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Date de fin (AAAA-MM-JJ)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Afficher la synthèse des motifs
    Patterns {
        /// Date de début (AAAA-MM-JJ)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Date de fin (AAAA-MM-JJ)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Suggérer une grille
    Recommend {
        /// Stratégie de sélection
        #[arg(short, long, default_value = "balanced")]
        strategy: StrategyArg,

        /// Date de début (AAAA-MM-JJ)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Date de fin (AAAA-MM-JJ)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Supprimer un tirage par identifiant
    Delete { draw_id: String },

    /// Afficher le nombre de tirages en base
    Count,

    /// Afficher le chemin de la base de données
    DbPath,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(default_db_path);
    let store = DrawStore::open(&path)?;

    match cli.command {
        Command::Import { file } => cmd_import(&store, &file),
        Command::Add => cmd_add(&store),
        Command::List { last } => cmd_list(&store, last),
        Command::Stats { from, to } => cmd_stats(&store, from, to),
        Command::Patterns { from, to } => cmd_patterns(&store, from, to),
        Command::Recommend { strategy, from, to } => {
            cmd_recommend(&store, strategy.into(), from, to)
        }
        Command::Delete { draw_id } => cmd_delete(&store, &draw_id),
        Command::Count => {
            println!("{} tirages en base", store.count()?);
            Ok(())
        }
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn cmd_import(store: &DrawStore, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(store, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(store: &DrawStore, last: usize) -> Result<()> {
    let mut draws = store.load(None, None)?;
    if draws.is_empty() {
        println!("Base vide. Lancez d'abord : lottomax import");
        return Ok(());
    }
    draws.truncate(last);
    display_draws(&draws);
    Ok(())
}

fn load_window(
    store: &DrawStore,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<DrawRecord>> {
    let draws = store.load(from, to)?;
    if draws.is_empty() {
        bail!("aucun tirage dans la fenêtre demandée");
    }
    Ok(draws)
}

fn cmd_stats(store: &DrawStore, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    let draws = load_window(store, from, to)?;
    let analyzer = FrequencyAnalyzer::new(AnalysisConfig::default());
    let trends = analyzer.analyze_trends(&draws)?;
    display_trends(&trends);
    Ok(())
}

fn cmd_patterns(store: &DrawStore, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    let draws = load_window(store, from, to)?;
    let analyzer = PatternAnalyzer::new(AnalysisConfig::default());
    let summary = analyzer.pattern_summary(&draws)?;
    display_summary(&summary);
    Ok(())
}

fn cmd_recommend(
    store: &DrawStore,
    strategy: Strategy,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let draws = load_window(store, from, to)?;
    let engine = RecommendationEngine::new(AnalysisConfig::default());
    let recommendation = engine.recommend(&draws, strategy)?;
    display_recommendation(&recommendation);
    Ok(())
}

fn cmd_delete(store: &DrawStore, draw_id: &str) -> Result<()> {
    if store.delete(draw_id)? {
        println!("Tirage {} supprimé.", draw_id);
    } else {
        println!("Tirage {} introuvable.", draw_id);
    }
    Ok(())
}

fn cmd_add(store: &DrawStore) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let draw_id = prompt("Identifiant du tirage (ex: 2024-03-12) : ")?;
    let raw_date = prompt("Date (AAAA-MM-JJ) : ")?;
    let date: NaiveDate = raw_date
        .parse()
        .with_context(|| format!("date invalide : '{}'", raw_date))?;

    let numbers = prompt_numbers()?;
    let bonus = prompt_bonus(&numbers)?;

    let raw_jackpot = prompt("Gros lot (en dollars, 0 si inconnu) : ")?;
    let jackpot: f64 = if raw_jackpot.is_empty() {
        0.0
    } else {
        raw_jackpot
            .parse()
            .with_context(|| format!("montant invalide : '{}'", raw_jackpot))?
    };

    let draw = DrawRecord::new(date, &numbers, bonus, jackpot, draw_id)?;

    println!("\nTirage à insérer :");
    display_draws(std::slice::from_ref(&draw));

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let inserted = store.save(std::slice::from_ref(&draw))?;
        if inserted > 0 {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers() -> Result<[u8; 7]> {
    loop {
        let input = prompt("7 numéros (séparés par des espaces, 1-50) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 7 => {
                let mut arr = [0u8; 7];
                arr.copy_from_slice(&v);
                if arr.iter().all(|&n| (1..=50).contains(&n))
                    && (1..arr.len()).all(|i| !arr[..i].contains(&arr[i]))
                {
                    return Ok(arr);
                }
                println!("Numéros invalides (1-50, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 7 numéros. Réessayez."),
        }
    }
}

fn prompt_bonus(numbers: &[u8; 7]) -> Result<u8> {
    loop {
        let input = prompt("Numéro bonus (1-50, hors des 7 numéros) : ")?;
        match input.parse::<u8>() {
            Ok(b) if (1..=50).contains(&b) && !numbers.contains(&b) => return Ok(b),
            _ => println!("Bonus invalide. Réessayez."),
        }
    }
}
