use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use lottomax_analysis::patterns::PatternSummary;
use lottomax_analysis::{Recommendation, TrendAnalysis};
use lottomax_db::models::DrawRecord;

use crate::import::ImportResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Date", "Numéros", "Bonus", "Gros lot", "Identifiant"]);
    for draw in draws {
        let jackpot = if draw.jackpot_amount() > 0.0 {
            format!("{:.0} $", draw.jackpot_amount())
        } else {
            "—".to_string()
        };

        table.add_row(vec![
            &draw.date().to_string(),
            &format_numbers(draw.numbers()),
            &draw.bonus().to_string(),
            &jackpot,
            &draw.draw_id().to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_trends(trends: &TrendAnalysis) {
    println!(
        "\n📊 Fréquences sur {} tirages ({} → {})\n",
        trends.total_draws, trends.start_date, trends.end_date
    );
    println!(
        "Fréquence attendue : {:.2} | moyenne : {:.2} | écart type : {:.2} | min : {} | max : {}",
        trends.overall.expected_frequency,
        trends.overall.mean_frequency,
        trends.overall.std_deviation,
        trends.overall.min_frequency,
        trends.overall.max_frequency,
    );

    let mut table = new_table(vec![
        "Numéro",
        "Fréquence",
        "Part (%)",
        "Dernière sortie",
        "Écart moyen",
    ]);

    let mut stats: Vec<_> = trends.number_statistics.values().collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));

    for stat in stats {
        let color = if trends.hot_numbers.contains(&stat.number) {
            Color::Green
        } else if trends.cold_numbers.contains(&stat.number) {
            Color::Red
        } else {
            Color::White
        };

        let last_seen = stat
            .last_seen
            .map(|d| d.to_string())
            .unwrap_or_else(|| "jamais".to_string());
        let average_gap = stat
            .average_gap
            .map(|g| format!("{:.1}", g))
            .unwrap_or_else(|| "—".to_string());

        table.add_row(vec![
            Cell::new(format!("{:2}", stat.number)).fg(color),
            Cell::new(stat.count),
            Cell::new(format!("{:.2}", stat.percentage)),
            Cell::new(last_seen),
            Cell::new(average_gap),
        ]);
    }
    println!("{table}");

    println!("\nChauds  : {}", format_number_list(&trends.hot_numbers));
    println!("Froids  : {}", format_number_list(&trends.cold_numbers));
}

fn format_number_list(numbers: &[u8]) -> String {
    if numbers.is_empty() {
        return "aucun".to_string();
    }
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn display_summary(summary: &PatternSummary) {
    println!("\n🔍 Motifs sur {} tirages\n", summary.total_draws);

    println!("── Suites consécutives ──");
    if summary.consecutive_patterns.is_empty() {
        println!("Aucune suite détectée.");
    } else {
        let mut table = new_table(vec!["Motif", "Occurrences", "Saillance", "Exemples"]);
        for pattern in &summary.consecutive_patterns {
            let examples = pattern
                .examples
                .iter()
                .map(|e| format_numbers(e))
                .collect::<Vec<_>>()
                .join(" | ");
            table.add_row(vec![
                &pattern.description,
                &pattern.frequency.to_string(),
                &format!("{:.2}", pattern.significance),
                &examples,
            ]);
        }
        println!("{table}");
    }

    println!("\n── Répartition pair/impair ──");
    let mut table = new_table(vec!["Impairs-Pairs", "Tirages", "Part (%)"]);
    for (label, &count) in &summary.odd_even.pattern_distribution {
        let pct = summary.odd_even.pattern_percentages.get(label).copied().unwrap_or(0.0);
        table.add_row(vec![label, &count.to_string(), &format!("{:.1}", pct)]);
    }
    println!("{table}");
    println!(
        "Répartition la plus courante : {} ({} tirages)",
        summary.odd_even.most_common_pattern.0, summary.odd_even.most_common_pattern.1
    );

    println!("\n── Tranches ──");
    let mut table = new_table(vec!["Tranche", "Total", "Part (%)", "Moy./tirage", "Max/tirage"]);
    for bucket in &summary.ranges.buckets {
        table.add_row(vec![
            &bucket.label.to_string(),
            &bucket.total.to_string(),
            &format!("{:.1}", bucket.percentage),
            &format!("{:.2}", bucket.average_per_draw),
            &bucket.max_per_draw.to_string(),
        ]);
    }
    println!("{table}");
    println!("Score d'équilibre : {:.1}/100", summary.ranges.balance_score);

    println!(
        "\nSommes : moyenne {:.1}, min {}, max {}, écart type {:.1}",
        summary.sums.average, summary.sums.min, summary.sums.max, summary.sums.std_deviation
    );
    println!(
        "Écarts : moyenne {:.1}, min {}, max {}, écart type {:.1}",
        summary.gaps.average, summary.gaps.min, summary.gaps.max, summary.gaps.std_deviation
    );
    println!(
        "Répétitions du tirage précédent : moyenne {:.1}, max {}",
        summary.repeats.average_repeats, summary.repeats.max_repeats
    );

    println!("\nScore composite : {:.1}/100 (indicateur heuristique)", summary.pattern_score);
}

pub fn display_recommendation(recommendation: &Recommendation) {
    println!("\n🎲 Grille suggérée (stratégie : {})\n", recommendation.strategy);

    let mut table = new_table(vec!["Numéros", "Confiance"]);
    table.add_row(vec![
        &format_numbers(&recommendation.numbers),
        &format!("{:.0} %", recommendation.confidence * 100.0),
    ]);
    println!("{table}");

    println!("{}", recommendation.rationale);
    println!("\nRappel : chaque tirage est indépendant ; aucune grille n'est plus probable qu'une autre.");
}
