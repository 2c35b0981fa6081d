use itertools::{Itertools, MinMaxResult};
use num_format::{Locale, ToFormattedString};
use rayon::prelude::*;
use scheduler::utils::*;
use scheduler::{ScoringWeights, Zone, generate_schedule_with};
use std::collections::HashMap;

const SEEDS: u64 = 200;

struct RunResult {
    seed: u64,
    activities: usize,
    requested: usize,
    conflicts: usize,
    diversity: f64,
    zone_visits: HashMap<Zone, usize>,
    violations: Vec<Violation>,
    deterministic: bool,
}

struct Summary {
    label: &'static str,
    runs: Vec<RunResult>,
}

fn evaluate(label: &'static str, params: &ScenarioParams, weights: &ScoringWeights) -> Summary {
    let runs = (0..SEEDS)
        .into_par_iter()
        .filter_map(|seed| {
            let scenario = random_scenario(seed, params);
            let first = generate_schedule_with(&scenario.institutions, &scenario.classes, weights).ok()?;
            let second = generate_schedule_with(&scenario.institutions, &scenario.classes, weights).ok()?;
            let zones: HashMap<&str, Zone> = scenario
                .institutions
                .iter()
                .map(|institution| (institution.id.as_str(), Zone::of_address(&institution.address)))
                .collect();
            let zone_visits = first
                .assignments
                .iter()
                .filter_map(|assignment| zones.get(assignment.institution_id.as_str()).copied())
                .counts();

            Some(RunResult {
                seed,
                activities: first.assignments.len(),
                requested: scenario
                    .classes
                    .iter()
                    .map(|class| usize::from(class.activity_count))
                    .sum(),
                conflicts: first.conflicts.len(),
                diversity: first.stats.diversity_score,
                zone_visits,
                violations: verify_schedule(&scenario.institutions, &scenario.classes, &first),
                deterministic: first == second,
            })
        })
        .collect();

    Summary { label, runs }
}

fn print_summary(summary: &Summary) {
    let runs = &summary.runs;
    let placed: usize = runs.iter().map(|run| run.activities).sum();
    let requested: usize = runs.iter().map(|run| run.requested).sum();
    let conflicts: usize = runs.iter().map(|run| run.conflicts).sum();
    let avg_diversity = runs.iter().map(|run| run.diversity).sum::<f64>() / runs.len().max(1) as f64;

    println!("\n=== {} ({} runs) ===", summary.label, runs.len());
    println!(
        "Placed activities: {} of {}",
        placed.to_formatted_string(&Locale::en),
        requested.to_formatted_string(&Locale::en)
    );
    println!("Conflicts: {}", conflicts.to_formatted_string(&Locale::en));
    println!("Average diversity: {avg_diversity:.2}");

    match runs.iter().minmax_by(|a, b| a.diversity.total_cmp(&b.diversity)) {
        MinMaxResult::NoElements => {}
        MinMaxResult::OneElement(run) => println!("Diversity: {:.2} (seed {})", run.diversity, run.seed),
        MinMaxResult::MinMax(low, high) => {
            println!("Lowest diversity: {:.2} (seed {})", low.diversity, low.seed);
            println!("Highest diversity: {:.2} (seed {})", high.diversity, high.seed);
        }
    }

    let per_zone = Zone::ALL
        .iter()
        .map(|zone| {
            let visits: usize = runs.iter().filter_map(|run| run.zone_visits.get(zone)).sum();
            format!("{zone:?} {}", visits.to_formatted_string(&Locale::en))
        })
        .join(", ");
    println!("Visits per zone: {per_zone}");

    let unstable = runs.iter().filter(|run| !run.deterministic).map(|run| run.seed).collect_vec();
    if !unstable.is_empty() {
        println!("Non-deterministic seeds: {}", unstable.iter().join(", "));
    }

    let violations = runs
        .iter()
        .flat_map(|run| run.violations.iter().map(move |violation| (run.seed, violation)))
        .collect_vec();
    println!("Rule violations: {}", violations.len().to_formatted_string(&Locale::en));
    for (seed, violation) in violations.iter().take(10) {
        println!("  seed {seed}: {violation}");
    }
}

fn main() {
    let params = ScenarioParams::default();
    let crowded = ScenarioParams {
        classes: 120,
        max_capacity: 2,
        ..ScenarioParams::default()
    };

    let weights = ScoringWeights::default();
    let legacy = ScoringWeights::default().without_same_college_penalty();

    for summary in [
        evaluate("default weights", &params, &weights),
        evaluate("no same-college penalty", &params, &legacy),
        evaluate("crowded event", &crowded, &weights),
    ] {
        print_summary(&summary);
    }
}
