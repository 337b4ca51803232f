//! Scripted dashboard session.
//!
//! Walks through what a user does in the dashboard:
//! 1. Inspect the regression dataset (summary, correlations, distributions)
//! 2. Train the baseline model
//! 3. Tune hyperparameters twice in quick succession (one debounced retrain)
//! 4. Compare baseline and tuned metrics
//! 5. Simulate the forest on one prediction and explain it
//! 6. Switch to classification and train again
//!
//! Settings come from `forest_lab.toml` in the working directory when present,
//! otherwise from `FOREST_LAB_*` environment variables.

use anyhow::{Context, Result};
use forest_lab::config::ConfigManager;
use forest_lab::dashboard::TrainingStatus;
use forest_lab::prediction::PdpPoint;
use forest_lab::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::main]
async fn main() -> Result<()> {
    forest_lab::init()?;

    println!("=== Forest Lab Session Walkthrough ===\n");

    let manager = ConfigManager::discover(".").context("loading dashboard settings")?;
    println!("{}\n", manager.summary());
    let config = manager.into_config();
    let seed = config.random_seed.unwrap_or(7);

    let trainer = MockTrainer::from_config(&config).with_seed(seed);
    let controller = DashboardController::new(trainer, config)?;

    // Step 1: dataset overview
    println!("Step 1: Inspecting the {} dataset...", controller.task());
    let dataset = controller.dataset();
    let summary = controller.dataset_summary();
    println!("✓ {} rows, {} numeric features", summary.num_rows, summary.columns.len());
    for column in summary.columns.iter().take(3) {
        println!(
            "  {:<18} mean {:>10.2}  median {:>10.2}  sd {:>9.2}",
            column.name, column.mean, column.median, column.std_dev
        );
    }
    for pair in controller.correlations().strongest_pairs(3) {
        println!("  r({}, {}) = {:+.3}", pair.a, pair.b, pair.r);
    }
    let bins = controller.feature_histogram("sqft")?;
    let busiest = bins.iter().max_by_key(|b| b.count).context("empty histogram")?;
    println!("  Most common sqft range: {} ({} homes)", busiest.label, busiest.count);

    // Step 2: baseline
    println!("\nStep 2: Training baseline model...");
    controller.train_baseline().await?;
    report(&controller, RunKind::Baseline);

    // Step 3: two quick edits, one retrain
    println!("\nStep 3: Tuning hyperparameters...");
    controller.update_hyperparameters(|p| p.n_estimators = 200)?;
    controller.update_hyperparameters(|p| p.max_depth = Some(12))?;
    for advice in controller.hyperparameter_advice() {
        println!("  advice on {}: {:?}", advice.parameter(), advice);
    }
    if controller.flush_pending().await {
        println!("✓ Debounced retrain completed");
    }
    report(&controller, RunKind::Tuned);

    // Step 4: comparison
    println!("\nStep 4: Baseline vs tuned");
    let snapshot = controller.snapshot();
    match &snapshot.comparison {
        Some(deltas) => {
            for d in deltas {
                let mark = if d.improved { "better" } else { "worse" };
                println!(
                    "  {:<9} {:>8.3} -> {:>8.3} ({:+.3}, {})",
                    d.name, d.baseline, d.tuned, d.delta, mark
                );
            }
        }
        None => println!("  Tuned run unavailable, nothing to compare"),
    }

    let fit = controller.history_metrics(RunKind::Baseline)?;
    println!("  Baseline history fit: {:.3}", fit.primary_score());

    // Step 5: one prediction up close
    println!("\nStep 5: Explaining a prediction...");
    if let Some(output) = controller.slot(RunKind::Baseline).output {
        let instance = output.history.first().context("empty prediction history")?;
        let mut rng = StdRng::seed_from_u64(seed);
        let forest = simulate_forest(
            instance,
            &output.tree,
            controller.task(),
            MOCK_TREES_SHOWN,
            &mut rng,
        )?;
        println!(
            "✓ {} trees, forest value {:.2}",
            forest.num_trees(),
            forest.aggregate.value()
        );

        let insights = InsightService::new(TemplateInsightGenerator);
        println!("  {}", insights.importance_insights(&output.importances, &snapshot.target).await);
        let request = ExplanationRequest {
            task: controller.task(),
            target: snapshot.target.clone(),
            prediction: instance.clone(),
            importances: output.importances.clone(),
            aggregate: Some(forest.aggregate.clone()),
        };
        println!("  {}", insights.explain(&request).await);

        if let Some(top) = output.importances.first() {
            let curve: Vec<PdpPoint> = partial_dependence(&dataset, &top.feature, &snapshot.target, 5);
            for point in curve {
                println!("  PDP {} = {:>10.2} -> {:>10.2}", top.feature, point.value, point.outcome);
            }
        }
    }

    // Step 6: classification
    println!("\nStep 6: Switching to classification...");
    controller.set_task(TaskType::Classification)?;
    controller.train_baseline().await?;
    report(&controller, RunKind::Baseline);

    for note in controller.take_notifications() {
        println!("  [{:?}] {}", note.level, note.message);
    }

    println!("\n=== Session completed ===");
    Ok(())
}

fn report<T: ModelTrainer + 'static>(controller: &DashboardController<T>, kind: RunKind) {
    let slot = controller.slot(kind);
    match (&slot.status, &slot.output) {
        (TrainingStatus::Success, Some(output)) => {
            let metrics: Vec<String> = output
                .metrics
                .named_values()
                .iter()
                .map(|(name, value)| format!("{} {:.3}", name, value))
                .collect();
            println!("✓ {} model: {}", kind, metrics.join(", "));
            println!("  Top feature: {}", output.importances.first().map_or("-", |fi| fi.feature.as_str()));
            print!("{}", output.tree);
        }
        (status, _) => println!("✗ {} model: {}", kind, status),
    }
}
