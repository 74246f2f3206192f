//! Text report for a single run

use ruin_sim::{History, SimulationConfig, SimulationMetrics};

pub fn print_run(config: &SimulationConfig, history: &History) {
    let metrics = SimulationMetrics::from_history(history);

    println!("=======================================================");
    println!("  Ruin Simulation");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Exchanges:      {}", config.num_exchanges);
    println!(
        "  Traders:        {} x {} bets ({:.3} each)",
        config.num_traders,
        config.bets_per_trader,
        config.bet_size()
    );
    println!("  Steps:          {}", history.steps);
    match config.seed {
        Some(seed) => println!("  Seed:           {}", seed),
        None => println!("  Seed:           entropy"),
    }
    println!();

    println!("| Exchange |     z |     Risk |  Premium | Exploded at |");
    println!("|----------|-------|----------|----------|-------------|");
    for e in &history.exchanges {
        let death = e
            .death_step
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "| {:>8} | {:.3} | {:.6} | {:.6} | {:>11} |",
            e.id.to_string(),
            e.z,
            e.risk,
            e.premium,
            death
        );
    }
    println!();

    println!("| Trader | Allocation           | Final wealth |");
    println!("|--------|----------------------|--------------|");
    for t in &history.traders {
        let allocation = t
            .allocation
            .exchanges()
            .map(|(id, bets)| format!("{}x{}", id, bets))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "| {:>6} | {:20} | {:12.4} |",
            t.id.to_string(),
            allocation,
            t.final_wealth()
        );
    }
    println!();

    println!("Summary:");
    println!("  Explosions:            {}", metrics.explosions);
    println!("  Surviving exchanges:   {}", metrics.surviving_exchanges);
    println!("  Ruined traders:        {}", metrics.ruined_traders);
    println!("  Mean final wealth:     {:.4}", metrics.mean_final_wealth);
    println!(
        "  Min / max:             {:.4} / {:.4}",
        metrics.min_final_wealth, metrics.max_final_wealth
    );
    println!("  Mean excess return:    {:+.4}", metrics.mean_excess_return);
    if let Some(best) = SimulationMetrics::best_trader(history) {
        println!("  Best trader:           {}", best);
    }
}
