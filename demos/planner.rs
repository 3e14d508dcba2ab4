//  PLANNER.rs
//    by Lut99
//
//  Created:
//    18 Feb 2025, 15:40:11
//  Last edited:
//    21 Feb 2025, 11:36:52
//  Auto updated?
//    Yes
//
//  Description:
//!   Plans a drone-delivery run from the command line.
//

use std::time::Duration;

use clap::{Parser, ValueEnum};
use console::style;
use error_trace::toplevel;
use humanlog::{DebugMode, HumanLogger};
use log::{debug, error, info};
use strips::action::{ActionSet, Cost};
use strips::drone::DroneDomain;
use strips::search::audit::{cross_check, replay};
use strips::search::{FrontierPolicy, Limits, Planner, SearchResult, Strategy, Termination};
use strips::state::State;


/***** ARGUMENTS *****/
/// The search drivers that can be chosen.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Breadth-first search; finds the plan with the fewest actions.
    Bfs,
    /// A* search with the delivery heuristic; finds the plan that uses the least battery.
    Astar,
}

/// Defines arguments to the planner.
#[derive(Debug, Parser)]
pub struct Arguments {
    /// If given, enables more verbose logging.
    #[clap(long, global = true)]
    debug: bool,

    /// The search driver to run.
    #[clap(short, long, value_enum, default_value = "astar")]
    strategy: StrategyArg,
    /// If given, BFS does not queue states that are already queued.
    #[clap(long)]
    dedup_frontier: bool,

    /// The battery level of a fully charged drone.
    #[clap(short, long, default_value = "10")]
    capacity: Cost,
    /// The battery cost of a flight between the base and the pickup point.
    #[clap(short, long, default_value = "2")]
    base_pickup_cost: Cost,
    /// A target to deliver to, as `ID=COST`. Can be repeated. If omitted, uses targets c1 to c5.
    #[clap(short, long = "target", value_parser = parse_target)]
    targets: Vec<(String, Cost)>,

    /// If given, stops after expanding this many states.
    #[clap(long)]
    max_explored: Option<usize>,
    /// If given, stops after this many milliseconds.
    #[clap(long)]
    timeout_ms: Option<u64>,

    /// If given, also runs uninformed A* and checks that the delivery heuristic didn't lead the search astray.
    #[clap(long)]
    check: bool,
    /// If given, shows the state after every step of the plan.
    #[clap(long)]
    trace: bool,
}

/// Parses a `--target`.
fn parse_target(raw: &str) -> Result<(String, Cost), String> {
    let (id, cost) = raw.split_once('=').ok_or_else(|| format!("Expected ID=COST, got {raw:?}"))?;
    let cost: Cost = cost.trim().parse().map_err(|err| format!("Invalid cost {cost:?} for target {id:?}: {err}"))?;
    Ok((id.trim().to_string(), cost))
}





/***** HELPERS *****/
/// Prints the result of a search, optionally with the states a found plan passes through.
fn print_result(res: &SearchResult, trace: Option<&[State]>) {
    println!("\n{}", style("===== RESULT =====").bold());
    match &res.plan {
        Some(plan) => {
            println!("{}\n", style("Plan found!").green().bold());
            match trace {
                Some(trace) => {
                    println!("   {}", style(&trace[0]).dim());
                    for (i, (step, state)) in plan.iter().zip(&trace[1..]).enumerate() {
                        println!("{}. {step}", i + 1);
                        println!("   {}", style(state).dim());
                    }
                },
                None => print!("{plan}"),
            }
            println!("\nPlan length: {}", plan.len());
            println!("Plan cost: {}", plan.cost());
        },
        None => {
            if let Termination::Cutoff(cutoff) = res.termination {
                println!("{}", style(format!("Search stopped early: {cutoff}")).yellow());
            }
            println!("{}", style("No plan found.").red().bold());
        },
    }
    println!("States explored: {}", res.explored);
}





/***** ENTRYPOINT *****/
fn main() {
    // Parse the CLI arguments
    let args = Arguments::parse();

    // Setup the logger
    if let Err(err) = HumanLogger::terminal(if args.debug { DebugMode::Full } else { DebugMode::HumanFriendly }).init() {
        eprintln!("WARNING: Failed to setup logger: {err} (no logging for this session)");
    }
    info!("strips {} - v{}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));

    // Build the problem
    let mut domain = DroneDomain::default().capacity(args.capacity).base_pickup_cost(args.base_pickup_cost);
    if !args.targets.is_empty() {
        domain = domain.targets(args.targets);
    }
    debug!("Grounding {domain}...");
    let actions: ActionSet = match domain.ground_actions() {
        Ok(actions) => actions,
        Err(err) => {
            error!("{}", toplevel!(("Failed to ground {}", domain), err));
            std::process::exit(1);
        },
    };
    let initial = domain.initial_state();
    let goal = domain.goal();
    let heuristic = domain.heuristic(&goal);

    // Plan
    let strategy: Strategy = match args.strategy {
        StrategyArg::Bfs if args.dedup_frontier => Strategy::Bfs(FrontierPolicy::FrontierAndExplored),
        StrategyArg::Bfs => Strategy::Bfs(FrontierPolicy::ExploredOnly),
        StrategyArg::Astar => Strategy::AStar,
    };
    let mut limits = Limits::none();
    if let Some(max) = args.max_explored {
        limits = limits.max_explored(max);
    }
    if let Some(ms) = args.timeout_ms {
        limits = limits.time_budget(Duration::from_millis(ms));
    }
    info!("Planning with {strategy} over {} action(s)...", actions.len());
    let res: SearchResult = Planner::new(&actions).strategy(strategy).limits(limits).run_with(&initial, &goal, &heuristic);
    debug!("Search {} ({} state(s) generated)", res.termination, res.generated);

    // Replay the plan if the user wants to see it
    let trace: Option<Vec<State>> = match (&res.plan, args.trace) {
        (Some(plan), true) => match replay(&actions, &initial, plan) {
            Ok(trace) => Some(trace),
            Err(err) => {
                error!("{}", toplevel!(("Failed to replay plan of {} step(s)", plan.len()), err));
                std::process::exit(1);
            },
        },
        _ => None,
    };
    print_result(&res, trace.as_deref());

    // Check the heuristic if asked
    if args.check {
        info!("Cross-checking the delivery heuristic...");
        match cross_check(&actions, &initial, &goal, &heuristic, &limits) {
            Ok(check) => println!(
                "\n{} informed A* explored {} state(s), uninformed A* explored {}",
                style("Check passed:").green().bold(),
                check.explored,
                check.baseline_explored
            ),
            Err(err) => {
                error!("{}", toplevel!(("Cross-check of the delivery heuristic failed for {}", domain), err));
                std::process::exit(1);
            },
        }
    }
}
