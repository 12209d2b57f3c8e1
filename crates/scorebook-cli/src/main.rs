//! Scorebook CLI
//!
//! The `scorebook` command scores cricket matches ball by ball and manages
//! custom scorecards.
//!
//! ## Commands
//!
//! - `match`: create matches, add players and bowlers, record deliveries
//! - `scorecard`: create, fill in, share and delete scorecards
//!
//! Matches are kept as JSON files under `<data-dir>/matches` and expire a
//! day after creation. Scorecards live in a SurrealDB database, by default
//! the embedded one under `<data-dir>/db`.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

use scorebook_core::{
    current_batsman, innings_complete, BowlerId, Delivery, DeliveryOutcome, Match, MatchBook,
    MatchBookConfig, MatchId, MatchSetup, MatchType, NewScorecard, PlayerId, Scorecard,
    ScorecardId, ScorecardKind, ScorecardService, Team, TeamSide, UserId, METRICS,
};
use scorebook_state::{
    FsMatchStore, MatchStore, ScorecardStore, SurrealHandle, SurrealScorecardStore,
};

#[derive(Parser)]
#[command(name = "scorebook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cricket match scoring and custom scorecards", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding match files and the local database
    #[arg(long, global = true, env = "SCOREBOOK_DATA_DIR", default_value = ".scorebook")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score cricket matches
    Match {
        #[command(subcommand)]
        action: MatchAction,
    },

    /// Manage custom scorecards
    Scorecard {
        #[command(subcommand)]
        action: ScorecardAction,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum MatchAction {
    /// Start a new match
    New {
        /// Name of the team batting first
        #[arg(long)]
        team_a: String,

        /// Name of the team batting second
        #[arg(long)]
        team_b: String,

        /// Format: T20, ODI, Test or Custom
        #[arg(long = "type")]
        match_type: Option<MatchType>,

        /// Overs per innings (defaults from the format)
        #[arg(long)]
        overs: Option<u32>,

        #[arg(long)]
        venue: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List live matches, newest first
    List {
        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show a match scorecard
    Show {
        id: String,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Delete a match
    Delete { id: String },

    /// Remove expired and unreadable matches
    Sweep,

    /// Add a batsman to a team
    AddPlayer {
        id: String,

        /// Team: a or b
        #[arg(long)]
        team: TeamSide,

        name: String,
    },

    /// Add a bowler to a team
    AddBowler {
        id: String,

        /// Team: a or b
        #[arg(long)]
        team: TeamSide,

        name: String,
    },

    /// Record one delivery
    Ball {
        id: String,

        /// Batsman on strike (id or name)
        #[arg(long)]
        batsman: String,

        /// Batting team (default: the side batting in the current innings)
        #[arg(long)]
        team: Option<TeamSide>,

        #[arg(long, default_value_t = 0)]
        runs: u32,

        /// Wide, no-ball, bye or leg-bye
        #[arg(long)]
        extra: bool,

        /// The batsman is out
        #[arg(long)]
        wicket: bool,

        /// Bowler to charge the delivery to (id or name)
        #[arg(long)]
        bowler: Option<String>,
    },

    /// Toggle between the first and second innings
    SwitchInnings { id: String },
}

#[derive(Subcommand)]
enum ScorecardAction {
    /// Create a scorecard from a template
    Create {
        #[arg(long, env = "SCOREBOOK_USER")]
        owner: String,

        #[arg(long)]
        title: String,

        /// Template: Cricket, Football or Custom
        #[arg(long, default_value = "Cricket")]
        kind: ScorecardKind,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// List your scorecards, newest first
    List {
        #[arg(long, env = "SCOREBOOK_USER")]
        owner: String,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show a scorecard
    Show {
        id: String,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show a public scorecard by share token
    Shared {
        token: String,

        #[arg(long, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Fill in values: `field=value`, field by id or name
    Set {
        id: String,

        #[arg(long, env = "SCOREBOOK_USER")]
        owner: String,

        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Make a scorecard public and print its share token
    Share {
        id: String,

        #[arg(long, env = "SCOREBOOK_USER")]
        owner: String,
    },

    /// Delete a scorecard
    Delete {
        id: String,

        #[arg(long, env = "SCOREBOOK_USER")]
        owner: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    scorebook_core::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Match { action } => {
            let config = MatchBookConfig::from_env().map_err(|e| anyhow!(e))?;
            let store = FsMatchStore::new(&cli.data_dir).with_context(|| {
                format!("Failed to open match store in {}", cli.data_dir.display())
            })?;
            run_match(&MatchBook::with_config(store, config), action).await
        }
        Commands::Scorecard { action } => {
            let handle = SurrealHandle::setup_from_env(cli.data_dir.join("db"))
                .await
                .context("Failed to connect to Scorebook database")?;
            let service = ScorecardService::new(SurrealScorecardStore::new(Arc::new(handle)));
            run_scorecard(&service, action).await
        }
    };

    if cli.verbose {
        METRICS.flush();
    }
    result
}

async fn run_match<S: MatchStore>(book: &MatchBook<S>, action: MatchAction) -> Result<()> {
    match action {
        MatchAction::New {
            team_a,
            team_b,
            match_type,
            overs,
            venue,
            date,
            output,
        } => {
            let setup = MatchSetup {
                team_a,
                team_b,
                date,
                venue,
                match_type,
                overs_per_innings: overs,
            };
            cmd_match_new(book, setup, output).await.map(|_| ())
        }
        MatchAction::List { output } => cmd_match_list(book, output).await,
        MatchAction::Show { id, output } => cmd_match_show(book, &id, output).await,
        MatchAction::Delete { id } => cmd_match_delete(book, &id).await,
        MatchAction::Sweep => cmd_match_sweep(book).await,
        MatchAction::AddPlayer { id, team, name } => {
            cmd_add_player(book, &id, team, &name).await.map(|_| ())
        }
        MatchAction::AddBowler { id, team, name } => {
            cmd_add_bowler(book, &id, team, &name).await.map(|_| ())
        }
        MatchAction::Ball {
            id,
            batsman,
            team,
            runs,
            extra,
            wicket,
            bowler,
        } => {
            let delivery = Delivery {
                runs,
                is_extra: extra,
                is_wicket: wicket,
            };
            cmd_ball(book, &id, &batsman, team, bowler.as_deref(), delivery)
                .await
                .map(|_| ())
        }
        MatchAction::SwitchInnings { id } => cmd_switch_innings(book, &id).await,
    }
}

async fn run_scorecard<S: ScorecardStore>(
    service: &ScorecardService<S>,
    action: ScorecardAction,
) -> Result<()> {
    match action {
        ScorecardAction::Create {
            owner,
            title,
            kind,
            description,
            output,
        } => {
            let mut input = NewScorecard::from_template(title, kind);
            input.description = description;
            cmd_scorecard_create(service, &UserId::new(owner), input, output)
                .await
                .map(|_| ())
        }
        ScorecardAction::List { owner, output } => {
            cmd_scorecard_list(service, &UserId::new(owner), output).await
        }
        ScorecardAction::Show { id, output } => cmd_scorecard_show(service, &id, output).await,
        ScorecardAction::Shared { token, output } => {
            cmd_scorecard_shared(service, &token, output).await
        }
        ScorecardAction::Set { id, owner, entries } => {
            cmd_scorecard_set(service, &id, &UserId::new(owner), &entries)
                .await
                .map(|_| ())
        }
        ScorecardAction::Share { id, owner } => {
            cmd_scorecard_share(service, &id, &UserId::new(owner))
                .await
                .map(|_| ())
        }
        ScorecardAction::Delete { id, owner } => {
            cmd_scorecard_delete(service, &id, &UserId::new(owner)).await
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// match commands
// ---------------------------------------------------------------------------

async fn load_match<S: MatchStore>(book: &MatchBook<S>, id: &str) -> Result<Match> {
    book.load(&MatchId::from(id))
        .await
        .with_context(|| format!("Failed to load match '{}'", id))
}

/// Create a match and print its scorecard
async fn cmd_match_new<S: MatchStore>(
    book: &MatchBook<S>,
    setup: MatchSetup,
    output: OutputFormat,
) -> Result<Match> {
    let m = book.create(setup).await.context("Failed to create match")?;

    match output {
        OutputFormat::Json => print_json(&m)?,
        OutputFormat::Text => {
            println!("Created match {}", m.id);
            println!("{}", render_match(&m));
        }
    }
    Ok(m)
}

async fn cmd_match_list<S: MatchStore>(book: &MatchBook<S>, output: OutputFormat) -> Result<()> {
    let matches = book.list().await.context("Failed to list matches")?;

    if output == OutputFormat::Json {
        return print_json(&matches);
    }
    if matches.is_empty() {
        println!("No matches found. Start one with 'scorebook match new'.");
        return Ok(());
    }
    for m in matches {
        println!(
            "{}  {}  {} | {}  (innings {})",
            m.id,
            m.title(),
            m.team_a.scoreline(),
            m.team_b.scoreline(),
            m.current_innings.number()
        );
    }
    Ok(())
}

async fn cmd_match_show<S: MatchStore>(
    book: &MatchBook<S>,
    id: &str,
    output: OutputFormat,
) -> Result<()> {
    let m = load_match(book, id).await?;
    match output {
        OutputFormat::Json => print_json(&m),
        OutputFormat::Text => {
            println!("{}", render_match(&m));
            Ok(())
        }
    }
}

async fn cmd_match_delete<S: MatchStore>(book: &MatchBook<S>, id: &str) -> Result<()> {
    book.delete(&MatchId::from(id))
        .await
        .with_context(|| format!("Failed to delete match '{}'", id))?;
    println!("Deleted match {}", id);
    Ok(())
}

async fn cmd_match_sweep<S: MatchStore>(book: &MatchBook<S>) -> Result<()> {
    let report = book.sweep_expired().await.context("Sweep failed")?;
    println!(
        "Removed {} expired and {} unreadable matches; {} remaining",
        report.removed, report.corrupt, report.remaining
    );
    Ok(())
}

async fn cmd_add_player<S: MatchStore>(
    book: &MatchBook<S>,
    id: &str,
    side: TeamSide,
    name: &str,
) -> Result<PlayerId> {
    let mut m = load_match(book, id).await?;
    let player = book.add_player(&mut m, side, name).await?;
    println!("Added {} to {} [{}]", name.trim(), m.team(side).name, player);
    Ok(player)
}

async fn cmd_add_bowler<S: MatchStore>(
    book: &MatchBook<S>,
    id: &str,
    side: TeamSide,
    name: &str,
) -> Result<BowlerId> {
    let mut m = load_match(book, id).await?;
    let bowler = book.add_bowler(&mut m, side, name).await?;
    println!("Added bowler {} to {} [{}]", name.trim(), m.team(side).name, bowler);
    Ok(bowler)
}

/// Resolve a batsman given by id, or by name ignoring case.
///
/// Unknown keys fall through as ids so the engine treats them as a no-op.
fn resolve_player(team: &Team, key: &str) -> PlayerId {
    team.players
        .iter()
        .find(|p| p.id.as_str() == key)
        .or_else(|| team.players.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
        .map(|p| p.id.clone())
        .unwrap_or_else(|| PlayerId::from(key))
}

fn resolve_bowler(team: &Team, key: &str) -> BowlerId {
    team.bowlers
        .iter()
        .find(|b| b.id.as_str() == key)
        .or_else(|| team.bowlers.iter().find(|b| b.name.eq_ignore_ascii_case(key)))
        .map(|b| b.id.clone())
        .unwrap_or_else(|| BowlerId::from(key))
}

/// Record one delivery and print the batting team's total
async fn cmd_ball<S: MatchStore>(
    book: &MatchBook<S>,
    id: &str,
    batsman: &str,
    team: Option<TeamSide>,
    bowler: Option<&str>,
    delivery: Delivery,
) -> Result<DeliveryOutcome> {
    let mut m = load_match(book, id).await?;
    let side = team.unwrap_or_else(|| m.batting_side());
    let batsman_id = resolve_player(m.team(side), batsman);
    let bowler_id = bowler.map(|b| resolve_bowler(m.team(side.opponent()), b));

    let outcome = book
        .apply_delivery_with_bowler(&mut m, side, &batsman_id, bowler_id.as_ref(), delivery)
        .await
        .context("Failed to record delivery")?;

    let batting = m.team(side);
    if !outcome.applied {
        println!(
            "No batsman '{}' in {}; nothing recorded",
            batsman, batting.name
        );
        return Ok(outcome);
    }

    println!("{} {}", batting.name, batting.scoreline());
    match outcome
        .next_batsman
        .as_ref()
        .and_then(|next| batting.player(next))
    {
        Some(next) => println!("On strike: {} {} ({})", next.name, next.runs, next.balls),
        None => println!("No batsman left"),
    }
    if innings_complete(&m, side) {
        info!(match_id = %m.id, "innings complete");
        println!("Innings complete; run 'scorebook match switch-innings {}'", m.id);
    }
    Ok(outcome)
}

async fn cmd_switch_innings<S: MatchStore>(book: &MatchBook<S>, id: &str) -> Result<()> {
    let mut m = load_match(book, id).await?;
    book.switch_innings(&mut m).await?;

    let batting = m.team(m.batting_side());
    println!(
        "Innings {}: {} batting",
        m.current_innings.number(),
        batting.name
    );
    if let Some(p) = current_batsman(batting) {
        println!("On strike: {}", p.name);
    }
    Ok(())
}

fn render_team(team: &Team, out: &mut Vec<String>) {
    out.push(format!("{}  {}", team.name, team.scoreline()));
    for p in &team.players {
        let sr = p
            .strike_rate()
            .map(|sr| format!("{:.2}", sr))
            .unwrap_or_else(|| "-".to_string());
        out.push(format!(
            "  {:<20} {:>4} ({:>3})  4s {:<2} 6s {:<2} SR {:>6}{}  [{}]",
            p.name,
            p.runs,
            p.balls,
            p.fours,
            p.sixes,
            sr,
            if p.is_out { "  out" } else { "" },
            p.id
        ));
    }
    for b in &team.bowlers {
        let econ = b
            .economy()
            .map(|e| format!("{:.2}", e))
            .unwrap_or_else(|| "-".to_string());
        out.push(format!(
            "  bowling: {:<15} {:.1}-{}-{}  econ {}  [{}]",
            b.name, b.overs, b.runs_conceded, b.wickets, econ, b.id
        ));
    }
}

fn render_match(m: &Match) -> String {
    let mut out = vec![m.title()];

    let mut meta = Vec::new();
    if let Some(t) = m.match_type {
        meta.push(t.to_string());
    }
    if let Some(overs) = m.overs_per_innings {
        meta.push(format!("{} overs", overs));
    }
    if let Some(venue) = &m.venue {
        meta.push(venue.clone());
    }
    if let Some(date) = &m.date {
        meta.push(date.clone());
    }
    if !meta.is_empty() {
        out.push(meta.join(" | "));
    }
    out.push(format!(
        "Innings {} ({} batting)",
        m.current_innings.number(),
        m.team(m.batting_side()).name
    ));

    render_team(&m.team_a, &mut out);
    render_team(&m.team_b, &mut out);
    out.join("\n")
}

// ---------------------------------------------------------------------------
// scorecard commands
// ---------------------------------------------------------------------------

fn render_scorecard(card: &Scorecard) -> String {
    let mut out = vec![format!("{}  [{}]  ({})", card.title, card.kind, card.id)];
    if let Some(d) = &card.description {
        out.push(d.clone());
    }
    let visibility = match (&card.share_token, card.is_public) {
        (Some(token), true) => format!("public, share token {}", token),
        (_, true) => "public".to_string(),
        _ => "private".to_string(),
    };
    out.push(format!("owner {}, {}", card.created_by, visibility));

    let mut fields: Vec<_> = card.fields.iter().collect();
    fields.sort_by_key(|f| f.order);
    for f in fields {
        let value = card
            .value_of(&f.id)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let marker = if f.required { "*" } else { "" };
        out.push(format!("  {}{}: {}", f.name, marker, value));
    }
    out.join("\n")
}

async fn cmd_scorecard_create<S: ScorecardStore>(
    service: &ScorecardService<S>,
    owner: &UserId,
    input: NewScorecard,
    output: OutputFormat,
) -> Result<Scorecard> {
    let card = service
        .create(owner, input)
        .await
        .context("Failed to create scorecard")?;
    match output {
        OutputFormat::Json => print_json(&card)?,
        OutputFormat::Text => {
            println!("Created scorecard {}", card.id);
            println!("{}", render_scorecard(&card));
        }
    }
    Ok(card)
}

async fn cmd_scorecard_list<S: ScorecardStore>(
    service: &ScorecardService<S>,
    owner: &UserId,
    output: OutputFormat,
) -> Result<()> {
    let cards = service.list(owner).await?;
    if output == OutputFormat::Json {
        return print_json(&cards);
    }
    if cards.is_empty() {
        println!("No scorecards for {}", owner);
        return Ok(());
    }
    for card in cards {
        println!(
            "{}  {}  [{}]{}",
            card.id,
            card.title,
            card.kind,
            if card.is_public { "  public" } else { "" }
        );
    }
    Ok(())
}

async fn cmd_scorecard_show<S: ScorecardStore>(
    service: &ScorecardService<S>,
    id: &str,
    output: OutputFormat,
) -> Result<()> {
    let card = service
        .get(&ScorecardId(id.to_string()))
        .await
        .with_context(|| format!("Failed to load scorecard '{}'", id))?;
    match output {
        OutputFormat::Json => print_json(&card),
        OutputFormat::Text => {
            println!("{}", render_scorecard(&card));
            Ok(())
        }
    }
}

async fn cmd_scorecard_shared<S: ScorecardStore>(
    service: &ScorecardService<S>,
    token: &str,
    output: OutputFormat,
) -> Result<()> {
    let card = service.get_shared(token).await?;
    match output {
        OutputFormat::Json => print_json(&card),
        OutputFormat::Text => {
            println!("{}", render_scorecard(&card));
            Ok(())
        }
    }
}

/// Split a `field=value` argument.
fn parse_entry(entry: &str) -> Result<(String, String)> {
    let Some((field, value)) = entry.split_once('=') else {
        bail!("expected field=value, got '{}'", entry);
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("missing field name in '{}'", entry);
    }
    Ok((field.to_string(), value.to_string()))
}

async fn cmd_scorecard_set<S: ScorecardStore>(
    service: &ScorecardService<S>,
    id: &str,
    owner: &UserId,
    entries: &[String],
) -> Result<Scorecard> {
    let pairs = entries
        .iter()
        .map(|e| parse_entry(e))
        .collect::<Result<Vec<_>>>()?;
    let card = service
        .set_values(owner, &ScorecardId(id.to_string()), &pairs)
        .await
        .with_context(|| format!("Failed to update scorecard '{}'", id))?;
    println!("{}", render_scorecard(&card));
    Ok(card)
}

async fn cmd_scorecard_share<S: ScorecardStore>(
    service: &ScorecardService<S>,
    id: &str,
    owner: &UserId,
) -> Result<String> {
    let token = service
        .share(owner, &ScorecardId(id.to_string()))
        .await
        .with_context(|| format!("Failed to share scorecard '{}'", id))?;
    println!("Shared. View with: scorebook scorecard shared {}", token);
    Ok(token)
}

async fn cmd_scorecard_delete<S: ScorecardStore>(
    service: &ScorecardService<S>,
    id: &str,
    owner: &UserId,
) -> Result<()> {
    service
        .delete(owner, &ScorecardId(id.to_string()))
        .await
        .with_context(|| format!("Failed to delete scorecard '{}'", id))?;
    println!("Deleted scorecard {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use scorebook_core::ScoreError;
    use scorebook_state::fakes::{MemoryMatchStore, MemoryScorecardStore};

    fn setup() -> MatchSetup {
        MatchSetup {
            team_a: "Lions".to_string(),
            team_b: "Tigers".to_string(),
            match_type: Some(MatchType::T20),
            ..Default::default()
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ball_command() {
        let cli = Cli::try_parse_from([
            "scorebook", "match", "ball", "m-1", "--batsman", "Opener", "--runs", "4", "--wicket",
            "--team", "B",
        ])
        .unwrap();

        match cli.command {
            Commands::Match {
                action:
                    MatchAction::Ball {
                        id,
                        batsman,
                        team,
                        runs,
                        extra,
                        wicket,
                        bowler,
                    },
            } => {
                assert_eq!(id, "m-1");
                assert_eq!(batsman, "Opener");
                assert_eq!(team, Some(TeamSide::B));
                assert_eq!(runs, 4);
                assert!(!extra);
                assert!(wicket);
                assert!(bowler.is_none());
            }
            _ => panic!("expected match ball"),
        }
    }

    #[test]
    fn rejects_unknown_match_type() {
        let result = Cli::try_parse_from([
            "scorebook", "match", "new", "--team-a", "A", "--team-b", "B", "--type", "T10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_entry_requires_equals_and_name() {
        assert_eq!(
            parse_entry("Runs=187").unwrap(),
            ("Runs".to_string(), "187".to_string())
        );
        assert_eq!(
            parse_entry("Team Name=Royal Challengers").unwrap().1,
            "Royal Challengers"
        );
        assert!(parse_entry("Runs").is_err());
        assert!(parse_entry("=5").is_err());
    }

    #[tokio::test]
    async fn test_match_flow_by_name() {
        let book = MatchBook::new(MemoryMatchStore::new());
        let m = cmd_match_new(&book, setup(), OutputFormat::Text).await.unwrap();
        let id = m.id.to_string();

        cmd_add_player(&book, &id, TeamSide::A, "Opener").await.unwrap();
        cmd_add_player(&book, &id, TeamSide::A, "No. 3").await.unwrap();
        cmd_add_bowler(&book, &id, TeamSide::B, "Quick").await.unwrap();

        let outcome = cmd_ball(
            &book,
            &id,
            "opener",
            None,
            Some("quick"),
            Delivery::runs(4),
        )
        .await
        .unwrap();
        assert!(outcome.applied);

        let outcome = cmd_ball(&book, &id, "Opener", None, None, Delivery::wicket())
            .await
            .unwrap();
        let stored = book.load(&m.id).await.unwrap();
        assert_eq!(outcome.next_batsman, Some(stored.team_a.players[1].id.clone()));
        assert_eq!(stored.team_a.score, 4);
        assert_eq!(stored.team_a.wickets, 1);
        assert_eq!(stored.team_b.bowlers[0].runs_conceded, 4);

        cmd_match_show(&book, &id, OutputFormat::Json).await.unwrap();
        cmd_match_list(&book, OutputFormat::Text).await.unwrap();
    }

    #[tokio::test]
    async fn test_ball_defaults_to_batting_side() {
        let book = MatchBook::new(MemoryMatchStore::new());
        let m = cmd_match_new(&book, setup(), OutputFormat::Json).await.unwrap();
        let id = m.id.to_string();
        let chaser = cmd_add_player(&book, &id, TeamSide::B, "Chaser").await.unwrap();

        // Innings 1: team A bats, so team B's player is unknown there.
        let outcome = cmd_ball(&book, &id, chaser.as_str(), None, None, Delivery::runs(1))
            .await
            .unwrap();
        assert!(!outcome.applied);

        cmd_switch_innings(&book, &id).await.unwrap();
        let outcome = cmd_ball(&book, &id, chaser.as_str(), None, None, Delivery::runs(1))
            .await
            .unwrap();
        assert!(outcome.applied);
        assert_eq!(book.load(&m.id).await.unwrap().team_b.score, 1);
    }

    #[tokio::test]
    async fn test_missing_match_reports_not_found() {
        let book = MatchBook::new(MemoryMatchStore::new());
        let err = cmd_match_show(&book, "missing", OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoreError>(),
            Some(ScoreError::MatchNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fs_store_delete_and_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let book = MatchBook::new(FsMatchStore::new(dir.path()).unwrap());
        let m = cmd_match_new(&book, setup(), OutputFormat::Text).await.unwrap();

        cmd_match_sweep(&book).await.unwrap();
        assert!(book.load(&m.id).await.is_ok());

        cmd_match_delete(&book, m.id.as_str()).await.unwrap();
        assert!(book.load(&m.id).await.is_err());
    }

    #[tokio::test]
    async fn test_scorecard_flow() {
        let service = ScorecardService::new(MemoryScorecardStore::new());
        let owner = UserId::new("alice");
        let card = cmd_scorecard_create(
            &service,
            &owner,
            NewScorecard::from_template("Club final", ScorecardKind::Cricket),
            OutputFormat::Text,
        )
        .await
        .unwrap();
        let id = card.id.to_string();

        let card = cmd_scorecard_set(
            &service,
            &id,
            &owner,
            &["Team Name=Lions".to_string(), "runs=187".to_string()],
        )
        .await
        .unwrap();
        let rendered = render_scorecard(&card);
        assert!(rendered.contains("Team Name*: Lions"));
        assert!(rendered.contains("Runs*: 187"));
        assert!(rendered.contains("Overs*: -"));

        let token = cmd_scorecard_share(&service, &id, &owner).await.unwrap();
        cmd_scorecard_shared(&service, &token, OutputFormat::Json)
            .await
            .unwrap();

        let err = cmd_scorecard_delete(&service, &id, &UserId::new("bob"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoreError>(),
            Some(ScoreError::Forbidden { .. })
        ));
        cmd_scorecard_delete(&service, &id, &owner).await.unwrap();
        cmd_scorecard_list(&service, &owner, OutputFormat::Text)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_scorecard_on_surreal_mem() {
        let handle = SurrealHandle::setup_db().await.unwrap();
        let service = ScorecardService::new(SurrealScorecardStore::new(Arc::new(handle)));
        let owner = UserId::new("carol");
        cmd_scorecard_create(
            &service,
            &owner,
            NewScorecard::from_template("Derby", ScorecardKind::Football),
            OutputFormat::Json,
        )
        .await
        .unwrap();
        cmd_scorecard_list(&service, &owner, OutputFormat::Json)
            .await
            .unwrap();
    }

    #[test]
    fn render_match_shows_scoreline_and_meta() {
        let mut m = Match::new(MatchSetup {
            venue: Some("Eden Gardens".to_string()),
            ..setup()
        });
        m.team_a.score = 12;
        m.team_a.overs = 1.2;
        let text = render_match(&m);
        assert!(text.starts_with("Lions vs Tigers"));
        assert!(text.contains("T20 | 20 overs | Eden Gardens"));
        assert!(text.contains("Lions  12/0 (1.2 ov)"));
        assert!(text.contains("Innings 1 (Lions batting)"));
    }
}
