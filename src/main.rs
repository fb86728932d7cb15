use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use hazard_sweeper::{
    apply_assist, grant_charge, unlock_difficulty, CellView, ChannelReporter, Difficulty,
    GameSession, Leaderboard, MemorySubscriptions, Outcome, Position, ScoreRecord,
    SubscriptionStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LEADERBOARD_SIZE: usize = 5;

#[derive(Parser, Debug)]
#[command(version, about = "Reveal every safe cell without uncovering a hazard")]
struct Cli {
    #[arg(short, long, value_enum, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    #[arg(short, long, default_value = "Player")]
    player: String,

    /// Seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,

    /// Assist charges available at start
    #[arg(long, default_value_t = 0)]
    charges: u32,

    /// Unlock premium difficulties
    #[arg(long)]
    subscribed: bool,

    /// Append finished games to this JSON lines file
    #[arg(long)]
    scores: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Reveal(Position),
    Flag(Position),
    Assist,
    Reward,
    Quit,
}

enum Flow {
    Finished,
    Quit,
}

/// Feeds wall-clock seconds into the session while its timer gate is open.
struct Clock {
    last: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    fn sync(&mut self, session: &mut GameSession) {
        if !session.timer_running() {
            self.last = Instant::now();
            return;
        }
        while self.last.elapsed() >= Duration::from_secs(1) {
            session.tick();
            self.last += Duration::from_secs(1);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let mut subscriptions = MemorySubscriptions::new();
    subscriptions.set_subscribed(&cli.player, cli.subscribed)?;
    let difficulty = unlock_difficulty(&subscriptions, &cli.player, cli.difficulty)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut leaderboard = load_leaderboard(cli.scores.as_deref())?;
    let (reporter, receiver) = ChannelReporter::new();
    let mut session =
        GameSession::new(difficulty, cli.player.clone(), &mut rng)?.with_reporter(reporter);
    let mut charges = cli.charges;

    loop {
        let flow = play(&mut session, &mut charges, &mut rng)?;

        let submitted = leaderboard.drain(&receiver);
        if let Some(path) = &cli.scores {
            save_scores(path, &submitted);
        }

        if let Flow::Quit = flow {
            break;
        }

        print_board(&session, charges);
        match session.outcome() {
            Outcome::Won => println!("Congratulations! You cleared the board!"),
            Outcome::Lost => println!("Game Over!"),
            Outcome::InProgress => unreachable!(),
        }
        print_leaderboard(&leaderboard, difficulty);

        if !confirm("Play again? [y/N]: ")? {
            break;
        }
        session = session.restart(&mut rng)?;
    }

    println!("Thanks for playing!");
    Ok(())
}

fn play(session: &mut GameSession, charges: &mut u32, rng: &mut StdRng) -> io::Result<Flow> {
    let mut clock = Clock::new();

    while !session.is_finished() {
        print_board(session, *charges);

        let Some(command) = read_command()? else {
            println!("Commands: r <row> <col> | f <row> <col> | a (assist) | w (earn assist) | q");
            continue;
        };
        clock.sync(session);

        match command {
            Command::Reveal(pos) => {
                session.reveal(pos);
            }
            Command::Flag(pos) => {
                session.toggle_flag(pos);
            }
            Command::Assist => {
                let outcome = apply_assist(session, *charges, rng);
                if outcome.charges == *charges {
                    println!("Nothing to sniff out right now");
                }
                *charges = outcome.charges;
            }
            Command::Reward => {
                *charges = grant_charge(*charges);
                println!("Assist earned! You have {charges} now");
            }
            Command::Quit => return Ok(Flow::Quit),
        }
    }

    Ok(Flow::Finished)
}

fn read_command() -> io::Result<Option<Command>> {
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(Some(Command::Quit));
    }
    Ok(parse_command(&input))
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    let action = parts.next()?;

    let mut position = || -> Option<Position> {
        let row = parts.next()?.parse().ok()?;
        let col = parts.next()?.parse().ok()?;
        Some(Position::new(row, col))
    };

    match action {
        "r" => position().map(Command::Reveal),
        "f" => position().map(Command::Flag),
        "a" => Some(Command::Assist),
        "w" => Some(Command::Reward),
        "q" => Some(Command::Quit),
        _ => None,
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}

fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn print_board(session: &GameSession, charges: u32) {
    let size = session.size();

    println!(
        "{} | Time: {} | Moves: {} | Hazards left: {} | Assists: {}",
        session.difficulty(),
        format_time(session.elapsed_seconds()),
        session.move_count(),
        session.hazards_remaining(),
        charges
    );

    // Column numbers
    print!("    ");
    for col in 0..size {
        print!("{col:>3}");
    }
    println!();

    for row in 0..size {
        print!("{row:>3} ");
        for col in 0..size {
            let symbol = match session.cell_view(Position::new(row, col)) {
                Some(CellView::Hidden) => "□".to_string(),
                Some(CellView::Flagged) => "⚑".to_string(),
                Some(CellView::Hazard) => "✸".to_string(),
                Some(CellView::Revealed(0)) | None => " ".to_string(),
                Some(CellView::Revealed(n)) => n.to_string(),
            };
            print!("{symbol:>3}");
        }
        println!();
    }
}

fn print_leaderboard(leaderboard: &Leaderboard, difficulty: Difficulty) {
    let top = leaderboard.top(LEADERBOARD_SIZE, Some(difficulty));
    if top.is_empty() {
        return;
    }

    println!("Best times on {difficulty}:");
    for (rank, record) in top.iter().enumerate() {
        println!(
            "{:>2}. {:<16} {} {:>4} moves {}",
            rank + 1,
            record.player_name,
            format_time(record.time_seconds),
            record.moves,
            if record.completed { "cleared" } else { "lost" }
        );
    }
}

fn load_leaderboard(path: Option<&Path>) -> anyhow::Result<Leaderboard> {
    match path {
        Some(path) if path.exists() => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open scores file {}", path.display()))?;
            Leaderboard::from_json_lines(BufReader::new(file))
                .with_context(|| format!("Failed to read scores file {}", path.display()))
        }
        _ => Ok(Leaderboard::new()),
    }
}

fn save_scores(path: &Path, records: &[ScoreRecord]) {
    if records.is_empty() {
        return;
    }

    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(Into::into)
        .and_then(|mut file| Leaderboard::write_json_lines(&mut file, records));
    if let Err(err) = result {
        log::warn!("Failed to save scores to {}: {err}", path.display());
    }
}
