// This file is part of the pgnkit library.
// Copyright (C) 2026 pgnkit contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Command line front end.
//!
//! ```text
//! pgnkit games games.pgn                 # one summary line per game
//! pgnkit fens --moves 40 --cmp ge -      # FENs of long games from stdin
//! RUST_LOG=pgnkit=debug pgnkit --resync games broken.pgn
//! ```

use std::{
    borrow::Cow,
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand, ValueEnum};
use pgnkit::{
    filter::{GameFilter, MoveCount, TagFilter},
    pgn::{self, ErrorPolicy},
    Game,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pgnkit", version, about = "Read PGN files and replay their games")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Skip malformed games instead of stopping at the first one
    #[arg(long, global = true)]
    resync: bool,

    /// Keep games by their number of moves
    #[arg(long, global = true, value_name = "N")]
    moves: Option<usize>,

    /// How --moves compares
    #[arg(long, global = true, value_enum, default_value_t = Cmp::Eq)]
    cmp: Cmp,

    /// Keep games with this tag pair (repeatable)
    #[arg(long, global = true, value_name = "NAME=VALUE", value_parser = parse_tag)]
    tag: Vec<TagFilter>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print result, number of moves and players of each game
    Games {
        /// PGN files, or - for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the FEN after each ply of the mainline
    Fens {
        /// PGN files, or - for stdin
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Cmp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    fn with(self, n: usize) -> MoveCount {
        match self {
            Cmp::Eq => MoveCount::Exactly(n),
            Cmp::Lt => MoveCount::LessThan(n),
            Cmp::Le => MoveCount::AtMost(n),
            Cmp::Gt => MoveCount::GreaterThan(n),
            Cmp::Ge => MoveCount::AtLeast(n),
        }
    }
}

fn parse_tag(arg: &str) -> Result<TagFilter, String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => {
            Ok(TagFilter::new(name.to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected NAME=VALUE, got {arg:?}")),
    }
}

struct Filters {
    moves: Option<MoveCount>,
    tags: Vec<TagFilter>,
}

impl GameFilter for Filters {
    fn accept(&self, game: &Game<'_>) -> bool {
        self.moves.accept(game) && self.tags.accept(game)
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if path == Path::new("-") {
        io::stdin().lock().read_to_end(&mut bytes)?;
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .with_context(|| format!("cannot read {}", path.display()))?;
    }
    Ok(bytes)
}

fn tag_or_unknown<'g>(game: &'g Game<'_>, name: &str) -> Cow<'g, str> {
    game.tag(name).map_or("?".into(), |tag| tag.value_utf8_lossy())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let policy = if cli.resync {
        ErrorPolicy::Resync
    } else {
        ErrorPolicy::FailFast
    };
    let filters = Filters {
        moves: cli.moves.map(|n| cli.cmp.with(n)),
        tags: cli.tag,
    };
    let (files, print_fens) = match cli.command {
        Command::Games { files } => (files, false),
        Command::Fens { files } => (files, true),
    };

    let mut out = BufWriter::new(io::stdout().lock());
    for path in &files {
        let bytes = read_input(path)?;
        let mut parser = pgn::Parser::new(&bytes).with_policy(policy);

        let mut kept = 0;
        for game in parser.by_ref() {
            let game = game.with_context(|| format!("in {}", path.display()))?;
            if !filters.accept(&game) {
                continue;
            }
            kept += 1;

            if !print_fens {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    game.result(),
                    game.moves().len(),
                    tag_or_unknown(&game, "White"),
                    tag_or_unknown(&game, "Black"),
                )?;
                continue;
            }

            match game.replay() {
                Ok(fens) => {
                    for fen in fens {
                        writeln!(out, "{fen}")?;
                    }
                    writeln!(out)?;
                }
                Err(err) if cli.resync => warn!(%err, game = kept, "cannot replay"),
                Err(err) => bail!("{}: game {kept}: {err}", path.display()),
            }
        }

        info!(
            file = %path.display(),
            kept,
            skipped = parser.skipped().len(),
            "done"
        );
    }

    out.flush()?;
    Ok(())
}
