use std::fmt::Display;
use std::io::{BufRead, Write};
use std::num::ParseIntError;
use std::str::{FromStr, Utf8Error};

use log::{debug, trace, warn};

use crate::highway::Highway;
use crate::planner::plan_trip;
use crate::primitives::{Autonomy, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddStation {
        position: Position,
        ranges: Box<[Autonomy]>,
    },
    RemoveStation {
        position: Position,
    },
    AddVehicle {
        position: Position,
        range: Autonomy,
    },
    RemoveVehicle {
        position: Position,
        range: Autonomy,
    },
    PlanTrip {
        start: Position,
        end: Position,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    UnknownCommand(Box<str>),
    MissingArgument(&'static str),
    InvalidNumber(Box<str>, ParseIntError),
    InvalidEncoding(Utf8Error),
}

impl Display for ParseCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseCommandError::UnknownCommand(word) => write!(f, "unknown command '{}'", word),
            ParseCommandError::MissingArgument(name) => write!(f, "missing argument <{}>", name),
            ParseCommandError::InvalidNumber(token, err) => {
                write!(f, "invalid number '{}': {}", token, err)
            }
            ParseCommandError::InvalidEncoding(err) => write!(f, "invalid line: {}", err),
        }
    }
}

fn next_number<T: FromStr<Err = ParseIntError>>(
    tokens: &mut std::str::SplitWhitespace<'_>,
    name: &'static str,
) -> Result<T, ParseCommandError> {
    let token = tokens
        .next()
        .ok_or(ParseCommandError::MissingArgument(name))?;
    token
        .parse()
        .map_err(|err| ParseCommandError::InvalidNumber(token.into(), err))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Parses one line of the text protocol. Tokens after the expected arguments are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let word = tokens
            .next()
            .ok_or(ParseCommandError::MissingArgument("command"))?;

        let command = match word {
            "aggiungi-stazione" => {
                let position = next_number(&mut tokens, "position")?;
                let num_vehicles: usize = next_number(&mut tokens, "number of vehicles")?;
                let ranges = (0..num_vehicles)
                    .map(|_| next_number(&mut tokens, "range"))
                    .collect::<Result<Box<[Autonomy]>, _>>()?;
                Command::AddStation { position, ranges }
            }
            "demolisci-stazione" => Command::RemoveStation {
                position: next_number(&mut tokens, "position")?,
            },
            "aggiungi-auto" => Command::AddVehicle {
                position: next_number(&mut tokens, "position")?,
                range: next_number(&mut tokens, "range")?,
            },
            "rottama-auto" => Command::RemoveVehicle {
                position: next_number(&mut tokens, "position")?,
                range: next_number(&mut tokens, "range")?,
            },
            "pianifica-percorso" => Command::PlanTrip {
                start: next_number(&mut tokens, "start")?,
                end: next_number(&mut tokens, "end")?,
            },
            _ => return Err(ParseCommandError::UnknownCommand(word.into())),
        };
        Ok(command)
    }
}

impl Command {
    /// Applies the command and returns the reply line.
    pub fn execute(&self, highway: &mut Highway) -> String {
        match self {
            Command::AddStation { position, ranges } => {
                let result = highway.add_station(*position, ranges.iter().copied());
                reply(result, "aggiunta", "non aggiunta")
            }
            Command::RemoveStation { position } => {
                reply(highway.remove_station(*position), "demolita", "non demolita")
            }
            Command::AddVehicle { position, range } => {
                reply(highway.add_vehicle(*position, *range), "aggiunta", "non aggiunta")
            }
            Command::RemoveVehicle { position, range } => {
                reply(highway.remove_vehicle(*position, *range), "rottamata", "non rottamata")
            }
            Command::PlanTrip { start, end } => match plan_trip(highway, *start, *end) {
                Some(route) => route.to_string(),
                None => "nessun percorso".to_string(),
            },
        }
    }
}

fn reply<T, E: Display>(result: Result<T, E>, applied: &str, declined: &str) -> String {
    match result {
        Ok(_) => applied.to_string(),
        Err(reason) => {
            debug!("Declined: {}", reason);
            declined.to_string()
        }
    }
}

#[derive(Debug)]
pub enum RunError {
    Io(std::io::Error),
    Parse { line: usize, err: ParseCommandError },
}

impl Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Io(err) => write!(f, "{}", err),
            RunError::Parse { line, err } => write!(f, "line {}: {}", line, err),
        }
    }
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        RunError::Io(err)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub num_commands: usize,
    pub num_skipped: usize,
}

/// Executes one command per input line and writes one reply line per command.
///
/// Blank lines produce no reply. Malformed lines, including ones that are not valid UTF-8, are
/// skipped with a warning, or abort the run if `strict` is set.
pub fn run_script(
    highway: &mut Highway,
    mut input: impl BufRead,
    mut output: impl Write,
    strict: bool,
) -> Result<RunStats, RunError> {
    let mut stats = RunStats::default();
    let mut buf = Vec::new();
    let mut line_number = 0;
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;

        let parsed = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                trace!("{}: {}", line_number, line.trim_end());
                line.parse::<Command>()
            }
            Err(err) => Err(ParseCommandError::InvalidEncoding(err)),
        };

        match parsed {
            Ok(command) => {
                writeln!(output, "{}", command.execute(highway))?;
                stats.num_commands += 1;
            }
            Err(err) if strict => {
                return Err(RunError::Parse {
                    line: line_number,
                    err,
                })
            }
            Err(err) => {
                warn!("Skipping line {}: {}", line_number, err);
                stats.num_skipped += 1;
            }
        }
    }
    output.flush()?;
    Ok(stats)
}
