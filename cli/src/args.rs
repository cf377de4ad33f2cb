//! Command-line parsing.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ideascore")]
#[command(about = "Score business ideas from text, image, or audio captures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Capture an idea, score it, and print the result
    Evaluate(EvaluateArgs),
    /// Print the last stored result for this session
    Show,
    /// Clear the stored result for this session
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdeaInput {
    File(PathBuf),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "description"])))]
pub struct EvaluateArgs {
    /// Text, image, or audio file holding the idea
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
    /// The idea typed out
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    #[arg(long, short = 't')]
    pub title: String,
    #[arg(long, short = 'i')]
    pub industry: String,
    #[arg(long)]
    pub target_market: Option<String>,
    /// Language code, e.g. hi-IN
    #[arg(long, short = 'l')]
    pub language: Option<String>,
}

impl EvaluateArgs {
    /// The group guarantees exactly one of `file` and `description`.
    pub fn input(&self) -> IdeaInput {
        match (&self.file, &self.description) {
            (Some(path), _) => IdeaInput::File(path.clone()),
            (None, text) => IdeaInput::Text(text.clone().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse_str(line: &str) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("ideascore").chain(line.split_whitespace()))
            .map(|cli| cli.command)
    }

    #[test]
    fn evaluate_with_file() {
        let Command::Evaluate(args) =
            parse_str("evaluate --file idea.txt --title Kiosk --industry Energy -l hi-IN").unwrap()
        else {
            panic!("expected evaluate");
        };
        assert_eq!(args.input(), IdeaInput::File(PathBuf::from("idea.txt")));
        assert_eq!(args.title, "Kiosk");
        assert_eq!(args.industry, "Energy");
        assert_eq!(args.target_market, None);
        assert_eq!(args.language.as_deref(), Some("hi-IN"));
    }

    #[test]
    fn evaluate_with_description() {
        let Command::Evaluate(args) =
            parse_str("evaluate -d kiosk -t Kiosk -i Energy --target-market villages").unwrap()
        else {
            panic!("expected evaluate");
        };
        assert_eq!(args.input(), IdeaInput::Text("kiosk".to_string()));
        assert_eq!(args.target_market.as_deref(), Some("villages"));
    }

    #[test]
    fn evaluate_requires_exactly_one_input() {
        let err = parse_str("evaluate --title Kiosk --industry Energy").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse_str("evaluate -f a.txt -d text --title Kiosk --industry Energy")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn evaluate_rejects_bad_options() {
        assert!(parse_str("evaluate --file").is_err());
        assert!(parse_str("evaluate --colour red").is_err());
        assert!(parse_str("evaluate -t a -t b -f x -i Energy").is_err());
        assert!(parse_str("evaluate -f x -i Energy").is_err());
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse_str("show").unwrap(), Command::Show);
        assert_eq!(parse_str("reset").unwrap(), Command::Reset);
        assert!(parse_str("show now").is_err());
        assert!(parse_str("launch").is_err());
        assert!(parse_str("").is_err());
    }
}
