// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands a TrainConfig to
// Layer 2. Logging options are split off here so main() can
// install the subscriber before anything else runs.
//
// The single-dash multi-letter aliases -bs and -lr are not
// something clap can declare, so expand_short_aliases rewrites
// them to --bs and --lr before parsing.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::TrainArgs;

use crate::application::train_use_case::TrainUseCase;
use crate::infra::logging::LoggingOptions;

/// Single-dash spellings accepted for the batch size and learn rate.
const SHORT_ALIASES: [&str; 2] = ["-bs", "-lr"];

/// Rewrite `-bs`/`-lr` (and `-bs=8` style) to their `--` forms.
pub fn expand_short_aliases<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            let is_alias = SHORT_ALIASES.iter().any(|alias| {
                arg == *alias || arg.strip_prefix(alias).is_some_and(|rest| rest.starts_with('='))
            });
            if is_alias { format!("-{arg}") } else { arg }
        })
        .collect()
}

#[derive(Parser, Debug)]
#[command(
    name = "news-textcat",
    version,
    about = "Split a labelled news-article CSV and fine-tune a transformer text classifier on it."
)]
pub struct Cli {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Log filter for this crate (RUST_LOG overrides it)
    #[arg(long = "log_level", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn logging(&self) -> LoggingOptions {
        LoggingOptions::new(&self.log_level)
    }

    pub fn run(self) -> Result<()> {
        let output = self.train.output_dir.clone();
        tracing::info!("Fine-tuning from base model '{}'", self.train.model);

        let use_case = TrainUseCase::new(self.train.into());
        let report   = use_case.execute()?;

        tracing::info!("Training stopped after {} steps ({} epochs)", report.steps, report.epochs);
        match output {
            Some(dir) => println!("Training complete. Model saved to '{dir}'."),
            None      => println!("Training complete. No output directory given, model not saved."),
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["news-textcat", "base"]).unwrap();
        assert_eq!(cli.log_level, "info");
        let cfg: TrainConfig = cli.train.into();
        assert_eq!(cfg.model, "base");
        assert_eq!(cfg.output_dir, None);
        assert_eq!(cfg.batch_size, 24);
        assert_eq!(cfg.learn_rate, 2e-5);
        assert_eq!(cfg.n_iter, 4);
        assert!(!cfg.sentence_split);
        assert_eq!(cfg.data_dir, "data");
    }

    #[test]
    fn test_short_flags_and_aliases() {
        let cli = Cli::try_parse_from([
            "news-textcat", "base", "-o", "out", "--bs", "8", "--lr", "0.001", "-n", "2", "-s",
        ])
        .unwrap();
        let cfg: TrainConfig = cli.train.into();
        assert_eq!(cfg.output_dir.as_deref(), Some("out"));
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.learn_rate, 0.001);
        assert_eq!(cfg.n_iter, 2);
        assert!(cfg.sentence_split);
    }

    #[test]
    fn test_single_dash_multi_letter_aliases() {
        let args = ["news-textcat", "base", "-bs", "8", "-lr", "0.001", "-b=3"]
            .map(String::from);
        let expanded = expand_short_aliases(args);
        assert_eq!(&expanded[2..6], ["--bs", "8", "--lr", "0.001"]);
        assert_eq!(expanded[6], "-b=3");

        let cli = Cli::try_parse_from(&expanded[..6]).unwrap();
        let cfg: TrainConfig = cli.train.into();
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.learn_rate, 0.001);

        let eq = expand_short_aliases(["x", "-bs=16", "-lr=0.5"].map(String::from));
        assert_eq!(eq, vec!["x", "--bs=16", "--lr=0.5"]);
    }

    #[test]
    fn test_long_underscore_flags() {
        let cli = Cli::try_parse_from([
            "news-textcat", "base", "--batch_size", "12", "--learn_rate", "3e-5",
            "--eval_every", "50", "--log_level", "debug",
        ])
        .unwrap();
        assert_eq!(cli.logging(), LoggingOptions::new("debug"));
        let cfg: TrainConfig = cli.train.into();
        assert_eq!(cfg.batch_size, 12);
        assert_eq!(cfg.eval_every, 50);
    }

    #[test]
    fn test_model_is_required() {
        assert!(Cli::try_parse_from(["news-textcat"]).is_err());
    }
}
