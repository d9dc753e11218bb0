use anyhow::{Context, Result};
use expression_autocompletion::{
    Autocompletion, ExpressionAndCaret, ProjectMetadata,
    autocompletion::{AutocompletionContext, build_autocompletions, insert_autocompletion},
    expression::load_descriptions,
    metadata::EventsScope,
};
use log::debug;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "expression-autocompletion",
    about = "Autocompletion for GDevelop-style expressions"
)]
enum Command {
    /// Build autocompletions from parser descriptions.
    Complete {
        #[structopt(long, parse(from_os_str))]
        project: PathBuf,
        #[structopt(long, parse(from_os_str))]
        descriptions: PathBuf,
        #[structopt(long)]
        layout: Option<String>,
        #[structopt(long)]
        extension: Option<String>,
        #[structopt(long)]
        function: Option<String>,
    },
    /// Insert an autocompletion into an expression.
    Insert {
        #[structopt(long)]
        expression: String,
        #[structopt(long)]
        caret: usize,
        /// JSON file holding the chosen autocompletion.
        #[structopt(long, parse(from_os_str))]
        autocompletion: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    match Command::from_args() {
        Command::Complete {
            project,
            descriptions,
            layout,
            extension,
            function,
        } => {
            let metadata = ProjectMetadata::load(&project)?;
            let descriptions = load_descriptions(&descriptions)?;
            let scope = EventsScope {
                layout,
                extension,
                events_function: function,
            };
            let context = AutocompletionContext::new(&metadata, &scope);
            let autocompletions = build_autocompletions(&context, &descriptions);
            debug!("{} autocompletions", autocompletions.len());
            println!("{}", serde_json::to_string_pretty(&autocompletions)?);
        }
        Command::Insert {
            expression,
            caret,
            autocompletion: path,
        } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let autocompletion: Autocompletion = serde_json::from_str(&text)
                .with_context(|| format!("invalid autocompletion in {}", path.display()))?;
            let result =
                insert_autocompletion(ExpressionAndCaret::new(expression, caret), &autocompletion);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
