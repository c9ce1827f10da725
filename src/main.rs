use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use office_translate::backend::{
    DEFAULT_ENDPOINT, DEFAULT_TARGET, Glossary, GoogleTranslate, TranslatorConfig,
};
use office_translate::job::TRANSLATED_SUFFIX;
use office_translate::{DocumentKind, Gateway, Job, Translate};

#[derive(Parser)]
#[command(
    name = "office-translate",
    about = "Translate the text of DOCX, XLSX and PPTX files, keeping their layout"
)]
struct Args {
    /// Input documents
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Document kind (docx, xlsx, pptx); inferred from each extension by default
    #[arg(long)]
    kind: Option<DocumentKind>,
    /// Target language code
    #[arg(long, env = "OFFICE_TRANSLATE_TARGET", default_value = DEFAULT_TARGET)]
    target: String,
    /// Source language code
    #[arg(long, env = "OFFICE_TRANSLATE_SOURCE", default_value = "auto")]
    source: String,
    /// Translation service endpoint
    #[arg(long, env = "OFFICE_TRANSLATE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Seconds to wait for a single translation
    #[arg(long, env = "OFFICE_TRANSLATE_TIMEOUT", default_value_t = 10)]
    timeout: u64,
    /// Translate offline from a tab-separated glossary instead of the web service
    #[arg(long, env = "OFFICE_TRANSLATE_GLOSSARY")]
    glossary: Option<PathBuf>,
    /// Appended to the file stem of each output
    #[arg(long, default_value = TRANSLATED_SUFFIX)]
    suffix: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    for input in &args.inputs {
        if !input.exists() {
            eprintln!("Error: file not found: {}", input.display());
            std::process::exit(1);
        }
        if !input.is_file() {
            eprintln!("Error: not a file: {}", input.display());
            std::process::exit(1);
        }
    }

    let backend: Box<dyn Translate> = match &args.glossary {
        Some(path) => match Glossary::load(path) {
            Ok(glossary) => {
                log::info!("loaded {} glossary entries from {}", glossary.len(), path.display());
                Box::new(glossary)
            }
            Err(e) => {
                eprintln!("Error: cannot read glossary {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Box::new(GoogleTranslate::new(TranslatorConfig {
            source: args.source.clone(),
            target: args.target.clone(),
            endpoint: args.endpoint.clone(),
            timeout: Duration::from_secs(args.timeout),
        })),
    };
    let gateway = Gateway::new(backend);

    let mut job = Job::new(&gateway).with_suffix(args.suffix.as_str());
    if let Some(kind) = args.kind {
        job = job.with_kind(kind);
    }

    let results = match args.inputs.as_slice() {
        [input] => vec![job.run(input, draw_progress)],
        inputs => job.run_batch(inputs, |input| {
            let name = input.display().to_string();
            move |fraction: f32| log::debug!("{name}: {:.0}%", fraction * 100.0)
        }),
    };

    let mut failed = false;
    for result in results {
        match result {
            Ok(output) => println!("{}", output.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                failed = true;
            }
        }
    }

    let stats = gateway.stats();
    log::info!(
        "{} strings translated, {} left as is, {} failed",
        stats.translated,
        stats.skipped,
        stats.failed
    );
    if failed {
        std::process::exit(1);
    }
}

fn draw_progress(fraction: f32) {
    const WIDTH: usize = 30;
    let filled = ((fraction * WIDTH as f32).round() as usize).min(WIDTH);
    eprint!(
        "\r[{}{}] {:>3.0}%",
        "#".repeat(filled),
        " ".repeat(WIDTH - filled),
        fraction * 100.0
    );
    if fraction >= 1.0 {
        eprintln!();
    }
    let _ = std::io::stderr().flush();
}
